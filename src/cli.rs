//! Command-line flags for the MediaFire downloader.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;

use crate::error::DownloadError;
use crate::outcome::DownloadResult;

pub const MISSING_ARGUMENT_EXIT_CODE: i32 = 1;

/// Download a MediaFire share link to a local file.
///
/// Prints one JSON result record on stdout.
#[derive(Parser, Debug)]
#[command(name = "mediafire-download")]
#[command(version, about)]
pub struct MediafireArgs {
    /// MediaFire share URL, e.g. https://www.mediafire.com/file/<key>/<name>/file
    #[arg(long)]
    pub url: String,

    /// Destination file path; missing parent directories are created
    #[arg(short = 'o', long)]
    pub output: String,
}

/// How a rejected command line should end the process.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseFailure {
    pub result: DownloadResult,
    pub exit_code: i32,
}

/// Maps a clap error onto a result record and exit code. `None` means clap
/// should print and exit itself (help, version).
pub fn parse_failure(err: &clap::Error) -> Option<ParseFailure> {
    if let Some(missing) = missing_argument_names(err) {
        return Some(ParseFailure {
            result: DownloadResult::error(DownloadError::MissingArgument(missing)),
            exit_code: MISSING_ARGUMENT_EXIT_CODE,
        });
    }

    if !err.use_stderr() {
        return None;
    }

    let rendered = err.to_string();
    let message = rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error:").trim())
        .unwrap_or("Invalid arguments")
        .to_string();

    Some(ParseFailure {
        result: DownloadResult::error(message),
        exit_code: err.exit_code(),
    })
}

/// Bare flag names (`url`, `output`) of the required flags clap found missing.
pub fn missing_argument_names(err: &clap::Error) -> Option<Vec<String>> {
    if err.kind() != ErrorKind::MissingRequiredArgument {
        return None;
    }

    let names = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::Strings(args)) => args.iter().map(|a| flag_name(a)).collect(),
        Some(ContextValue::String(arg)) => vec![flag_name(arg)],
        _ => Vec::new(),
    };

    if names.is_empty() {
        // clap's error-context feature always fills InvalidArg; keep the record useful anyway
        return Some(vec!["url".to_string(), "output".to_string()]);
    }
    Some(names)
}

fn flag_name(rendered: &str) -> String {
    rendered
        .trim()
        .trim_start_matches('-')
        .split(|c: char| c.is_whitespace() || c == '<' || c == '=')
        .next()
        .unwrap_or("")
        .to_string()
}
