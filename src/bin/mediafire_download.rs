use std::io;
use std::path::Path;
use std::process;

use clap::Parser;

use plugin_downloaders::cli::{parse_failure, MediafireArgs};
use plugin_downloaders::logging::setup_logging;
use plugin_downloaders::mediafire::MediafireDownloader;
use plugin_downloaders::{DownloadResult, Settings};

fn emit(result: &DownloadResult) {
    if let Err(e) = result.emit(io::stdout().lock()) {
        log::error!("Failed to write result: {}", e);
        process::exit(1);
    }
}

fn main() {
    let settings = Settings::from_env();
    if let Some(path) = setup_logging("mediafire-download", &settings) {
        log::debug!("Logging to {:?}", path);
    }

    let args = match MediafireArgs::try_parse() {
        Ok(args) => args,
        Err(err) => match parse_failure(&err) {
            Some(failure) => {
                log::error!("Rejected command line: {}", err.to_string().trim_end());
                emit(&failure.result);
                process::exit(failure.exit_code);
            }
            None => err.exit(),
        },
    };

    log::info!("Received arguments: url={}, output={}", args.url, args.output);

    let output = Path::new(&args.output);
    let result = DownloadResult::from(
        MediafireDownloader::from_settings(&settings).and_then(|d| d.run(&args.url, output)),
    );

    match &result {
        DownloadResult::Success { path } => log::info!("Saved {}", path),
        DownloadResult::Error { error } => log::error!("{}", error),
    }
    emit(&result);
}
