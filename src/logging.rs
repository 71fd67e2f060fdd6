use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use crate::config::Settings;

/// Installs a stderr logger and, when possible, a per-invocation log file.
///
/// stdout is never touched: it carries only the result record. Returns the
/// log file path when one was opened.
pub fn setup_logging(binary: &str, settings: &Settings) -> Option<PathBuf> {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Debug)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        settings.log_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Never,
    ));

    let file_result = settings
        .resolve_log_dir()
        .and_then(|dir| dir.map(|dir| open_log_file(&dir, binary)).transpose());

    let mut file_error = None;
    let log_file = match file_result {
        Ok(Some((path, file))) => {
            loggers.push(WriteLogger::new(settings.log_level, config, file));
            Some(path)
        }
        Ok(None) => None,
        Err(e) => {
            file_error = Some(e);
            None
        }
    };

    // A logger may already be installed when called twice in one process.
    let _ = CombinedLogger::init(loggers);

    if let Some(e) = file_error {
        log::warn!("File logging disabled: {:#}", e);
    }

    for warning in &settings.warnings {
        log::warn!("{}", warning);
    }

    log_file
}

fn open_log_file(dir: &Path, binary: &str) -> Result<(PathBuf, fs::File)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {:?}", dir))?;

    let path = dir.join(log_file_name(binary, chrono::Local::now()));
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create log file {:?}", path))?;

    Ok((path, file))
}

fn log_file_name<Tz: chrono::TimeZone>(binary: &str, now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.log", binary.replace('-', "_"), now.format("%Y%m%d_%H%M%S"))
}
