use std::io;
use std::process;

use plugin_downloaders::logging::setup_logging;
use plugin_downloaders::{generic, DownloadResult, Settings};

fn emit(result: &DownloadResult) {
    if let Err(e) = result.emit(io::stdout().lock()) {
        log::error!("Failed to write result: {}", e);
        process::exit(1);
    }
}

fn main() {
    let settings = Settings::from_env();
    if let Some(path) = setup_logging("generic-download", &settings) {
        log::debug!("Logging to {:?}", path);
    }

    let result = generic::run(io::stdin().lock(), &settings);

    if result.is_success() {
        log::info!("Download completed successfully");
    }
    emit(&result);
}
