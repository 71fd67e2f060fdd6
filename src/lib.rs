//! Download helpers launched by the host's plugin runner.
//!
//! Two independent entry points share this crate: `generic-download` reads a
//! JSON request on stdin, `mediafire-download` takes `--url`/`-o` flags. Both
//! print exactly one [`DownloadResult`] line on stdout.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod generic;
pub mod logging;
pub mod mediafire;
pub mod outcome;
pub mod request;
pub mod verify;

pub use config::Settings;
pub use error::{DownloadError, Result};
pub use outcome::DownloadResult;
