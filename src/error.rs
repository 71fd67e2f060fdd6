use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("{0}")]
    MalformedInput(String),

    #[error("Missing required argument(s): {}", .0.join(", "))]
    MissingArgument(Vec<String>),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid MediaFire URL")]
    InvalidMediafireUrl,

    #[error("{0}")]
    ApiResolution(String),

    #[error("Failed to access URL: {status}")]
    HttpStatus { status: u16, url: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Failed to read response body: {0}")]
    ResponseBody(#[source] io::Error),

    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write downloaded data to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File not found after download")]
    FileNotFound,

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Download failed: {0}")]
    Failed(#[source] Box<DownloadError>),
}

impl DownloadError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        DownloadError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// True when the destination may hold a truncated file this run created.
    pub fn leaves_partial_file(&self) -> bool {
        matches!(
            self,
            DownloadError::ResponseBody(_)
                | DownloadError::Write { .. }
                | DownloadError::ChecksumMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_arguments_are_joined() {
        let err = DownloadError::MissingArgument(vec!["url".into(), "output".into()]);
        assert_eq!(err.to_string(), "Missing required argument(s): url, output");
    }

    #[test]
    fn failed_wraps_the_underlying_message() {
        let err = DownloadError::Failed(Box::new(DownloadError::InvalidMediafireUrl));
        assert_eq!(err.to_string(), "Download failed: Invalid MediaFire URL");
    }

    #[test]
    fn http_status_embeds_code() {
        let err = DownloadError::HttpStatus {
            status: 404,
            url: "http://example.com/x".into(),
        };
        assert_eq!(err.to_string(), "Failed to access URL: 404");
    }

    #[test]
    fn filesystem_error_names_path() {
        let err = DownloadError::fs(
            "Failed to create output file",
            "/tmp/out.bin",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to create output file /tmp/out.bin: denied");
    }

    #[test]
    fn only_post_open_failures_leave_partial_files() {
        assert!(DownloadError::ChecksumMismatch {
            expected: "a".into(),
            actual: "b".into()
        }
        .leaves_partial_file());
        assert!(DownloadError::ResponseBody(io::Error::new(io::ErrorKind::Other, "reset"))
            .leaves_partial_file());
        assert!(!DownloadError::HttpStatus {
            status: 500,
            url: "http://x".into()
        }
        .leaves_partial_file());
        assert!(!DownloadError::fs(
            "Failed to create output file",
            "x",
            io::Error::new(io::ErrorKind::Other, "no")
        )
        .leaves_partial_file());
    }
}
