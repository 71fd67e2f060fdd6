use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DownloadError;

/// The single record a helper prints on stdout before it exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DownloadResult {
    Success { path: String },
    Error { error: String },
}

impl DownloadResult {
    pub fn success(path: impl AsRef<Path>) -> Self {
        DownloadResult::Success {
            path: path.as_ref().to_string_lossy().into_owned(),
        }
    }

    pub fn error(message: impl ToString) -> Self {
        DownloadResult::Error {
            error: message.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DownloadResult::Success { .. })
    }

    /// Writes the record as one JSON line and flushes.
    pub fn emit<W: Write>(&self, mut out: W) -> io::Result<()> {
        serde_json::to_writer(&mut out, self)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

impl<P: AsRef<Path>> From<Result<P, DownloadError>> for DownloadResult {
    fn from(result: Result<P, DownloadError>) -> Self {
        match result {
            Ok(path) => DownloadResult::success(path),
            Err(e) => DownloadResult::error(e),
        }
    }
}
