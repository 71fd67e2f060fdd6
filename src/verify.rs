use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{DownloadError, Result};

/// Fails with `FileNotFound` unless `file_path` is on disk after a transfer.
pub fn verify_exists(file_path: &Path) -> Result<()> {
    if file_path.exists() {
        Ok(())
    } else {
        log::warn!("Transfer reported success but {:?} does not exist", file_path);
        Err(DownloadError::FileNotFound)
    }
}

pub fn verify_sha256(file_path: &Path, expected_hash: &str) -> Result<()> {
    log::info!("Verifying SHA256 for {:?}", file_path);

    let computed_hash = compute_sha256(file_path)?;

    if computed_hash.eq_ignore_ascii_case(expected_hash.trim()) {
        log::info!("SHA256 verification passed for {:?}", file_path);
        Ok(())
    } else {
        log::warn!(
            "SHA256 verification failed for {:?}: expected {}, got {}",
            file_path,
            expected_hash,
            computed_hash
        );
        Err(DownloadError::ChecksumMismatch {
            expected: expected_hash.trim().to_lowercase(),
            actual: computed_hash,
        })
    }
}

pub fn compute_sha256(file_path: &Path) -> Result<String> {
    let mut file = fs::File::open(file_path)
        .map_err(|e| DownloadError::fs("Failed to read file for verification", file_path, e))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| DownloadError::fs("Failed to read file for verification", file_path, e))?;

    Ok(hex::encode(hasher.finalize()))
}
