use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::error::{DownloadError, Result};

pub const GENERIC_CHUNK_SIZE: usize = 1024;
pub const VENDOR_CHUNK_SIZE: usize = 4096;
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Which response statuses count as a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Any 2xx.
    AnySuccess,
    /// 200 only.
    ExactlyOk,
}

impl StatusPolicy {
    fn accepts(self, status: StatusCode) -> bool {
        match self {
            StatusPolicy::AnySuccess => status.is_success(),
            StatusPolicy::ExactlyOk => status == StatusCode::OK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    pub chunk_size: usize,
    pub status_policy: StatusPolicy,
    pub create_parent_dirs: bool,
}

impl TransferOptions {
    pub fn generic() -> Self {
        Self {
            chunk_size: GENERIC_CHUNK_SIZE,
            status_policy: StatusPolicy::AnySuccess,
            create_parent_dirs: false,
        }
    }

    pub fn vendor() -> Self {
        Self {
            chunk_size: VENDOR_CHUNK_SIZE,
            status_policy: StatusPolicy::ExactlyOk,
            create_parent_dirs: true,
        }
    }
}

/// Moves the bytes behind `url` into `output_path`, returning the byte count.
pub trait Transfer {
    fn fetch(&self, url: &str, output_path: &Path, options: &TransferOptions) -> Result<u64>;
}

pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new(user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent)?,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Transfer for HttpTransfer {
    fn fetch(&self, url: &str, output_path: &Path, options: &TransferOptions) -> Result<u64> {
        download_file(&self.client, url, output_path, options)
    }
}

/// Blocking client with no overall deadline; transport defaults apply.
pub fn build_client(user_agent: &str) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(None::<Duration>)
        .build()?)
}

pub fn download_file(
    client: &Client,
    url: &str,
    output_path: &Path,
    options: &TransferOptions,
) -> Result<u64> {
    log::info!("Downloading from {} to {:?}", url, output_path);

    let mut response = client.get(url).send()?;

    let status = response.status();
    if !options.status_policy.accepts(status) {
        log::warn!("Download of {} rejected with status {}", url, status);
        return Err(DownloadError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    if options.create_parent_dirs {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| DownloadError::fs("Failed to create directory", parent, e))?;
        }
    }

    let mut file = fs::File::create(output_path)
        .map_err(|e| DownloadError::fs("Failed to create output file", output_path, e))?;

    let written = copy_chunked(&mut response, &mut file, options.chunk_size, output_path)?;

    file.flush().map_err(|source| DownloadError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;

    log::info!("Download completed: {} bytes", written);
    Ok(written)
}

/// Deletes a partially written destination. A missing file is not an error.
pub fn remove_partial(output_path: &Path) {
    match fs::remove_file(output_path) {
        Ok(()) => log::info!("Removed partial file {:?}", output_path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove partial file {:?}: {}", output_path, e),
    }
}

fn copy_chunked<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
    output_path: &Path,
) -> Result<u64> {
    let mut buf = vec![0u8; chunk_size.clamp(1, MAX_CHUNK_SIZE)];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DownloadError::ResponseBody(e)),
        };

        writer
            .write_all(&buf[..n])
            .map_err(|source| DownloadError::Write {
                path: output_path.to_path_buf(),
                source,
            })?;
        total += n as u64;
    }

    Ok(total)
}
