//! MediaFire share links: quick-key extraction, `file/get_links` lookup and
//! the resolve, transfer, verify flow.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Settings;
use crate::download::{HttpTransfer, Transfer, TransferOptions};
use crate::error::{DownloadError, Result};
use crate::verify::verify_exists;

/// Share links: `mediafire.com/file/<quick key>`, scheme and `www.` optional.
#[allow(clippy::expect_used)]
static QUICK_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?mediafire\.com/file/([a-zA-Z0-9]+)")
        .expect("quick key regex is valid") // Static pattern, safe to panic
});

pub fn extract_quick_key(url: &str) -> Result<String> {
    QUICK_KEY_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|key| key.as_str().to_string())
        .ok_or(DownloadError::InvalidMediafireUrl)
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    response: ApiResponse,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub action: Option<String>,
    pub result: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub links: Vec<FileLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileLink {
    #[serde(default)]
    pub quickkey: Option<String>,
    #[serde(default)]
    pub normal_download: Option<String>,
}

/// Looks up download links for a quick key.
pub trait LinkResolver {
    fn file_get_links(&self, quick_key: &str) -> Result<Vec<FileLink>>;
}

pub struct MediaFireApi {
    client: Client,
    base_url: String,
}

impl MediaFireApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, action: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        let url = format!("{}/{}.php", self.base_url, action);
        log::debug!("MediaFire API call {}", url);

        let mut form = params.to_vec();
        form.push(("response_format", "json"));

        let response = self.client.post(&url).form(&form).send()?;
        let status = response.status();
        let body = response.text()?;

        let envelope: ApiEnvelope = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                DownloadError::ApiResolution(format!("Malformed MediaFire API response: {}", e))
            } else {
                DownloadError::ApiResolution(format!("MediaFire API returned HTTP {}", status))
            }
        })?;
        let response = envelope.response;

        if response.result.eq_ignore_ascii_case("error") {
            let code = match &response.error {
                Some(Value::String(code)) => code.clone(),
                Some(other) => other.to_string(),
                None => "unknown".to_string(),
            };
            let message = response.message.as_deref().unwrap_or("no message");
            return Err(DownloadError::ApiResolution(format!(
                "MediaFire API error {}: {}",
                code, message
            )));
        }

        if !status.is_success() {
            return Err(DownloadError::ApiResolution(format!(
                "MediaFire API returned HTTP {}",
                status
            )));
        }

        Ok(response)
    }
}

impl LinkResolver for MediaFireApi {
    fn file_get_links(&self, quick_key: &str) -> Result<Vec<FileLink>> {
        Ok(self
            .request("file/get_links", &[("quick_key", quick_key)])?
            .links)
    }
}

/// The `normal_download` URL of the first link returned for `quick_key`.
pub fn resolve_direct_link<R: LinkResolver + ?Sized>(resolver: &R, quick_key: &str) -> Result<String> {
    let link = resolver
        .file_get_links(quick_key)?
        .into_iter()
        .next()
        .ok_or_else(|| DownloadError::ApiResolution("MediaFire API returned no links".to_string()))?;

    link.normal_download
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            DownloadError::ApiResolution("MediaFire link has no normal_download URL".to_string())
        })
}

pub struct MediafireDownloader<R, T> {
    resolver: R,
    transfer: T,
}

impl MediafireDownloader<MediaFireApi, HttpTransfer> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transfer =
            HttpTransfer::new(&settings.user_agent).map_err(|e| DownloadError::Failed(Box::new(e)))?;
        let api = MediaFireApi::new(transfer.client().clone(), settings.mediafire_api_url.as_str());
        Ok(Self::new(api, transfer))
    }
}

impl<R: LinkResolver, T: Transfer> MediafireDownloader<R, T> {
    pub fn new(resolver: R, transfer: T) -> Self {
        Self { resolver, transfer }
    }

    /// Download then confirm the file landed on disk.
    pub fn run(&self, url: &str, output: &Path) -> Result<PathBuf> {
        self.download(url, output)?;
        verify_exists(output)?;
        Ok(output.to_path_buf())
    }

    /// Every failure comes back wrapped as `DownloadError::Failed`.
    pub fn download(&self, url: &str, output: &Path) -> Result<u64> {
        log::info!("Downloading from {} to {:?}", url, output);
        self.try_download(url, output)
            .map_err(|e| DownloadError::Failed(Box::new(e)))
    }

    fn try_download(&self, url: &str, output: &Path) -> Result<u64> {
        let quick_key = extract_quick_key(url)?;
        log::info!("Quick key: {}", quick_key);

        let direct_url = resolve_direct_link(&self.resolver, &quick_key)?;
        log::debug!("Resolved direct link {}", direct_url);

        self.transfer
            .fetch(&direct_url, output, &TransferOptions::vendor())
    }
}
