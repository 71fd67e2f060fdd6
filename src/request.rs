use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::download::{TransferOptions, MAX_CHUNK_SIZE};
use crate::error::{DownloadError, Result};

pub const DOWNLOAD_ACTION: &str = "download";

/// A download request as sent by the host on stdin.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadRequest {
    pub action: String,
    pub url: String,
    pub file_path: String,
    /// Opaque to the download itself; any JSON value is accepted.
    pub download_id: Value,
    #[serde(default, deserialize_with = "lenient_options")]
    pub options: RequestOptions,
}

/// Recognised keys of the free-form `options` object. Unknown keys and
/// values of the wrong type are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub user_agent: Option<String>,
    pub sha256: Option<String>,
    pub remove_partial: bool,
    pub chunk_size: Option<usize>,
}

impl RequestOptions {
    pub fn from_value(value: &Value) -> Self {
        let mut options = RequestOptions::default();

        let map = match value {
            Value::Null => return options,
            Value::Object(map) => map,
            other => {
                log::warn!("Ignoring options: expected an object, got {}", other);
                return options;
            }
        };

        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "user_agent" => match value.as_str() {
                    Some(agent) => options.user_agent = Some(agent.to_string()),
                    None => ignore_option(key, value, "a string"),
                },
                "sha256" => match value.as_str() {
                    Some(hash) => options.sha256 = Some(hash.to_string()),
                    None => ignore_option(key, value, "a string"),
                },
                "remove_partial" => match value.as_bool() {
                    Some(flag) => options.remove_partial = flag,
                    None => ignore_option(key, value, "a boolean"),
                },
                "chunk_size" => match value
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .filter(|n| (1..=MAX_CHUNK_SIZE).contains(n))
                {
                    Some(size) => options.chunk_size = Some(size),
                    None => ignore_option(key, value, "an integer between 1 and 1048576"),
                },
                _ => log::debug!("Ignoring unrecognised option {}", key),
            }
        }

        options
    }
}

fn ignore_option(key: &str, value: &Value, expected: &str) {
    log::warn!("Ignoring options.{}: expected {}, got {}", key, expected, value);
}

fn lenient_options<'de, D>(deserializer: D) -> std::result::Result<RequestOptions, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| RequestOptions::from_value(&value))
}

impl DownloadRequest {
    /// Parses stdin text. The action is checked before any other field.
    pub fn parse(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| DownloadError::MalformedInput(format!("Invalid JSON input: {}", e)))?;

        let object = value.as_object().ok_or_else(|| {
            DownloadError::MalformedInput("Expected a JSON object as input".to_string())
        })?;

        match object.get("action") {
            Some(Value::String(action)) if action == DOWNLOAD_ACTION => {}
            other => return Err(DownloadError::UnknownAction(render_action(other))),
        }

        if !object.contains_key("download_id") {
            return Err(DownloadError::MalformedInput(
                "Invalid download request: missing field `download_id`".to_string(),
            ));
        }

        let request: DownloadRequest = serde_json::from_value(value).map_err(|e| {
            DownloadError::MalformedInput(format!("Invalid download request: {}", e))
        })?;

        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(DownloadError::MalformedInput("Request url is empty".to_string()));
        }

        match url::Url::parse(&self.url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(DownloadError::InvalidUrl {
                    url: self.url.clone(),
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                })
            }
            Err(e) => {
                return Err(DownloadError::InvalidUrl {
                    url: self.url.clone(),
                    reason: e.to_string(),
                })
            }
        }

        if self.file_path.trim().is_empty() {
            return Err(DownloadError::MalformedInput(
                "Request file_path is empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// The id as the host sent it, without JSON quoting for strings.
    pub fn download_id_label(&self) -> String {
        match &self.download_id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }

    pub fn transfer_options(&self) -> TransferOptions {
        let mut options = TransferOptions::generic();
        if let Some(size) = self.options.chunk_size {
            options.chunk_size = size;
        }
        options
    }
}

/// Renders the action the way the host's plugin runner has always reported it:
/// absent or null as `None`, booleans as `True`/`False`.
fn render_action(action: Option<&Value>) -> String {
    match action {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
