use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use simplelog::LevelFilter;

pub const APP_NAME: &str = "plugin-downloaders";
pub const MEDIAFIRE_API_URL: &str = "https://www.mediafire.com/api/1.5";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

pub const ENV_LOG_LEVEL: &str = "PLUGIN_DL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PLUGIN_DL_LOG_DIR";
pub const ENV_USER_AGENT: &str = "PLUGIN_DL_USER_AGENT";
pub const ENV_MEDIAFIRE_API_URL: &str = "MEDIAFIRE_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDir {
    Default,
    Disabled,
    Custom(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub log_level: LevelFilter,
    pub log_dir: LogDir,
    pub user_agent: String,
    pub mediafire_api_url: String,
    /// Problems found while reading the environment, reported once logging is up.
    pub warnings: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
            log_dir: LogDir::Default,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            mediafire_api_url: MEDIAFIRE_API_URL.to_string(),
            warnings: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(raw) = non_empty(lookup(ENV_LOG_LEVEL)) {
            match parse_level(&raw) {
                Ok(level) => settings.log_level = level,
                Err(e) => settings.warnings.push(format!("{:#}", e)),
            }
        }

        if let Some(dir) = non_empty(lookup(ENV_LOG_DIR)) {
            settings.log_dir = if dir.eq_ignore_ascii_case("none") {
                LogDir::Disabled
            } else {
                LogDir::Custom(PathBuf::from(dir))
            };
        }

        if let Some(agent) = non_empty(lookup(ENV_USER_AGENT)) {
            settings.user_agent = agent;
        }

        if let Some(api) = non_empty(lookup(ENV_MEDIAFIRE_API_URL)) {
            settings.mediafire_api_url = api.trim_end_matches('/').to_string();
        }

        settings
    }

    /// Directory for per-invocation log files, `None` when file logging is off.
    pub fn resolve_log_dir(&self) -> Result<Option<PathBuf>> {
        match &self.log_dir {
            LogDir::Disabled => Ok(None),
            LogDir::Custom(dir) => Ok(Some(dir.clone())),
            LogDir::Default => {
                let dir = directories::BaseDirs::new()
                    .ok_or_else(|| anyhow::anyhow!("Failed to get base directories"))?
                    .data_local_dir()
                    .join(APP_NAME)
                    .join("logs");
                Ok(Some(dir))
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_level(raw: &str) -> Result<LevelFilter> {
    raw.parse::<LevelFilter>()
        .ok()
        .with_context(|| format!("Ignoring {}={:?}: not a log level", ENV_LOG_LEVEL, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_with(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let settings = settings_with(&[]);
        assert_eq!(settings.log_level, LevelFilter::Info);
        assert_eq!(settings.log_dir, LogDir::Default);
        assert_eq!(settings.mediafire_api_url, MEDIAFIRE_API_URL);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
        assert!(settings.warnings.is_empty());
    }

    #[test]
    fn overrides_from_environment() {
        let settings = settings_with(&[
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_DIR, "/var/log/dl"),
            (ENV_USER_AGENT, "tester/1.0"),
            (ENV_MEDIAFIRE_API_URL, "http://127.0.0.1:9000/api/"),
        ]);
        assert_eq!(settings.log_level, LevelFilter::Debug);
        assert_eq!(settings.log_dir, LogDir::Custom(PathBuf::from("/var/log/dl")));
        assert_eq!(settings.user_agent, "tester/1.0");
        assert_eq!(settings.mediafire_api_url, "http://127.0.0.1:9000/api");
    }

    #[test]
    fn none_disables_file_logging() {
        let settings = settings_with(&[(ENV_LOG_DIR, "NONE")]);
        assert_eq!(settings.resolve_log_dir().unwrap(), None);
    }

    #[test]
    fn bad_level_keeps_default_and_warns() {
        let settings = settings_with(&[(ENV_LOG_LEVEL, "loud")]);
        assert_eq!(settings.log_level, LevelFilter::Info);
        assert_eq!(settings.warnings.len(), 1);
        assert!(settings.warnings[0].contains("loud"));
    }
}
