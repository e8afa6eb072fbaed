//! Persisted config (poems root, rhyme service settings) in the app data directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app_data;
use crate::rhymes::{
    FetcherConfig, DEFAULT_BASE_URL, DEFAULT_LIMIT, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the user's poems directory (chosen by them).
    pub poems_root: Option<String>,
    pub rhymes: RhymeSettings,
}

/// The `[rhymes]` table. Any missing key takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhymeSettings {
    /// Lookup endpoint; the query word is appended as the last path segment.
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Candidates returned when the caller does not ask for a specific count.
    pub limit: usize,
}

impl Default for RhymeSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl RhymeSettings {
    /// Validates the settings and turns them into a fetcher config.
    pub fn fetcher_config(&self) -> Result<FetcherConfig, ConfigError> {
        let base_url = parse_base_url(&self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        let user_agent = if self.user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            self.user_agent.clone()
        };
        Ok(FetcherConfig {
            base_url,
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent,
            default_limit: self.limit,
        })
    }
}

fn parse_base_url(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s).map_err(|e| ConfigError::BaseUrl(s.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::BaseUrl(
            s.to_string(),
            "expected an http(s) URL with a path".to_string(),
        ));
    }
    Ok(url)
}

/// Load config from the app data directory. Returns default config if missing or invalid.
pub fn load_config() -> Config {
    match app_data::app_data_dir() {
        Some(dir) => load_config_from(&dir.join(CONFIG_FILENAME)),
        None => Config::default(),
    }
}

/// Load config from an explicit file. Same fallback rules as [load_config].
pub fn load_config_from(path: &Path) -> Config {
    let Ok(s) = std::fs::read_to_string(path) else {
        return Config::default();
    };
    toml::from_str(&s).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
        Config::default()
    })
}

/// Save config to the app data directory.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let data_dir = app_data::app_data_dir().ok_or(ConfigError::NoDataDir)?;
    save_config_to(config, &data_dir.join(CONFIG_FILENAME))
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let s = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    std::fs::write(path, s).map_err(ConfigError::Write)
}

/// Get the configured poems root path, if any.
pub fn get_poems_root() -> Option<PathBuf> {
    load_config()
        .poems_root
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Set and persist the poems root.
pub fn set_poems_root(path: &Path) -> Result<(), ConfigError> {
    let path = path.canonicalize().map_err(ConfigError::Canonicalize)?;
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory(path));
    }
    let mut config = load_config();
    config.poems_root = Some(path.to_string_lossy().into_owned());
    save_config(&config)
}

/// Set and persist the rhyme service base URL.
pub fn set_base_url(url: &str) -> Result<(), ConfigError> {
    parse_base_url(url)?;
    let mut config = load_config();
    config.rhymes.base_url = url.to_string();
    save_config(&config)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine app data directory")]
    NoDataDir,
    #[error("failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("failed to write config: {0}")]
    Write(std::io::Error),
    #[error("failed to resolve path: {0}")]
    Canonicalize(std::io::Error),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("invalid rhyme service URL {0:?}: {1}")]
    BaseUrl(String, String),
    #[error("rhyme lookup timeout must be at least one second")]
    ZeroTimeout,
    #[error("rhyme limit must be positive")]
    ZeroLimit,
}
