//! Client configuration.
//!
//! ```toml
//! base_url = "https://api.example.com/api/v1"
//! load_more_threshold = 15
//! request_timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Items that must be rendered before scroll-triggered paging kicks in.
pub const DEFAULT_LOAD_MORE_THRESHOLD: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the v1 API.
    pub base_url: String,
    /// Root of the v2 API; derived from `base_url` when unset.
    pub v2_base_url: Option<String>,
    pub load_more_threshold: usize,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            v2_base_url: None,
            load_more_threshold: DEFAULT_LOAD_MORE_THRESHOLD,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },
}

impl ClientConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `DONTBE_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("DONTBE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(url) = lookup("DONTBE_V2_BASE_URL") {
            self.v2_base_url = Some(url);
        }
        if let Some(raw) = lookup("DONTBE_LOAD_MORE_THRESHOLD") {
            self.load_more_threshold = raw.parse().map_err(|_| ConfigError::Env {
                key: "DONTBE_LOAD_MORE_THRESHOLD",
                value: raw,
            })?;
        }
        Ok(self)
    }

    /// Effective v2 root.
    pub fn v2_base_url(&self) -> String {
        if let Some(url) = &self.v2_base_url {
            return url.clone();
        }
        let trimmed = self.base_url.trim_end_matches('/');
        match trimmed.strip_suffix('1') {
            Some(prefix) if prefix.ends_with('v') => format!("{}2", prefix),
            _ => trimmed.to_string(),
        }
    }
}
