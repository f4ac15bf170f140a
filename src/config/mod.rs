//! Client configuration.
//!
//! Everything has a default, so an empty TOML document is a valid config. The
//! only environment variable consulted is [`ENV_BASE_URL`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::files::storage::expand;

pub const ENV_BASE_URL: &str = "QUERYGRID_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://super-ai-duck-db-backend.vercel.app";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_LIMIT: usize = 10;
const DEFAULT_EXPORT_FILE_NAME: &str = "data.csv";
const DEFAULT_ACCEPTED_EXTENSIONS: &[&str] = &["csv", "txt"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            export_file_name: default_export_file_name(),
            accepted_extensions: default_accepted_extensions(),
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Base URL without trailing slashes.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file. `~` is expanded.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = expand(path.as_ref());
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Defaults, with the base URL taken from [`ENV_BASE_URL`] when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_lookup(|key| std::env::var(key).ok())
    }

    fn from_env_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            config.service.base_url = base_url.trim().to_string();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.service.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::invalid("service.base_url must not be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(format!(
                "service.base_url must start with http:// or https://, got {base_url}"
            )));
        }
        if self.service.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "service.request_timeout_secs must be greater than zero",
            ));
        }
        if self.session.page_limit == 0 {
            return Err(ConfigError::invalid(
                "session.page_limit must be greater than zero",
            ));
        }
        if self.session.export_file_name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "session.export_file_name must not be empty",
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_page_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

fn default_accepted_extensions() -> Vec<String> {
    DEFAULT_ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}
