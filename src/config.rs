//! Dashboard configuration
//!
//! Defaults, then an optional YAML file, then environment overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Env var overriding `api.base_url`
pub const ENV_API_URL: &str = "OJS_API_URL";
/// Env var overriding `server.address`
pub const ENV_BIND_ADDRESS: &str = "OJS_BIND_ADDRESS";
/// Env var overriding `server.port`
pub const ENV_PORT: &str = "OJS_PORT";
/// Env var overriding `log_level`
pub const ENV_LOG_LEVEL: &str = "OJS_LOG_LEVEL";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// REST API client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the knowledge REST API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// ORCID enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrcidConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OrcidConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://pub.orcid.org/v3.0".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Dashboard HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Articles revealed per "show more"
    pub page_size: usize,
    /// Restrict the graph to articles matching the section/author filters.
    /// Filters are never sent to the API.
    pub apply_filters: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            apply_filters: false,
        }
    }
}

/// RDF export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Base IRI that `kind:id` URIs expand under
    pub base_iri: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_iri: "http://example.org/ojs/".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub orcid: OrcidConfig,
    pub server: ServerConfig,
    pub view: ViewConfig,
    pub export: ExportConfig,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
}

impl DashboardConfig {
    /// Parse a YAML document; missing sections keep their defaults
    pub fn from_yaml(input: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(input)?;
        Ok(config)
    }

    /// Read a YAML file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Defaults, optional file, then process environment; validated
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(address) = lookup(ENV_BIND_ADDRESS) {
            self.server.address = address;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "server.port",
                value: port,
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        Ok(())
    }

    /// Check URLs, page size and log level
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [("api.base_url", &self.api.base_url), ("orcid.base_url", &self.orcid.base_url)] {
            if reqwest::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl { field, value: value.clone() });
            }
        }
        if self.view.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "view.page_size",
                value: "0".to_string(),
            });
        }
        self.tracing_level()?;
        Ok(())
    }

    /// The configured level; empty means `info`
    pub fn tracing_level(&self) -> ConfigResult<tracing::Level> {
        if self.log_level.is_empty() {
            return Ok(tracing::Level::INFO);
        }
        tracing::Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidValue {
            field: "log_level",
            value: self.log_level.clone(),
        })
    }

    /// `address:port` for the listener
    pub fn bind_address(&self) -> String {
        self.server.bind_address()
    }
}
