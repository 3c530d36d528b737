//! TOML-based service configuration.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::io::LoadError;

/// Top-level service configuration parsed from TOML.
///
/// Every section has defaults, so an empty file (or no file at all, via
/// [`ServiceConfig::default`]) is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Location of the source tables.
    #[serde(default)]
    pub data: DataConfig,
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,
    /// Log filtering.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Location of the source tables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Directories searched in order for the two data files.
    pub search_dirs: Vec<PathBuf>,
    /// Parquet price table file name.
    pub prices_file: String,
    /// CSV generation table file name.
    pub generation_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            search_dirs: vec![PathBuf::from("./data"), PathBuf::from("/app/data")],
            prices_file: "power_prices_data.gzip".to_string(),
            generation_file: "windGenTS.csv".to_string(),
        }
    }
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// Log filtering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"server.port"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

impl ServiceConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let d = &self.data;
        if d.search_dirs.is_empty() {
            errors.push(ConfigError {
                field: "data.search_dirs".into(),
                message: "must list at least one directory".into(),
            });
        }
        if d.prices_file.trim().is_empty() {
            errors.push(ConfigError {
                field: "data.prices_file".into(),
                message: "must not be empty".into(),
            });
        }
        if d.generation_file.trim().is_empty() {
            errors.push(ConfigError {
                field: "data.generation_file".into(),
                message: "must not be empty".into(),
            });
        }

        let s = &self.server;
        if s.host.parse::<IpAddr>().is_err() {
            errors.push(ConfigError {
                field: "server.host".into(),
                message: format!("must be an IP address, got \"{}\"", s.host),
            });
        }
        if s.port == 0 {
            errors.push(ConfigError {
                field: "server.port".into(),
                message: "must be > 0".into(),
            });
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigError {
                field: "logging.level".into(),
                message: format!(
                    "must be one of {}, got \"{}\"",
                    LOG_LEVELS.join(", "),
                    self.logging.level
                ),
            });
        }

        errors
    }

    /// Socket address the API listens on.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `server.host` is not an IP address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.host.parse().map_err(|e| ConfigError {
            field: "server.host".to_string(),
            message: format!("{e}"),
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Finds the first search directory holding both data files.
    ///
    /// Returns `(prices_path, generation_path)`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingData`] naming the price file of the first
    /// search directory when no directory holds both files.
    pub fn resolve_data_paths(&self) -> Result<(PathBuf, PathBuf), LoadError> {
        let d = &self.data;
        let candidates = d
            .search_dirs
            .iter()
            .map(|dir| (dir.join(&d.prices_file), dir.join(&d.generation_file)));

        let mut first_missing = None;
        for (prices, generation) in candidates {
            if prices.is_file() && generation.is_file() {
                return Ok((prices, generation));
            }
            let missing = if prices.is_file() { generation } else { prices };
            first_missing.get_or_insert(missing);
        }

        Err(LoadError::MissingData(
            first_missing.unwrap_or_else(|| PathBuf::from(&d.prices_file)),
        ))
    }
}
