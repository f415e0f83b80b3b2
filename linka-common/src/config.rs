//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from a TOML file; every field has a
//! built-in default so a missing file is not an error. Settings sources,
//! highest priority first:
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! Command-line and environment values are both collected by the binary's
//! `clap` parser and applied through [`ConfigOverrides`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LINKA_CONFIG";

/// Top-level bootstrap configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkaConfig {
    /// HTTP server port
    pub port: u16,

    /// Address to bind the HTTP listener to
    pub bind_address: String,

    /// Analytics warehouse holding campaign/audience/message records
    pub warehouse: WarehouseConfig,

    /// Document store holding user profiles
    pub profiles: ProfileStoreConfig,

    /// Historial read-model tuning
    pub historial: HistorialConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for LinkaConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "127.0.0.1".to_string(),
            warehouse: WarehouseConfig::default(),
            profiles: ProfileStoreConfig::default(),
            historial: HistorialConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Analytics warehouse location and table naming
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// sqlx connection URL
    pub database_url: String,

    /// Dataset prefix; tables resolve as `<dataset>_<table>` when non-empty
    pub dataset: String,

    pub campaigns_table: String,
    pub audiences_table: String,
    pub messages_table: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://linka-warehouse.db".to_string(),
            dataset: "LINKA".to_string(),
            campaigns_table: "Campanas".to_string(),
            audiences_table: "Audiencias".to_string(),
            messages_table: "Mensajes".to_string(),
        }
    }
}

impl WarehouseConfig {
    /// Fully qualified table name for a logical table
    pub fn qualified(&self, table: &str) -> String {
        if self.dataset.is_empty() {
            table.to_string()
        } else {
            format!("{}_{}", self.dataset, table)
        }
    }

    pub fn campaigns(&self) -> String {
        self.qualified(&self.campaigns_table)
    }

    pub fn audiences(&self) -> String {
        self.qualified(&self.audiences_table)
    }

    pub fn messages(&self) -> String {
        self.qualified(&self.messages_table)
    }
}

/// Profile document store location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileStoreConfig {
    /// sqlx connection URL
    pub database_url: String,

    /// Collection (table) holding one row per user
    pub collection: String,
}

impl Default for ProfileStoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://linka-profiles.db".to_string(),
            collection: "usuarios".to_string(),
        }
    }
}

/// Historial read-model tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorialConfig {
    /// Timeout applied to each external read (single attempt)
    pub query_timeout_ms: u64,

    /// Maximum profile lookups in flight per request
    pub lookup_concurrency: usize,

    /// Page size when the request omits `limit`
    pub default_page_size: u32,

    /// Largest accepted `limit`
    pub max_page_size: u32,
}

impl Default for HistorialConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 5000,
            lookup_concurrency: 16,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl HistorialConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub warehouse_url: Option<String>,
    pub profiles_url: Option<String>,
    pub log_level: Option<String>,
}

impl LinkaConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve and load the config file, falling back to built-in defaults
    ///
    /// An explicitly named file (CLI or environment) must exist; the
    /// platform default locations are optional.
    pub fn load_or_default(cli_arg: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_config_path(cli_arg) {
            info!("Loading configuration from {}", path.display());
            return Self::load(&path);
        }

        match default_config_file() {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply command-line/environment overrides on top of file values
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(addr) = overrides.bind_address {
            self.bind_address = addr;
        }
        if let Some(url) = overrides.warehouse_url {
            self.warehouse.database_url = url;
        }
        if let Some(url) = overrides.profiles_url {
            self.profiles.database_url = url;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Check identifiers and numeric limits
    pub fn validate(&self) -> Result<()> {
        let identifiers = [
            ("warehouse.campaigns_table", self.warehouse.campaigns()),
            ("warehouse.audiences_table", self.warehouse.audiences()),
            ("warehouse.messages_table", self.warehouse.messages()),
            ("profiles.collection", self.profiles.collection.clone()),
        ];
        for (key, name) in identifiers {
            if !is_valid_identifier(&name) {
                return Err(Error::Config(format!("Invalid identifier for {}: '{}'", key, name)));
            }
        }

        let h = &self.historial;
        if h.query_timeout_ms == 0 {
            return Err(Error::Config("historial.query_timeout_ms must be positive".to_string()));
        }
        if h.lookup_concurrency == 0 {
            return Err(Error::Config("historial.lookup_concurrency must be positive".to_string()));
        }
        if h.default_page_size == 0 || h.max_page_size == 0 {
            return Err(Error::Config("historial page sizes must be positive".to_string()));
        }
        if h.default_page_size > h.max_page_size {
            return Err(Error::Config(format!(
                "historial.default_page_size ({}) exceeds max_page_size ({})",
                h.default_page_size, h.max_page_size
            )));
        }

        Ok(())
    }
}

/// Table and collection names are interpolated into SQL, so only
/// alphanumerics and underscore are allowed
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 100
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Config path from command-line argument, then environment variable
fn explicit_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    std::env::var(CONFIG_ENV_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// First existing platform config file: user config dir, then /etc
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("linka").join("config.toml"));
    let system_config = PathBuf::from("/etc/linka/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|p| p.exists())
}
