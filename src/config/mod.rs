//! Configuration loading and management

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:3001`
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
        }
    }
}

/// Where issued suffixes are remembered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// Process-local; forgotten on restart
    Memory,
    /// JSON file that survives restarts
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_backend")]
    pub backend: RegistryBackend,

    /// Registry file, used by the `file` backend
    #[serde(default = "default_registry_path")]
    pub path: PathBuf,
}

fn default_registry_backend() -> RegistryBackend {
    RegistryBackend::File
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("used_invoice_suffixes.json")
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: default_registry_backend(),
            path: default_registry_path(),
        }
    }
}

/// Complete configuration for the invoice desk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// sqlx connection URL for the record store
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub registry: RegistryConfig,

    /// Pause between stamping a new number and handing the invoice to print
    #[serde(default = "default_print_delay_ms")]
    pub print_delay_ms: u64,
}

fn default_database_url() -> String {
    "sqlite://invoices.db".to_string()
}

fn default_print_delay_ms() -> u64 {
    50
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl DeskConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::Parse {
                message: format!("{}: {}", path, e),
            },
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database_url".to_string(),
                value: self.database_url.clone(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "server.bind".to_string(),
                value: self.server.bind.clone(),
                message: e.to_string(),
            })
    }

    pub fn print_delay(&self) -> Duration {
        Duration::from_millis(self.print_delay_ms)
    }

    /// Defaults matching a local single-user install
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            database_url: default_database_url(),
            registry: RegistryConfig::default(),
            print_delay_ms: default_print_delay_ms(),
        }
    }
}
