//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Serialize;

/// API server configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// HTTP port (`PORT`)
    pub port: u16,

    /// Interface to bind (`PDV_BIND_ADDR`)
    pub bind_addr: IpAddr,

    /// SQLite database file (`PDV_DB_PATH`)
    pub db_path: PathBuf,

    /// Pool size (`PDV_DB_MAX_CONNECTIONS`)
    pub db_max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            port: 3001,
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            db_path: PathBuf::from("./data/db.sqlite"),
            db_max_connections: 5,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            bind_addr: parse_var(&lookup, "PDV_BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            db_path: lookup("PDV_DB_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            db_max_connections: parse_var(&lookup, "PDV_DB_MAX_CONNECTIONS")?
                .unwrap_or(defaults.db_max_connections),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("PDV_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Creates the directory holding the database file, if any.
    pub fn ensure_db_dir(&self) -> Result<(), ConfigError> {
        match self.db_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
                .map_err(|e| ConfigError::DataDir(format!("{}: {}", dir.display(), e))),
            _ => Ok(()),
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(name.to_string()))
        })
        .transpose()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot create data directory {0}")]
    DataDir(String),
}
