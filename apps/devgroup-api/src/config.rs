use std::net::SocketAddr;

use devgroup_pihole::config::{ConfigError as DirectoryConfigError, DirectoryConfig};

/// Configuration for the device-group service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address for the HTTP server.
    pub listen_addr: SocketAddr,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Directory connection settings.
    pub directory: DirectoryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let listen_addr = reader("DEVGROUP_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3001".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("DEVGROUP_LISTEN_ADDR".into(), e.to_string()))?;

        let log_filter = reader("DEVGROUP_LOG_FILTER")
            .unwrap_or_else(|_| "info,devgroup_pihole=debug,devgroup_api=debug".to_string());

        let directory = DirectoryConfig::from_reader(&reader)?;

        Ok(Self {
            listen_addr,
            log_filter,
            directory,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error(transparent)]
    Directory(#[from] DirectoryConfigError),
}
