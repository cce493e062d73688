use std::time::Duration;

/// Default directory host when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://192.168.0.200";

/// Connection settings for the directory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Base URL of the directory API, without trailing slash.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Tests supply variables this way instead of mutating the process
    /// environment.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let base_url = reader("PIHOLE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "PIHOLE_BASE_URL".into(),
                format!("expected an http(s) URL, got '{base_url}'"),
            ));
        }

        let request_timeout_secs = reader("PIHOLE_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidValue("PIHOLE_REQUEST_TIMEOUT_SECS".into(), e.to_string())
            })?;

        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PIHOLE_REQUEST_TIMEOUT_SECS".into(),
                "must be greater than zero".into(),
            ));
        }

        Ok(Self {
            base_url,
            request_timeout_secs,
        })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
