//! Configuration management for the client.

use reqwest::Url;
use std::env;
use std::time::Duration;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default path of the booking list endpoint.
const DEFAULT_BOOKINGS_PATH: &str = "/api/v1/bookings";

/// Default path under which profiles are updated (`{path}/{id}`).
const DEFAULT_USERS_PATH: &str = "/api/v1/users";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the booking service
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Path of the booking list endpoint
    pub bookings_path: String,
    /// Path prefix of the profile update endpoint
    pub users_path: String,
}

impl ClientConfig {
    /// Configuration with default paths and timeout.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bookings_path: DEFAULT_BOOKINGS_PATH.to_string(),
            users_path: DEFAULT_USERS_PATH.to_string(),
        })
    }

    /// Load configuration from environment variables, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, keyed by environment variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("CLINIC_API_URL").ok_or(ConfigError::MissingApiUrl)?;
        let mut config = Self::new(&base_url)?;

        if let Some(timeout) = lookup("CLINIC_API_TIMEOUT_SECS") {
            let secs: u64 = timeout.parse().map_err(|_| ConfigError::InvalidTimeout)?;
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout);
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("CLINIC_BOOKINGS_PATH") {
            config.bookings_path = path;
        }
        if let Some(path) = lookup("CLINIC_USERS_PATH") {
            config.users_path = path;
        }

        Ok(config)
    }

    /// URL of the booking list endpoint.
    pub fn bookings_url(&self) -> Result<Url, ConfigError> {
        self.endpoint(&self.bookings_path, None)
    }

    /// URL of the update endpoint for `profile_id`.
    pub fn profile_url(&self, profile_id: &str) -> Result<Url, ConfigError> {
        self.endpoint(&self.users_path, Some(profile_id))
    }

    fn endpoint(&self, path: &str, id: Option<&str>) -> Result<Url, ConfigError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ConfigError::InvalidApiUrl(self.base_url.to_string()))?;
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidApiUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::InvalidApiUrl(raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CLINIC_API_URL environment variable is required")]
    MissingApiUrl,

    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(String),

    #[error("Invalid CLINIC_API_TIMEOUT_SECS value")]
    InvalidTimeout,
}
