//! Last.fm integration configuration types

use crate::{get_env_or_default, get_required_env, parse_env, ConfigError, ConfigResult};
use std::env;

/// Default Last.fm API base URL
pub const DEFAULT_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Upstream maximum number of items a single API call may return
pub const DEFAULT_PER_REQUEST_CAP: u64 = 1000;

/// Default maximum number of items fetched by one parallel batch
///
/// Chosen conservatively below an empirically observed safe ceiling on
/// concurrent upstream calls; it is not an upstream-mandated value. Must be
/// a multiple of the per-request cap so that page offsets stay whole.
pub const DEFAULT_CHUNK_SIZE: u64 = 5000;

/// Last.fm scrobbling API configuration
#[derive(Debug, Clone)]
pub struct LastfmConfig {
    /// API base URL
    pub base_url: String,

    /// Last.fm API key
    pub api_key: String,

    /// Username whose tracks are fetched
    pub username: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Upstream maximum items per call
    pub per_request_cap: u64,

    /// Maximum items fetched by one parallel batch of calls
    pub chunk_size: u64,
}

impl LastfmConfig {
    /// Load Last.fm configuration from environment variables
    ///
    /// Returns an error if the required variables (API key and username)
    /// are not set. This allows consumers to call `.ok()` to get
    /// `Option<LastfmConfig>`.
    pub fn from_env() -> ConfigResult<Self> {
        let api_key = get_required_env("LASTFM_API_KEY")?;
        let username = get_required_env("LASTFM_USERNAME")?;

        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "LASTFM_API_KEY".to_string(),
                "API key cannot be empty".to_string(),
            ));
        }

        if username.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "LASTFM_USERNAME".to_string(),
                "username cannot be empty".to_string(),
            ));
        }

        let config = Self {
            base_url: get_env_or_default("LASTFM_API_URL", DEFAULT_API_URL),
            api_key,
            username,
            timeout_secs: parse_env("LASTFM_TIMEOUT", 10)?,
            connect_timeout_secs: parse_env("LASTFM_CONNECT_TIMEOUT", 5)?,
            per_request_cap: parse_env("LASTFM_PER_REQUEST_CAP", DEFAULT_PER_REQUEST_CAP)?,
            chunk_size: parse_env("LASTFM_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if Last.fm is configured (both API key and username are set)
    pub fn is_configured() -> bool {
        env::var("LASTFM_API_KEY").is_ok() && env::var("LASTFM_USERNAME").is_ok()
    }

    /// Create a configuration with custom API key and username (useful for testing)
    pub fn new(api_key: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            username: username.into(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
            per_request_cap: DEFAULT_PER_REQUEST_CAP,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the API base URL (useful for pointing at a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-request cap and chunk size
    pub fn with_pagination(mut self, per_request_cap: u64, chunk_size: u64) -> Self {
        self.per_request_cap = per_request_cap;
        self.chunk_size = chunk_size;
        self
    }

    /// Validate pagination parameters
    ///
    /// The chunk size must be a nonzero multiple of the per-request cap,
    /// otherwise planned page offsets would fall between upstream pages.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.per_request_cap == 0 {
            return Err(ConfigError::ValidationError(
                "per_request_cap must be greater than zero".to_string(),
            ));
        }

        if self.chunk_size == 0 || self.chunk_size % self.per_request_cap != 0 {
            return Err(ConfigError::ValidationError(format!(
                "chunk_size ({}) must be a nonzero multiple of per_request_cap ({})",
                self.chunk_size, self.per_request_cap
            )));
        }

        Ok(())
    }

    /// Peak number of concurrent upstream calls one batch may issue
    pub fn max_concurrent_calls(&self) -> u64 {
        self.chunk_size / self.per_request_cap.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = LastfmConfig::new("test-api-key", "testuser");
        assert_eq!(config.api_key, "test-api-key");
        assert_eq!(config.username, "testuser");
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.per_request_cap, 1000);
        assert_eq!(config.chunk_size, 5000);
    }

    #[test]
    fn test_with_base_url() {
        let config = LastfmConfig::new("key", "user").with_base_url("http://localhost:8080");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_validate_default_is_ok() {
        let config = LastfmConfig::new("key", "user");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_multiple_chunk_size() {
        let config = LastfmConfig::new("key", "user").with_pagination(1000, 4500);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let config = LastfmConfig::new("key", "user").with_pagination(0, 5000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let config = LastfmConfig::new("key", "user").with_pagination(1000, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_concurrent_calls() {
        let config = LastfmConfig::new("key", "user");
        assert_eq!(config.max_concurrent_calls(), 5);

        let config = config.with_pagination(500, 2000);
        assert_eq!(config.max_concurrent_calls(), 4);
    }
}
