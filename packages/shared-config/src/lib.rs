//! Shared configuration types for Encore services
//!
//! This crate provides configuration types loaded from environment
//! variables, ensuring every consumer of the Last.fm middleware reads the
//! same settings the same way.

mod error;
mod lastfm;

pub use error::{ConfigError, ConfigResult};
pub use lastfm::{LastfmConfig, DEFAULT_API_URL, DEFAULT_CHUNK_SIZE, DEFAULT_PER_REQUEST_CAP};

use std::env;

/// Load a `.env` file into the process environment if one is present
///
/// Call once at process startup, before reading any configuration.
/// Missing files are ignored.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Helper function to get a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
