//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// Largest PDF the client accepts for upload (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Limits and delays applied by the upload pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadPolicy {
    pub max_file_size: u64,
    /// Time spent in `processing` before an entry is shown as `completed`.
    pub completion_delay: Duration,
    /// Time a `completed` entry stays visible before it is dropped.
    pub removal_delay: Duration,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_UPLOAD_BYTES,
            completion_delay: Duration::from_secs(1),
            removal_delay: Duration::from_secs(3),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub log_level: Level,
    pub upload: UploadPolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Backend Settings ---
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 120)?);
        let page_size = parse_var("PAGE_SIZE", 10u32)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Upload Pipeline Settings ---
        let upload = UploadPolicy {
            max_file_size: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            completion_delay: Duration::from_millis(parse_var("UPLOAD_COMPLETION_DELAY_MS", 1000)?),
            removal_delay: Duration::from_millis(parse_var("UPLOAD_REMOVAL_DELAY_MS", 3000)?),
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            page_size,
            log_level,
            upload,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
