//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ASSET_DIR` - Directory uploaded assets are stored in (default: ./assets)
//! - `ASSET_BASE_URL` - Public URL prefix for stored assets (default: /files,
//!   which the admin serves itself)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory uploaded assets are stored in
    pub asset_dir: PathBuf,
    /// Public URL prefix assets are served under
    pub asset_base_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl AdminConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = SecretString::from(required("ADMIN_DATABASE_URL")?);

        let host: IpAddr = optional("ADMIN_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse()
            .map_err(|e| invalid("ADMIN_HOST", &e))?;
        let port: u16 = optional("ADMIN_PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse()
            .map_err(|e| invalid("ADMIN_PORT", &e))?;

        let asset_dir =
            PathBuf::from(optional("ASSET_DIR").unwrap_or_else(|| "./assets".to_string()));
        let asset_base_url = optional("ASSET_BASE_URL").unwrap_or_else(|| "/files".to_string());

        let sentry_sample_rate: f32 = optional("SENTRY_SAMPLE_RATE")
            .unwrap_or_else(|| "1.0".to_string())
            .parse()
            .map_err(|e| invalid("SENTRY_SAMPLE_RATE", &e))?;
        let sentry_traces_sample_rate: f32 = optional("SENTRY_TRACES_SAMPLE_RATE")
            .unwrap_or_else(|| "0.1".to_string())
            .parse()
            .map_err(|e| invalid("SENTRY_TRACES_SAMPLE_RATE", &e))?;

        Ok(Self {
            database_url,
            host,
            port,
            asset_dir,
            asset_base_url,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Socket address the server binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn invalid(name: &str, err: &dyn std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(name.to_string(), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("ADMIN_DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: ADMIN_DATABASE_URL"
        );
    }
}
