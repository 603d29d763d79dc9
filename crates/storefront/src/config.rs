//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HOLYCAT_API_URL` - Base URL of the HolyCat backend API
//!
//! ## Optional
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `HOLYCAT_API_TIMEOUT_SECS` - Backend request timeout (default: 15)
//! - `PRODUCT_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// HolyCat backend connection settings
    pub api: ApiConfig,
    /// How long product listings stay cached
    pub product_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// HolyCat backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without a trailing slash (e.g., `https://api.holycat.id`)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(get);

        let host = vars.parse_or("STOREFRONT_HOST", "127.0.0.1")?;
        let port = vars.parse_or("STOREFRONT_PORT", "3000")?;
        let base_url = vars
            .or_default("STOREFRONT_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();

        let api = ApiConfig {
            base_url: validate_http_url("HOLYCAT_API_URL", &vars.required("HOLYCAT_API_URL")?)?,
            timeout: Duration::from_secs(vars.parse_or("HOLYCAT_API_TIMEOUT_SECS", "15")?),
        };
        let product_cache_ttl = Duration::from_secs(vars.parse_or("PRODUCT_CACHE_TTL_SECS", "300")?);

        Ok(Self {
            host,
            port,
            base_url,
            api,
            product_cache_ttl,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: vars.parse_or("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: vars.parse_or("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Require an absolute http(s) URL and strip its trailing slash.
fn validate_http_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("HOLYCAT_API_URL", "http://localhost:8080/api/")]).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout, Duration::from_secs(15));
        assert_eq!(config.product_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(!config.is_https());
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "HOLYCAT_API_URL"));
    }

    #[test]
    fn test_rejects_non_http_api_url() {
        let err = load(&[("HOLYCAT_API_URL", "ftp://files.holycat.id")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        let err = load(&[("HOLYCAT_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("HOLYCAT_API_URL", "https://api.holycat.id"),
            ("STOREFRONT_PORT", "http"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_socket_addr_and_https() {
        let config = load(&[
            ("HOLYCAT_API_URL", "https://api.holycat.id"),
            ("STOREFRONT_BASE_URL", "https://holycat.id/"),
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8000"),
        ])
        .unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8000);
        assert_eq!(config.base_url, "https://holycat.id");
        assert!(config.is_https());
    }
}
