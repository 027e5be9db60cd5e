//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults suit local development.
//!
//! - `BAZAAR_DATABASE_URL` - SQLite connection string (falls back to
//!   `DATABASE_URL`, default: `sqlite://bazaar.db`)
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 3000)
//! - `BAZAAR_BASE_URL` - Public URL (default: <http://localhost:3000>).
//!   An `https://` URL marks the session cookie `Secure`.
//! - `BAZAAR_UPLOAD_DIR` - Directory for product photos (default: uploads)
//! - `BAZAAR_STATIC_DIR` - Stylesheets and other assets (default: crates/storefront/static)
//! - `BAZAAR_MAX_UPLOAD_BYTES` - Request body limit for photo uploads (default: 5 MiB)
//! - `BAZAAR_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://bazaar.db";
const DEFAULT_MAX_UPLOAD_BYTES: &str = "5242880";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// SQLite connection URL
    pub database_url: SecretString,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory holding uploaded product photos
    pub upload_dir: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Largest accepted request body on the photo upload route
    pub max_upload_bytes: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let database_url = env
            .get("BAZAAR_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());

        Ok(Self {
            database_url: SecretString::from(database_url),
            db_max_connections: env.parse("BAZAAR_DB_MAX_CONNECTIONS", "5")?,
            host: env.parse("BAZAAR_HOST", "127.0.0.1")?,
            port: env.parse("BAZAAR_PORT", "3000")?,
            base_url: env.get_or("BAZAAR_BASE_URL", "http://localhost:3000"),
            upload_dir: PathBuf::from(env.get_or("BAZAAR_UPLOAD_DIR", "uploads")),
            static_dir: PathBuf::from(env.get_or("BAZAAR_STATIC_DIR", "crates/storefront/static")),
            max_upload_bytes: env.parse("BAZAAR_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get a variable, treating an empty value as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }

    fn parse<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
    }
}
