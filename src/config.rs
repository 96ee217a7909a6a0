//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use std::path::PathBuf;

use serde::Deserialize;

/// Which persistence backend holds the key and log collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON blobs on local disk (`keys.json`, `logs.json`)
    Local,
    /// PostgreSQL tables (`api_keys`, `search_logs`)
    Postgres,
}

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `ADMIN_PASSWORD` (required): shared secret for the admin panel
/// - `LOOKUP_BASE_URL` (required): base URL of the external lookup API
/// - `STORAGE_BACKEND` (optional): `local` or `postgres`, defaults to `local`
/// - `DATABASE_URL` (required for `postgres`): PostgreSQL connection string
/// - `LOCAL_STORE_DIR` (optional): blob directory for `local`, defaults to `./data`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `SESSION_TTL_SECS` (optional): idle session lifetime, defaults to one day
/// - `LOOKUP_TIMEOUT_SECS` (optional): outbound timeout, unset means none
/// - `REVALIDATE_PORTAL_SESSIONS` (optional): re-check keys on every portal request
/// - `BOOTSTRAP_KEY_NAME` / `BOOTSTRAP_KEY` (optional): key seeded into an empty store
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub admin_password: String,

    pub lookup_base_url: String,

    #[serde(default = "default_backend")]
    pub storage_backend: StorageBackend,

    pub database_url: Option<String>,

    #[serde(default = "default_store_dir")]
    pub local_store_dir: PathBuf,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    pub lookup_timeout_secs: Option<u64>,

    #[serde(default)]
    pub revalidate_portal_sessions: bool,

    pub bootstrap_key_name: Option<String>,

    pub bootstrap_key: Option<String>,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Local
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

/// Configuration that parsed but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envy::Error),

    #[error("ADMIN_PASSWORD must not be empty")]
    EmptyAdminPassword,

    #[error("LOOKUP_BASE_URL is not a valid http(s) URL: {0}")]
    InvalidLookupUrl(String),

    #[error("DATABASE_URL is required when STORAGE_BACKEND=postgres")]
    MissingDatabaseUrl,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., ADMIN_PASSWORD)
    /// - Environment variable values cannot be parsed into expected types
    /// - The values parse but are unusable (see [`Config::validate`])
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_password.is_empty() {
            return Err(ConfigError::EmptyAdminPassword);
        }

        let parsed = url::Url::parse(&self.lookup_base_url)
            .map_err(|e| ConfigError::InvalidLookupUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidLookupUrl(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }

        if self.storage_backend == StorageBackend::Postgres && self.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        Ok(())
    }

    /// Session idle lifetime, capped at one year.
    pub fn session_ttl(&self) -> chrono::Duration {
        let secs = self.session_ttl_secs.min(MAX_SESSION_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    /// The bootstrap key pair, when both halves are configured and non-blank.
    pub fn bootstrap_key(&self) -> Option<(&str, &str)> {
        let name = self.bootstrap_key_name.as_deref()?.trim();
        let key = self.bootstrap_key.as_deref()?.trim();
        (!name.is_empty() && !key.is_empty()).then_some((name, key))
    }
}
