//! Access key model.
//!
//! An access key is the secret token a portal user presents to open a lookup session.
//! Keys are stored in plaintext so the admin panel can display and copy them.

use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix carried by every generated key value.
pub const GENERATED_KEY_PREFIX: &str = "ak_";

/// Number of random alphanumeric characters after the prefix.
pub const GENERATED_KEY_LEN: usize = 24;

/// Represents an access key record.
///
/// # Storage
///
/// Maps to the `api_keys` table (Postgres) or one element of the `keys` blob
/// (local store, camelCase field names).
///
/// # Invariants
///
/// - `uses` only grows, and only through a successful validation
/// - `key` is not unique; validation picks the first enabled match
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKey {
    /// Opaque unique identifier
    pub id: Uuid,

    /// Display label chosen by the admin (not unique)
    pub name: String,

    /// The secret token presented by a caller
    pub key: String,

    /// When the key was created
    pub created_at: DateTime<Utc>,

    /// Number of successful validations
    pub uses: i64,

    /// Disabled keys never validate
    pub enabled: bool,
}

impl AccessKey {
    /// Build a fresh record: new id, `created_at = now`, zero uses, enabled.
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            key: key.into(),
            created_at: Utc::now(),
            uses: 0,
            enabled: true,
        }
    }
}

/// Generate a key value: `ak_` followed by 24 characters from `[A-Za-z0-9]`.
///
/// Draws from the thread-local RNG, which is cryptographically secure.
pub fn generate_key_value() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(GENERATED_KEY_LEN)
        .map(char::from)
        .collect();

    format!("{GENERATED_KEY_PREFIX}{suffix}")
}

/// Request body for creating a new access key.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Tester",
///   "key": "my-custom-key"
/// }
/// ```
///
/// # Validation
///
/// - `name`: Required, trimmed, must not be blank
/// - `key`: Optional; absent or blank means "generate one"
#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub name: String,

    #[serde(default)]
    pub key: Option<String>,
}

/// Request body for toggling a key.
///
/// Carries the caller's view of the current state; the new state is its negation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleKeyRequest {
    pub current_enabled: bool,
}
