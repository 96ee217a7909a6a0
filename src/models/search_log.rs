//! Search log model.
//!
//! One entry is written for every dispatched lookup, successful or not. Entries are
//! never edited or removed individually; the collection is capped at [`LOG_CAP`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of log entries retained, newest first.
pub const LOG_CAP: usize = 500;

/// Outcome of a lookup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Error => "error",
        }
    }

    /// Parse the textual form stored in the `search_logs.status` column.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(LogStatus::Success),
            "error" => Some(LogStatus::Error),
            _ => None,
        }
    }
}

/// Represents a search log record.
///
/// `key_name` is a copy of the querying key's name at the time of the lookup,
/// not a reference; renaming or deleting the key leaves old entries unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLog {
    pub id: Uuid,
    pub key_name: String,
    pub endpoint: String,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub status: LogStatus,
}

/// Fields supplied by the caller when appending a log entry.
///
/// `id` and `timestamp` are assigned by [`NewSearchLog::into_log`].
#[derive(Debug, Clone)]
pub struct NewSearchLog {
    pub key_name: String,
    pub endpoint: String,
    pub query: String,
    pub status: LogStatus,
}

impl NewSearchLog {
    pub fn into_log(self) -> SearchLog {
        SearchLog {
            id: Uuid::new_v4(),
            key_name: self.key_name,
            endpoint: self.endpoint,
            query: self.query,
            timestamp: Utc::now(),
            status: self.status,
        }
    }
}
