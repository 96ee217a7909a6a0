//! Data models shared by the storage backends and the HTTP layer.

/// Access key model and key generation
pub mod access_key;
/// Lookup endpoint catalog
pub mod endpoint;
/// Search log model
pub mod search_log;
