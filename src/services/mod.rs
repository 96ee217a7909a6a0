//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They talk to the configured [`crate::storage::Storage`] backend and the
//! external lookup API.

pub mod key_service;
pub mod log_service;
pub mod lookup_service;
