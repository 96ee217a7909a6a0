//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, session context)
//! 2. Calls into the services
//! 3. Returns HTTP response (JSON, status code)

/// Key management, log review and admin login
pub mod admin;
/// Liveness probe
pub mod health;
/// Portal login and lookups
pub mod portal;
