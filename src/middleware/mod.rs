//! HTTP middleware components.
//!
//! Middleware run before route handlers and short-circuit requests that
//! lack a valid session.

/// Admin and portal session middleware
pub mod auth;
