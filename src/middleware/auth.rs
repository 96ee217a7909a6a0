//! Session authentication middleware.
//!
//! Both middlewares:
//! 1. Extract the session token from the Authorization header
//! 2. Resolve it in the [`SessionStore`](crate::session::SessionStore)
//! 3. Inject the matching context into the request
//! 4. Reject everything else with HTTP 401
//!
//! A portal token never opens admin routes and vice versa.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    models::access_key::AccessKey,
    services::key_service,
    session::SessionKind,
    state::AppState,
};

/// Context attached to requests carrying a valid admin session.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// Presented token, kept so logout can revoke it
    pub token: String,
}

/// Context attached to requests carrying a valid portal session.
#[derive(Debug, Clone)]
pub struct PortalContext {
    pub token: String,

    /// Key snapshot taken at login
    pub key: AccessKey,
}

/// Extract `<token>` from `Authorization: Bearer <token>`.
fn bearer_token(request: &Request) -> Result<String, AppError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// Admin session middleware.
///
/// Injects [`AdminContext`] on success.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;

    match state.sessions.get(&token).await {
        Some(SessionKind::Admin) => {}
        _ => return Err(AppError::Unauthorized),
    }

    request.extensions_mut().insert(AdminContext { token });
    Ok(next.run(request).await)
}

/// Portal session middleware.
///
/// Injects [`PortalContext`] on success. With session revalidation turned on, a key
/// that was deleted or disabled since login ends the session here.
pub async fn portal_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;

    let key = match state.sessions.get(&token).await {
        Some(SessionKind::Portal(key)) => key,
        _ => return Err(AppError::Unauthorized),
    };

    if state.revalidate_portal_sessions {
        let active = key_service::is_key_active(state.storage.as_ref(), key.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(key_id = %key.id, error = %e, "could not revalidate portal session");
                false
            });
        if !active {
            state.sessions.remove(&token).await;
            return Err(AppError::Unauthorized);
        }
    }

    request.extensions_mut().insert(PortalContext { token, key });
    Ok(next.run(request).await)
}
