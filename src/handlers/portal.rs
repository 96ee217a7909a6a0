//! HTTP handlers for the lookup portal.
//!
//! Login is public; the rest requires a portal session.

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    middleware::auth::PortalContext,
    models::{
        access_key::AccessKey,
        endpoint::{ENDPOINTS, EndpointDescriptor, find_endpoint},
        search_log::LogStatus,
    },
    services::key_service,
    session::SessionKind,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PortalLoginRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct PortalLoginResponse {
    pub token: String,

    /// The matched key, as cached for the session
    pub key: AccessKey,
}

/// Request body for a lookup.
///
/// # JSON Example
///
/// ```json
/// { "endpoint": "/mobile", "query": "9999999999" }
/// ```
#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub endpoint: String,
    pub query: String,
}

/// Exchange an access key for a portal session.
///
/// Counts one use of the key. Unknown, disabled and unreadable keys all return
/// the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<PortalLoginRequest>,
) -> Result<Json<PortalLoginResponse>, AppError> {
    let found = key_service::validate_key(state.storage.as_ref(), request.key.trim())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "key validation failed");
            None
        });

    let Some(key) = found else {
        tracing::warn!("rejected portal login");
        return Err(AppError::InvalidCredentials);
    };

    let token = state.sessions.create(SessionKind::Portal(key.clone())).await;
    tracing::info!(key_id = %key.id, name = %key.name, "portal session opened");
    Ok(Json(PortalLoginResponse { token, key }))
}

/// End the current portal session. Returns 204.
pub async fn logout(
    State(state): State<AppState>,
    Extension(portal): Extension<PortalContext>,
) -> StatusCode {
    state.sessions.remove(&portal.token).await;
    StatusCode::NO_CONTENT
}

/// The key snapshot cached for this session.
pub async fn me(Extension(portal): Extension<PortalContext>) -> Json<AccessKey> {
    Json(portal.key)
}

/// The lookup menu.
pub async fn list_endpoints() -> Json<&'static [EndpointDescriptor]> {
    Json(ENDPOINTS.as_slice())
}

/// Run one lookup against the external API.
///
/// # Response
///
/// - 200 with the upstream JSON, unchanged
/// - 502 with `{"error": "Request failed", "details": "..."}` when the upstream call fails
/// - 400 for an unknown endpoint or a blank query (nothing is logged)
pub async fn lookup(
    State(state): State<AppState>,
    Extension(portal): Extension<PortalContext>,
    Json(request): Json<LookupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let endpoint = find_endpoint(&request.endpoint).ok_or_else(|| {
        AppError::InvalidRequest(format!("Unknown endpoint {}", request.endpoint))
    })?;

    if request.query.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Query must not be empty".to_string(),
        ));
    }

    let outcome = state
        .lookup
        .dispatch(
            state.storage.as_ref(),
            endpoint,
            &request.query,
            &portal.key.name,
        )
        .await;

    let status = match outcome.status {
        LogStatus::Success => StatusCode::OK,
        LogStatus::Error => StatusCode::BAD_GATEWAY,
    };

    Ok((status, Json(outcome.body)))
}
