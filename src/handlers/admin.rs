//! HTTP handlers for the admin panel.
//!
//! Login is public; everything else sits behind the admin session middleware.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AdminContext,
    models::{
        access_key::{AccessKey, CreateKeyRequest, ToggleKeyRequest},
        search_log::SearchLog,
    },
    services::{key_service, log_service},
    session::SessionKind,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
}

/// Counters shown at the top of the admin panel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_keys: usize,
    pub enabled_keys: usize,
    pub total_uses: i64,
    pub log_count: usize,
}

/// Exchange the shared admin password for a session token.
///
/// # Response
///
/// - 200 `{"token": "..."}` on a match
/// - 401 `invalid_credentials` otherwise
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    if request.password != state.admin_password {
        tracing::warn!("rejected admin login");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.sessions.create(SessionKind::Admin).await;
    tracing::info!("admin session opened");
    Ok(Json(AdminLoginResponse { token }))
}

/// End the current admin session. Returns 204.
pub async fn logout(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> StatusCode {
    state.sessions.remove(&admin.token).await;
    StatusCode::NO_CONTENT
}

/// List all access keys.
///
/// A storage failure yields an empty list rather than an error.
pub async fn list_keys(State(state): State<AppState>) -> Json<Vec<AccessKey>> {
    let keys = key_service::list_keys(state.storage.as_ref())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "listing keys failed, returning empty list");
            Vec::new()
        });

    Json(keys)
}

/// Create an access key.
///
/// # Request Body
///
/// ```json
/// { "name": "Tester", "key": "optional-explicit-value" }
/// ```
///
/// # Response
///
/// 201 Created with the full record, including the key value.
pub async fn create_key(
    State(state): State<AppState>,
    Json(request): Json<CreateKeyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key = key_service::create_key(
        state.storage.as_ref(),
        &request.name,
        request.key.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(key)))
}

/// Delete an access key. Unknown ids still return 204.
pub async fn delete_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    key_service::delete_key(state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip a key's enabled flag based on the caller's view of it.
///
/// # Request Body
///
/// ```json
/// { "currentEnabled": true }
/// ```
pub async fn toggle_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ToggleKeyRequest>,
) -> Result<StatusCode, AppError> {
    key_service::toggle_key(state.storage.as_ref(), id, request.current_enabled).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List search logs, newest first. Degrades to an empty list.
pub async fn list_logs(State(state): State<AppState>) -> Json<Vec<SearchLog>> {
    let logs = log_service::list_logs(state.storage.as_ref())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "listing logs failed, returning empty list");
            Vec::new()
        });

    Json(logs)
}

pub async fn stats(State(state): State<AppState>) -> Json<AdminStats> {
    let Json(keys) = list_keys(State(state.clone())).await;
    let Json(logs) = list_logs(State(state)).await;

    Json(AdminStats {
        total_keys: keys.len(),
        enabled_keys: keys.iter().filter(|k| k.enabled).count(),
        total_uses: keys.iter().map(|k| k.uses).sum(),
        log_count: logs.len(),
    })
}
