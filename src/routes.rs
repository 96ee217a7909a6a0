//! HTTP router assembly.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware, state::AppState};

/// Build the full router: public login routes, admin routes and portal routes.
pub fn router(state: AppState) -> Router {
    // Admin routes (key management, logs)
    let admin_routes = Router::new()
        .route("/api/v1/admin/logout", post(handlers::admin::logout))
        .route("/api/v1/admin/keys", get(handlers::admin::list_keys))
        .route("/api/v1/admin/keys", post(handlers::admin::create_key))
        .route("/api/v1/admin/keys/{id}", delete(handlers::admin::delete_key))
        .route(
            "/api/v1/admin/keys/{id}/toggle",
            post(handlers::admin::toggle_key),
        )
        .route("/api/v1/admin/logs", get(handlers::admin::list_logs))
        .route("/api/v1/admin/stats", get(handlers::admin::stats))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_middleware,
        ));

    // Portal routes (lookups)
    let portal_routes = Router::new()
        .route("/api/v1/portal/logout", post(handlers::portal::logout))
        .route("/api/v1/portal/me", get(handlers::portal::me))
        .route(
            "/api/v1/portal/endpoints",
            get(handlers::portal::list_endpoints),
        )
        .route("/api/v1/portal/lookup", post(handlers::portal::lookup))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::portal_middleware,
        ));

    Router::new()
        // Public routes (no session required)
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/admin/login", post(handlers::admin::login))
        .route("/api/v1/portal/login", post(handlers::portal::login))
        .merge(admin_routes)
        .merge(portal_routes)
        // Callers are browser pages on another origin; credentials travel in a header
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
