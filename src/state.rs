//! Shared application state handed to every handler via axum `State`.

use crate::{services::lookup_service::LookupClient, session::SessionStore, storage::DynStorage};

#[derive(Clone)]
pub struct AppState {
    /// Configured persistence backend
    pub storage: DynStorage,

    pub sessions: SessionStore,

    pub lookup: LookupClient,

    /// Fixed shared admin secret
    pub admin_password: String,

    /// Re-check the cached key on every portal request
    pub revalidate_portal_sessions: bool,
}
