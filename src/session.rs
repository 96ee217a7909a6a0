//! Server-side session registry.
//!
//! A login hands out an opaque bearer token. Only the SHA-256 hash of the token is
//! kept, mapped to what the session is allowed to do. Admin and portal sessions are
//! independent; logging out of one leaves the other untouched.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::models::access_key::AccessKey;

/// What a session grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKind {
    Admin,
    /// Snapshot of the key taken at login; not refreshed afterwards
    Portal(AccessKey),
}

#[derive(Debug, Clone)]
struct Session {
    kind: SessionKind,
    expires_at: DateTime<Utc>,
}

/// Shared, cloneable registry of live sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

/// Hash a presented token into its registry key.
fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

impl SessionStore {
    /// Sessions expire after `ttl` without use.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Open a session and return its token (64 hex characters).
    pub async fn create(&self, kind: SessionKind) -> String {
        let bytes: [u8; 32] = rand::random();
        let token = hex::encode(bytes);
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token_digest(&token),
            Session {
                kind,
                expires_at: now + self.ttl,
            },
        );

        token
    }

    /// Resolve a token, sliding its expiry forward. Expired tokens are dropped.
    pub async fn get(&self, token: &str) -> Option<SessionKind> {
        let digest = token_digest(token);
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&digest)?;
        if session.expires_at <= now {
            sessions.remove(&digest);
            return None;
        }
        session.expires_at = now + self.ttl;
        Some(session.kind.clone())
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn remove(&self, token: &str) {
        self.sessions.write().await.remove(&token_digest(token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SessionStore::new(Duration::hours(1));

        let token = store.create(SessionKind::Admin).await;
        assert_eq!(token.len(), 64);
        assert_eq!(store.get(&token).await, Some(SessionKind::Admin));

        store.remove(&token).await;
        assert_eq!(store.get(&token).await, None);

        // Second logout is harmless
        store.remove(&token).await;
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let store = SessionStore::new(Duration::zero());

        let token = store.create(SessionKind::Admin).await;
        assert_eq!(store.get(&token).await, None);
    }

    #[tokio::test]
    async fn test_portal_snapshot_is_kept_verbatim() {
        let store = SessionStore::new(Duration::hours(1));
        let key = AccessKey::new("Tester", "ak_snapshot");

        let token = store.create(SessionKind::Portal(key.clone())).await;
        assert_eq!(store.get(&token).await, Some(SessionKind::Portal(key)));
        assert_eq!(store.get("not-a-token").await, None);
    }
}
