use std::sync::{Arc, RwLock};

use crate::errors::{AuthError, Result};
use crate::session::Session;

/// Storage interface for the persisted session record.
///
/// One record per store: the SDK assumes at most one active session per
/// configured location. Implementations keep an absent record
/// ([`AuthError::SessionNotFound`]) distinguishable from an unreadable one
/// ([`AuthError::SessionCorrupt`]) so callers know whether to
/// authenticate from scratch or investigate the record.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted session
    async fn load(&self) -> Result<Session>;

    /// Persist `session`, replacing any previous record
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove the persisted session. Removing an absent record is not an
    /// error.
    async fn clear(&self) -> Result<()>;
}

/// In-memory session store for tests and embedded use
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<RwLock<Option<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Session> {
        self.session
            .read()
            .map_err(|_| AuthError::SessionCorrupt {
                reason: "lock poisoned".to_string(),
            })?
            .clone()
            .ok_or(AuthError::SessionNotFound)
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut guard = self.session.write().map_err(|_| AuthError::SessionCorrupt {
            reason: "lock poisoned".to_string(),
        })?;
        *guard = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.session.write().map_err(|_| AuthError::SessionCorrupt {
            reason: "lock poisoned".to_string(),
        })?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn session(access_token: &str) -> Session {
        Session {
            access_token: access_token.to_string(),
            refresh_token: "refresh".to_string(),
            access_token_expires: DateTime::from_timestamp_millis(300_000).unwrap(),
            refresh_token_expires: DateTime::from_timestamp_millis(86_400_000).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_load_before_save_reports_no_session() {
        let store = MemorySessionStore::new();

        assert!(matches!(
            store.load().await,
            Err(AuthError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_save_then_load_returns_the_session() {
        let store = MemorySessionStore::new();
        store.save(&session("a1")).await.unwrap();

        assert_eq!(store.load().await.unwrap(), session("a1"));
    }

    #[tokio::test]
    async fn test_save_replaces_the_previous_record() {
        let store = MemorySessionStore::new();
        store.save(&session("a1")).await.unwrap();
        store.save(&session("a2")).await.unwrap();

        assert_eq!(store.load().await.unwrap().access_token, "a2");
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = MemorySessionStore::new();
        store.save(&session("a1")).await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(matches!(
            store.load().await,
            Err(AuthError::SessionNotFound)
        ));
    }
}
