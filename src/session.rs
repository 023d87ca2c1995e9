//! Session state and credential persistence.
//!
//! [`SessionStore`] owns the authenticated session (token + user record)
//! for one [`LibraryClient`](crate::LibraryClient). The HTTP adapter reads
//! it to stamp outgoing requests; auth mutations write it. A
//! [`CredentialStore`] persists the session across process restarts (the
//! browser-local-storage analog) with file-backed and in-memory
//! implementations.
//!
//! Profile edits broadcast [`SessionEvent::ProfileUpdated`] so any
//! interested consumer (e.g. a navigation header) can refresh its display
//! without a network call.

use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::types::User;
use crate::{BiblionError, Result};

/// An authenticated session: the bearer token and the account it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Events broadcast by the session store.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Emitted after a successful login or registration.
    SignedIn(User),
    /// Emitted after a successful profile edit.
    ProfileUpdated(User),
    /// Emitted on logout.
    SignedOut,
}

/// Process-wide owner of the current session.
///
/// Interior mutability via `RwLock`: reads vastly outnumber writes
/// (every request reads the token; only auth flows write).
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub(crate) fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            current: RwLock::new(None),
            events,
        }
    }

    /// The current bearer token, if signed in.
    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// The signed-in user record, if any.
    pub fn user(&self) -> Option<User> {
        self.current
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.user.clone())
    }

    /// Whether a session is active.
    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .expect("session lock poisoned")
            .is_some()
    }

    /// Subscribe to session events as a stream.
    pub fn subscribe(&self) -> BroadcastStream<SessionEvent> {
        BroadcastStream::new(self.events.subscribe())
    }

    pub(crate) fn set(&self, session: Session) {
        let user = session.user.clone();
        *self.current.write().expect("session lock poisoned") = Some(session);
        let _ = self.events.send(SessionEvent::SignedIn(user));
    }

    /// Restore a persisted session without emitting `SignedIn`.
    pub(crate) fn restore(&self, session: Session) {
        *self.current.write().expect("session lock poisoned") = Some(session);
    }

    /// Replace the cached user record after a profile edit and broadcast
    /// `ProfileUpdated`.
    pub(crate) fn update_user(&self, user: User) {
        if let Some(session) = self
            .current
            .write()
            .expect("session lock poisoned")
            .as_mut()
        {
            session.user = user.clone();
        }
        let _ = self.events.send(SessionEvent::ProfileUpdated(user));
    }

    pub(crate) fn clear(&self) {
        *self.current.write().expect("session lock poisoned") = None;
        let _ = self.events.send(SessionEvent::SignedOut);
    }
}

/// Durable storage for the session, read at startup and cleared on logout.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the persisted session, if one exists.
    async fn load(&self) -> Result<Option<Session>>;
    /// Persist the session.
    async fn save(&self, session: &Session) -> Result<()>;
    /// Remove any persisted session.
    async fn clear(&self) -> Result<()>;
}

/// In-memory credential store. Nothing survives the process; the default
/// when no store is configured.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<Session>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.inner.read().expect("store lock poisoned").clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.inner.write().expect("store lock poisoned") = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.write().expect("store lock poisoned") = None;
        Ok(())
    }
}

/// File-backed credential store: one JSON document at a fixed path.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Session>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let session = serde_json::from_slice(&bytes)?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BiblionError::CredentialStore(e.to_string())),
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let bytes = serde_json::to_vec(session)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| BiblionError::CredentialStore(e.to_string()))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BiblionError::CredentialStore(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn store_starts_empty() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn set_and_clear_round_trip() {
        let store = SessionStore::new();
        store.set(Session {
            token: "tok".to_string(),
            user: test_user(),
        });
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok"));

        store.clear();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn profile_update_broadcasts() {
        let store = SessionStore::new();
        store.set(Session {
            token: "tok".to_string(),
            user: test_user(),
        });

        let mut rx = store.events.subscribe();
        let mut updated = test_user();
        updated.name = "Ada Lovelace".to_string();
        store.update_user(updated);

        // Skip nothing: subscription began after SignedIn.
        let event = rx.recv().await.expect("event");
        match event {
            SessionEvent::ProfileUpdated(user) => assert_eq!(user.name, "Ada Lovelace"),
            other => panic!("expected ProfileUpdated, got {:?}", other),
        }
        assert_eq!(store.user().expect("user").name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().await.expect("load").is_none());

        let session = Session {
            token: "tok".to_string(),
            user: test_user(),
        };
        store.save(&session).await.expect("save");
        let loaded = store.load().await.expect("load").expect("session");
        assert_eq!(loaded.token, "tok");

        store.clear().await.expect("clear");
        assert!(store.load().await.expect("load").is_none());
    }
}
