//! High-level client: the application's single context object.
//!
//! [`LibraryClient`] owns the session store, the query cache, and the
//! mutation coordinator, and binds every resource gateway to its cache
//! key and freshness window. Construct one per application root via
//! [`Biblion::builder()`] and pass it by reference to consumers; there
//! is no ambient module state.

mod admin;
mod mutations;
mod queries;

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::wrappers::BroadcastStream;

use crate::cache::mutation::Coordinator;
use crate::cache::{Notice, QueryCache};
use crate::session::{CredentialStore, MemoryCredentialStore, SessionStore};
use crate::transport::ApiClient;
use crate::{BiblionError, Result};

pub use admin::{BookWithStatus, EnrichedLoan};

/// Freshness windows per cache namespace.
///
/// Defaults mirror how often each resource actually changes: catalog
/// data is calm (5 minutes), recommendations are calmer (10), loans
/// move fast (2), and reviews are always re-fetched.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub books: Duration,
    pub book_detail: Duration,
    pub recommended: Duration,
    pub reviews: Duration,
    pub profile: Duration,
    pub my_loans: Duration,
    pub my_reviews: Duration,
    pub admin: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            books: Duration::from_secs(5 * 60),
            book_detail: Duration::from_secs(5 * 60),
            recommended: Duration::from_secs(10 * 60),
            reviews: Duration::ZERO,
            profile: Duration::from_secs(5 * 60),
            my_loans: Duration::from_secs(2 * 60),
            my_reviews: Duration::from_secs(5 * 60),
            admin: Duration::from_secs(5 * 60),
        }
    }
}

/// Main entry point for creating client instances.
pub struct Biblion;

impl Biblion {
    /// Create a new builder for configuring the client.
    pub fn builder() -> BiblionBuilder {
        BiblionBuilder::new()
    }
}

/// Builder for configuring [`LibraryClient`] instances.
pub struct BiblionBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    policy: CachePolicy,
    credentials: Option<Arc<dyn CredentialStore>>,
}

impl BiblionBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            policy: CachePolicy::default(),
            credentials: None,
        }
    }

    /// Base URL of the remote API (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Request timeout for the underlying HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the default freshness windows.
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Durable session storage. Defaults to an in-memory store.
    pub fn credential_store(mut self, store: impl CredentialStore + 'static) -> Self {
        self.credentials = Some(Arc::new(store));
        self
    }

    pub fn build(self) -> Result<LibraryClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| BiblionError::Configuration("base_url is required".to_string()))?;

        let session = Arc::new(SessionStore::new());
        let api = ApiClient::new(base_url, self.timeout, Arc::clone(&session))?;
        let cache = QueryCache::new();
        let coordinator = Coordinator::new(cache.clone());

        Ok(LibraryClient {
            api,
            cache,
            session,
            credentials: self
                .credentials
                .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
            coordinator,
            policy: self.policy,
        })
    }
}

impl Default for BiblionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The client context: gateways bound to cache keys, freshness windows,
/// and the mutation coordinator.
pub struct LibraryClient {
    pub(crate) api: ApiClient,
    pub(crate) cache: QueryCache,
    pub(crate) session: Arc<SessionStore>,
    pub(crate) credentials: Arc<dyn CredentialStore>,
    pub(crate) coordinator: Coordinator,
    pub(crate) policy: CachePolicy,
}

impl LibraryClient {
    /// The session store (token, user record, session events).
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Direct access to the query cache, e.g. for `peek` degradation
    /// after a failed read.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// The active freshness windows.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Subscribe to user-facing notices emitted by mutations.
    pub fn subscribe_notices(&self) -> BroadcastStream<Notice> {
        self.coordinator.subscribe()
    }

    /// Restore a persisted session from the credential store, if one
    /// exists. Returns whether a session was restored.
    pub async fn restore_session(&self) -> Result<bool> {
        match self.credentials.load().await? {
            Some(session) => {
                self.session.restore(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
