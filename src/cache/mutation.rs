//! Mutation coordinator: optimistic updates with exact rollback.
//!
//! Every state-changing operation runs through a [`MutationGuard`] with
//! the lifecycle `Idle -> Pending -> {Succeeded, Failed}`:
//!
//! 1. `begin` acquires per-key locks for the affected keys (a second
//!    mutation touching the same key waits for the first to settle) and
//!    detaches any in-flight reads for them, so a slow pre-mutation
//!    fetch cannot overwrite the optimistic value after it lands.
//! 2. `stage` snapshots the exact prior entry into an optimistic patch,
//!    then applies the speculative value.
//! 3. `commit` discards the patches, invalidates the declared dependent
//!    keys, and broadcasts a success [`Notice`]; `fail` restores every
//!    snapshot (a restoration, never a recomputation) and broadcasts an
//!    error notice derived from the server message when there is one.
//!
//! A guard dropped while still Pending rolls back, so a panic between
//! stage and settle cannot leave speculative values behind.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use super::{QueryCache, QueryKey, Snapshot};
use crate::BiblionError;
use crate::telemetry;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-facing notification emitted by the coordinator.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Lifecycle of one mutation invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Owner of per-key mutation locks and the notice channel.
pub(crate) struct Coordinator {
    cache: QueryCache,
    notices: broadcast::Sender<Notice>,
    locks: DashMap<QueryKey, Arc<Mutex<()>>>,
}

impl Coordinator {
    pub(crate) fn new(cache: QueryCache) -> Self {
        let (notices, _) = broadcast::channel(32);
        Self {
            cache,
            notices,
            locks: DashMap::new(),
        }
    }

    pub(crate) fn subscribe(&self) -> BroadcastStream<Notice> {
        BroadcastStream::new(self.notices.subscribe())
    }

    pub(crate) fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let _ = self.notices.send(Notice {
            kind,
            message: message.into(),
        });
    }

    /// Enter Pending: serialize against other mutations on the affected
    /// keys, then detach their in-flight reads.
    pub(crate) async fn begin(
        &self,
        operation: &'static str,
        affected: &[QueryKey],
    ) -> MutationGuard<'_> {
        let mut keys: Vec<QueryKey> = affected.to_vec();
        keys.sort();
        keys.dedup();

        // Lock in sorted order so two mutations over overlapping key sets
        // cannot deadlock.
        let mut locks = Vec::with_capacity(keys.len());
        for key in &keys {
            let lock = Arc::clone(
                self.locks
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .value(),
            );
            locks.push(lock.lock_owned().await);
        }

        for key in &keys {
            self.cache.supersede(key);
        }

        debug!(operation, keys = keys.len(), "mutation pending");

        MutationGuard {
            coordinator: self,
            operation,
            patches: Vec::new(),
            _locks: locks,
            state: MutationState::Pending,
        }
    }
}

/// One mutation invocation, from Pending to settlement.
pub struct MutationGuard<'a> {
    coordinator: &'a Coordinator,
    operation: &'static str,
    patches: Vec<Snapshot>,
    _locks: Vec<OwnedMutexGuard<()>>,
    state: MutationState,
}

impl MutationGuard<'_> {
    pub fn state(&self) -> MutationState {
        self.state
    }

    /// Snapshot the key's exact prior state, then apply a speculative
    /// update. At most one patch is held per key: staging a key twice
    /// composes onto the first snapshot rather than overwriting it.
    pub fn stage<T>(&mut self, key: &QueryKey, updater: impl FnOnce(Option<&T>) -> Option<T>)
    where
        T: Send + Sync + 'static,
    {
        if !self.patches.iter().any(|p| p.key == *key) {
            self.patches.push(self.coordinator.cache.snapshot(key));
        }
        self.coordinator.cache.write(key, updater);
    }

    /// Settle as Succeeded: drop the patches, mark every declared
    /// dependent key stale, and broadcast a success notice.
    pub fn commit(mut self, invalidate: &[QueryKey], success_message: &str) {
        self.patches.clear();
        for prefix in invalidate {
            self.coordinator.cache.invalidate(prefix);
        }
        metrics::counter!(telemetry::MUTATIONS_TOTAL,
            "operation" => self.operation, "status" => "ok")
        .increment(1);
        self.coordinator.notify(NoticeKind::Success, success_message);
        self.state = MutationState::Succeeded;
    }

    /// Settle as Failed: restore every snapshot and broadcast an error
    /// notice. Dependent keys are not invalidated: nothing changed on
    /// the server.
    pub fn fail(mut self, error: &BiblionError) {
        self.rollback();
        metrics::counter!(telemetry::MUTATIONS_TOTAL,
            "operation" => self.operation, "status" => "error")
        .increment(1);
        let fallback = format!("Failed to {}", self.operation);
        self.coordinator
            .notify(NoticeKind::Error, error.user_message(&fallback));
        self.state = MutationState::Failed;
    }

    fn rollback(&mut self) {
        for snapshot in self.patches.drain(..).rev() {
            metrics::counter!(telemetry::ROLLBACKS_TOTAL, "operation" => self.operation)
                .increment(1);
            self.coordinator.cache.restore(snapshot);
        }
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        if self.state == MutationState::Pending && !self.patches.is_empty() {
            warn!(
                operation = self.operation,
                "mutation dropped while pending, rolling back"
            );
            self.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys;

    #[tokio::test]
    async fn commit_discards_patch_and_invalidates() {
        let cache = QueryCache::new();
        let coordinator = Coordinator::new(cache.clone());
        cache.write::<u32>(&keys::book(1), |_| Some(3));
        cache.write::<u32>(&keys::books_list(), |_| Some(9));

        let mut guard = coordinator.begin("borrow book", &[keys::book(1)]).await;
        assert_eq!(guard.state(), MutationState::Pending);
        guard.stage::<u32>(&keys::book(1), |old| old.map(|v| v - 1));
        assert_eq!(cache.peek::<u32>(&keys::book(1)).as_deref(), Some(&2));

        guard.commit(&[keys::books()], "done");

        // Optimistic value survives; dependent prefix is stale.
        assert_eq!(cache.peek::<u32>(&keys::book(1)).as_deref(), Some(&2));
        assert_eq!(
            cache.status(&keys::books_list(), std::time::Duration::from_secs(60)),
            Some(crate::cache::EntryStatus::Stale)
        );
    }

    #[tokio::test]
    async fn fail_restores_exact_prior_value() {
        let cache = QueryCache::new();
        let coordinator = Coordinator::new(cache.clone());
        cache.write::<u32>(&keys::book(1), |_| Some(3));

        let mut guard = coordinator.begin("borrow book", &[keys::book(1)]).await;
        guard.stage::<u32>(&keys::book(1), |old| old.map(|v| v - 1));
        assert_eq!(cache.peek::<u32>(&keys::book(1)).as_deref(), Some(&2));

        guard.fail(&BiblionError::Network("boom".into()));

        assert_eq!(cache.peek::<u32>(&keys::book(1)).as_deref(), Some(&3));
    }

    #[tokio::test]
    async fn fail_notice_prefers_server_message() {
        let cache = QueryCache::new();
        let coordinator = Coordinator::new(cache.clone());
        let mut notices = coordinator.notices.subscribe();

        let guard = coordinator.begin("borrow book", &[]).await;
        guard.fail(&BiblionError::Api {
            status: 409,
            message: "No copies available".into(),
        });

        let notice = notices.try_recv().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "No copies available");
    }

    #[tokio::test]
    async fn fail_notice_falls_back_to_operation_phrase() {
        let cache = QueryCache::new();
        let coordinator = Coordinator::new(cache.clone());
        let mut notices = coordinator.notices.subscribe();

        let guard = coordinator.begin("borrow book", &[]).await;
        guard.fail(&BiblionError::Network("socket closed".into()));

        let notice = notices.try_recv().expect("notice");
        assert_eq!(notice.message, "Failed to borrow book");
    }

    #[tokio::test]
    async fn dropped_pending_guard_rolls_back() {
        let cache = QueryCache::new();
        let coordinator = Coordinator::new(cache.clone());
        cache.write::<u32>(&keys::book(1), |_| Some(3));

        {
            let mut guard = coordinator.begin("borrow book", &[keys::book(1)]).await;
            guard.stage::<u32>(&keys::book(1), |old| old.map(|v| v - 1));
            // Dropped without settling.
        }

        assert_eq!(cache.peek::<u32>(&keys::book(1)).as_deref(), Some(&3));
    }

    #[tokio::test]
    async fn staging_twice_keeps_first_snapshot() {
        let cache = QueryCache::new();
        let coordinator = Coordinator::new(cache.clone());
        cache.write::<u32>(&keys::book(1), |_| Some(5));

        let mut guard = coordinator.begin("borrow book", &[keys::book(1)]).await;
        guard.stage::<u32>(&keys::book(1), |old| old.map(|v| v - 1));
        guard.stage::<u32>(&keys::book(1), |old| old.map(|v| v - 1));
        assert_eq!(cache.peek::<u32>(&keys::book(1)).as_deref(), Some(&3));

        guard.fail(&BiblionError::Network("boom".into()));

        // Rolls back to the value before the first stage, not the second.
        assert_eq!(cache.peek::<u32>(&keys::book(1)).as_deref(), Some(&5));
    }

    #[tokio::test]
    async fn competing_mutation_waits_for_first() {
        let cache = QueryCache::new();
        let coordinator = Arc::new(Coordinator::new(cache.clone()));
        cache.write::<u32>(&keys::book(1), |_| Some(3));

        let guard = coordinator.begin("borrow book", &[keys::book(1)]).await;

        let second = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                let mut g = coordinator.begin("borrow book", &[keys::book(1)]).await;
                g.stage::<u32>(&keys::book(1), |old| old.map(|v| v - 1));
                g.commit(&[], "done");
            })
        };

        // The second mutation cannot take its snapshot while the first
        // holds the key.
        tokio::task::yield_now().await;
        assert!(!second.is_finished());

        guard.commit(&[], "done");
        second.await.expect("second mutation");
        assert_eq!(cache.peek::<u32>(&keys::book(1)).as_deref(), Some(&2));
    }
}
