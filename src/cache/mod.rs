//! Query cache: keyed store with freshness windows, hierarchical
//! invalidation, and de-duplication of in-flight fetches.
//!
//! # Architecture
//!
//! Entries are keyed by [`QueryKey`] and hold type-erased payloads
//! (`Arc<dyn Any>`); typed access goes through `read`/`peek`/`write`
//! with downcasting. Staleness is explicit: entries carry their fetch
//! timestamp and a stale flag, and [`QueryCache::invalidate`] marks a
//! whole key prefix stale without deleting data; the next read
//! re-fetches.
//!
//! De-duplication uses an explicit map from key to a shared pending
//! fetch ([`futures_util::future::Shared`]): concurrent readers of the
//! same key attach to one handle, resolved exactly once. A completing
//! fetch writes back only if the key's epoch is unchanged; mutations
//! bump epochs for their affected keys (see
//! [`mutation`](crate::cache::mutation)) so a slow pre-mutation fetch
//! cannot clobber an optimistic value after it lands.
//!
//! The cache never issues network calls itself; fetchers are passed in
//! by the caller, so gateways stay the only seam to the network.

pub mod key;
pub mod mutation;

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::{debug, warn};

use crate::telemetry;
use crate::{BiblionError, Result};

pub use key::{QueryKey, keys};
pub use mutation::{MutationGuard, MutationState, Notice, NoticeKind};

/// Lifecycle status of a cache entry, derived at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Value is inside its freshness window.
    Fresh,
    /// Value exists but the next read will re-fetch.
    Stale,
    /// A fetch for this key is in flight.
    Fetching,
    /// The last fetch failed; the previous value (if any) is retained.
    Error,
}

/// Options for [`QueryCache::read_if`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// How long a stored value counts as fresh. Zero means every read
    /// re-fetches (de-duplication still applies).
    pub freshness_window: Duration,
    /// When false, the read never fetches: it returns whatever is
    /// cached, or `None`.
    pub enabled: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            freshness_window: Duration::ZERO,
            enabled: true,
        }
    }
}

/// A stored entry: type-erased value plus freshness bookkeeping.
#[derive(Clone)]
pub(crate) struct Stored {
    pub(crate) value: Arc<dyn Any + Send + Sync>,
    pub(crate) fetched_at: Instant,
    pub(crate) stale: bool,
    pub(crate) last_error: Option<Arc<BiblionError>>,
}

impl Stored {
    fn fresh(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            stale: false,
            last_error: None,
        }
    }
}

/// Exact prior state of one key, taken before an optimistic write.
///
/// Restoring puts back the stored entry byte-for-byte (including its
/// timestamp and staleness), or removes the entry if none existed.
/// Rollback is a restoration, never a recomputation.
pub struct Snapshot {
    pub(crate) key: QueryKey,
    pub(crate) prior: Option<Stored>,
}

type FetchResult = std::result::Result<Arc<dyn Any + Send + Sync>, Arc<BiblionError>>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct InFlight {
    epoch: u64,
    fut: SharedFetch,
}

pub(crate) struct CacheInner {
    entries: DashMap<QueryKey, Stored>,
    in_flight: DashMap<QueryKey, InFlight>,
    epochs: DashMap<QueryKey, u64>,
}

impl CacheInner {
    fn current_epoch(&self, key: &QueryKey) -> u64 {
        self.epochs.get(key).map(|e| *e).unwrap_or(0)
    }

    fn bump_epoch(&self, key: &QueryKey) {
        *self.epochs.entry(key.clone()).or_insert(0) += 1;
    }

    /// Settle a fetch: drop the in-flight handle and store the outcome,
    /// unless a mutation superseded this fetch in the meantime.
    fn complete(&self, key: &QueryKey, epoch: u64, result: FetchResult) {
        self.in_flight.remove_if(key, |_, f| f.epoch == epoch);

        if self.current_epoch(key) != epoch {
            debug!(key = %key, "fetch superseded, discarding result");
            return;
        }

        match result {
            Ok(value) => {
                self.entries.insert(key.clone(), Stored::fresh(value));
            }
            Err(e) => {
                // Keep the previous value; record the failure.
                if let Some(mut stored) = self.entries.get_mut(key) {
                    stored.last_error = Some(e);
                }
            }
        }
    }
}

/// Process-wide query cache. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                in_flight: DashMap::new(),
                epochs: DashMap::new(),
            }),
        }
    }

    /// Read a key, fetching when absent or stale.
    ///
    /// Fresh entries are returned without touching the network. A stale
    /// or absent entry triggers `fetcher`, unless a fetch for this key
    /// is already in flight, in which case this read attaches to it and
    /// observes the same result. On fetch failure any previous value is
    /// retained and the error is surfaced.
    pub async fn read<T, F, Fut>(
        &self,
        key: &QueryKey,
        freshness_window: Duration,
        fetcher: F,
    ) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let namespace = key.namespace().to_string();

        if let Some(stored) = self.inner.entries.get(key) {
            if !stored.stale && stored.fetched_at.elapsed() < freshness_window {
                match Arc::clone(&stored.value).downcast::<T>() {
                    Ok(value) => {
                        metrics::counter!(telemetry::CACHE_HITS_TOTAL, "namespace" => namespace)
                            .increment(1);
                        return Ok(value);
                    }
                    Err(_) => {
                        // Two call sites disagree on the payload type for
                        // this key; refetch rather than serve the wrong one.
                        warn!(key = %key, "cached value has unexpected type, refetching");
                    }
                }
            }
        }

        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "namespace" => namespace.clone())
            .increment(1);

        let (fut, joined) = match self.inner.in_flight.entry(key.clone()) {
            Entry::Occupied(e) => (e.get().fut.clone(), true),
            Entry::Vacant(e) => {
                let epoch = self.inner.current_epoch(key);
                let inner = Arc::clone(&self.inner);
                let key_owned = key.clone();
                let fetch = fetcher();
                let fut: SharedFetch = async move {
                    match fetch.await {
                        Ok(value) => {
                            let value: Arc<dyn Any + Send + Sync> = Arc::new(value);
                            inner.complete(&key_owned, epoch, Ok(Arc::clone(&value)));
                            Ok(value)
                        }
                        Err(err) => {
                            let err = Arc::new(err);
                            inner.complete(&key_owned, epoch, Err(Arc::clone(&err)));
                            Err(err)
                        }
                    }
                }
                .boxed()
                .shared();
                e.insert(InFlight {
                    epoch,
                    fut: fut.clone(),
                });
                (fut, false)
            }
        };

        if joined {
            metrics::counter!(telemetry::CACHE_JOINS_TOTAL, "namespace" => namespace)
                .increment(1);
        }

        match fut.await {
            Ok(value) => value.downcast::<T>().map_err(|_| {
                BiblionError::Decode(format!("cache entry for {key} has unexpected type"))
            }),
            Err(e) => Err(e.duplicate()),
        }
    }

    /// [`read`](Self::read) with an enabled switch: a disabled read never
    /// fetches and returns whatever is cached, if anything.
    pub async fn read_if<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: ReadOptions,
        fetcher: F,
    ) -> Result<Option<Arc<T>>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if !options.enabled {
            return Ok(self.peek(key));
        }
        self.read(key, options.freshness_window, fetcher)
            .await
            .map(Some)
    }

    /// Last-known value for a key, regardless of freshness. Never fetches.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.inner
            .entries
            .get(key)
            .and_then(|stored| Arc::clone(&stored.value).downcast::<T>().ok())
    }

    /// Apply a pure update over the cached value (or its absence) and
    /// store the result immediately, without a network round trip.
    ///
    /// Returning `None` from the updater leaves the entry untouched.
    pub fn write<T>(&self, key: &QueryKey, updater: impl FnOnce(Option<&T>) -> Option<T>)
    where
        T: Send + Sync + 'static,
    {
        match self.inner.entries.entry(key.clone()) {
            Entry::Occupied(mut e) => {
                let updated = updater(e.get().value.downcast_ref::<T>());
                if let Some(value) = updated {
                    *e.get_mut() = Stored::fresh(Arc::new(value));
                }
            }
            Entry::Vacant(e) => {
                if let Some(value) = updater(None) {
                    e.insert(Stored::fresh(Arc::new(value)));
                }
            }
        }
    }

    /// Mark every entry under `prefix` stale. Data is kept; the next
    /// read for each key re-fetches. Idempotent.
    pub fn invalidate(&self, prefix: &QueryKey) {
        let mut marked = 0usize;
        for mut entry in self.inner.entries.iter_mut() {
            if entry.key().starts_with(prefix) {
                entry.stale = true;
                marked += 1;
            }
        }
        debug!(prefix = %prefix, marked, "invalidated cache prefix");
    }

    /// Mark everything stale.
    pub fn invalidate_all(&self) {
        self.invalidate(&QueryKey::root());
    }

    /// Drop every entry and detach all in-flight fetches. Called on
    /// logout: a fetch that settles afterwards must not repopulate the
    /// cache with pre-logout data.
    pub fn clear(&self) {
        let pending: Vec<QueryKey> = self
            .inner
            .in_flight
            .iter()
            .map(|e| e.key().clone())
            .collect();
        for key in pending {
            self.inner.bump_epoch(&key);
            self.inner.in_flight.remove(&key);
        }
        self.inner.entries.clear();
        debug!("cache cleared");
    }

    /// Detach in-flight fetches for every key under `prefix` so their
    /// results are discarded when they settle. Used by the mutation
    /// coordinator before applying optimistic writes.
    pub(crate) fn supersede(&self, prefix: &QueryKey) {
        let pending: Vec<QueryKey> = self
            .inner
            .in_flight
            .iter()
            .map(|e| e.key().clone())
            .filter(|k| k.starts_with(prefix))
            .collect();
        for key in pending {
            self.inner.bump_epoch(&key);
            self.inner.in_flight.remove(&key);
            debug!(key = %key, "superseded in-flight fetch");
        }
    }

    /// Capture the exact stored state of a key (including absence).
    pub fn snapshot(&self, key: &QueryKey) -> Snapshot {
        Snapshot {
            key: key.clone(),
            prior: self.inner.entries.get(key).map(|e| e.value().clone()),
        }
    }

    /// Put a snapshot back, byte-for-byte.
    pub fn restore(&self, snapshot: Snapshot) {
        match snapshot.prior {
            Some(stored) => {
                self.inner.entries.insert(snapshot.key, stored);
            }
            None => {
                self.inner.entries.remove(&snapshot.key);
            }
        }
    }

    /// Derived status of a key under the given freshness window.
    pub fn status(&self, key: &QueryKey, freshness_window: Duration) -> Option<EntryStatus> {
        if self.inner.in_flight.contains_key(key) {
            return Some(EntryStatus::Fetching);
        }
        self.inner.entries.get(key).map(|stored| {
            if stored.last_error.is_some() {
                EntryStatus::Error
            } else if stored.stale || stored.fetched_at.elapsed() >= freshness_window {
                EntryStatus::Stale
            } else {
                EntryStatus::Fresh
            }
        })
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn write_and_peek_round_trip() {
        let cache = QueryCache::new();
        let key = keys::book(1);

        assert!(cache.peek::<u32>(&key).is_none());
        cache.write::<u32>(&key, |_| Some(7));
        assert_eq!(cache.peek::<u32>(&key).as_deref(), Some(&7));

        // Updater sees the current value.
        cache.write::<u32>(&key, |old| old.map(|v| v + 1));
        assert_eq!(cache.peek::<u32>(&key).as_deref(), Some(&8));
    }

    #[test]
    fn write_none_leaves_entry_untouched() {
        let cache = QueryCache::new();
        let key = keys::book(1);

        cache.write::<u32>(&key, |_| None);
        assert!(cache.peek::<u32>(&key).is_none());

        cache.write::<u32>(&key, |_| Some(3));
        cache.write::<u32>(&key, |_| None);
        assert_eq!(cache.peek::<u32>(&key).as_deref(), Some(&3));
    }

    #[test]
    fn invalidate_marks_prefix_stale() {
        let cache = QueryCache::new();
        cache.write::<u32>(&keys::books_all(Some("x")), |_| Some(1));
        cache.write::<u32>(&keys::book(1), |_| Some(2));

        cache.invalidate(&keys::books());

        assert_eq!(
            cache.status(&keys::books_all(Some("x")), MINUTE),
            Some(EntryStatus::Stale)
        );
        // Different namespace, untouched.
        assert_eq!(cache.status(&keys::book(1), MINUTE), Some(EntryStatus::Fresh));
        // Data is kept, not deleted.
        assert_eq!(
            cache.peek::<u32>(&keys::books_all(Some("x"))).as_deref(),
            Some(&1)
        );
    }

    #[test]
    fn invalidate_is_idempotent() {
        let cache = QueryCache::new();
        cache.write::<u32>(&keys::books_list(), |_| Some(1));

        cache.invalidate(&keys::books());
        cache.invalidate(&keys::books());

        assert_eq!(
            cache.status(&keys::books_list(), MINUTE),
            Some(EntryStatus::Stale)
        );
    }

    #[test]
    fn snapshot_restores_exact_value() {
        let cache = QueryCache::new();
        let key = keys::book(9);
        cache.write::<u32>(&key, |_| Some(3));

        let snapshot = cache.snapshot(&key);
        cache.write::<u32>(&key, |_| Some(2));
        assert_eq!(cache.peek::<u32>(&key).as_deref(), Some(&2));

        cache.restore(snapshot);
        assert_eq!(cache.peek::<u32>(&key).as_deref(), Some(&3));
    }

    #[test]
    fn snapshot_of_absent_key_restores_absence() {
        let cache = QueryCache::new();
        let key = keys::book(9);

        let snapshot = cache.snapshot(&key);
        cache.write::<u32>(&key, |_| Some(1));
        cache.restore(snapshot);

        assert!(cache.peek::<u32>(&key).is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = QueryCache::new();
        cache.write::<u32>(&keys::me(), |_| Some(1));
        cache.write::<u32>(&keys::books_list(), |_| Some(2));

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.peek::<u32>(&keys::me()).is_none());
    }

    #[test]
    fn status_reflects_freshness_window() {
        let cache = QueryCache::new();
        let key = keys::me();
        cache.write::<u32>(&key, |_| Some(1));

        assert_eq!(cache.status(&key, MINUTE), Some(EntryStatus::Fresh));
        assert_eq!(cache.status(&key, Duration::ZERO), Some(EntryStatus::Stale));
        assert_eq!(cache.status(&keys::loans(), MINUTE), None);
    }
}
