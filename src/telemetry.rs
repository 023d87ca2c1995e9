//! Telemetry metric name constants.
//!
//! Centralised metric names for biblion operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `biblion_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `namespace` — first segment of the query key (e.g. "books", "me")
//! - `operation` — gateway operation (e.g. "fetch books", "borrow book")
//! - `status` — outcome: "ok" or "error"

/// Total HTTP requests issued by the client adapter.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "biblion_requests_total";

/// Total cache reads answered from a fresh entry without a fetch.
///
/// Labels: `namespace`.
pub const CACHE_HITS_TOTAL: &str = "biblion_cache_hits_total";

/// Total cache reads that required a fetch (absent or stale entry).
///
/// Labels: `namespace`.
pub const CACHE_MISSES_TOTAL: &str = "biblion_cache_misses_total";

/// Total reads that attached to an already in-flight fetch for their key.
///
/// Labels: `namespace`.
pub const CACHE_JOINS_TOTAL: &str = "biblion_cache_joins_total";

/// Total mutations run through the coordinator.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const MUTATIONS_TOTAL: &str = "biblion_mutations_total";

/// Total optimistic patches rolled back after a failed mutation.
///
/// Labels: `operation`.
pub const ROLLBACKS_TOTAL: &str = "biblion_rollbacks_total";
