//! Bounded, thread-safe, time-pruned store of accepted events.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::types::EventRecord;

/// Bounds for the event store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long records are retained, in minutes.
    pub retention_minutes: i64,

    /// Hard cap on the number of retained records.
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { retention_minutes: 4320, capacity: 100_000 }
    }
}

/// Construction-time configuration errors.
///
/// The store refuses to operate with undefined bounds rather than clamping.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreConfigError {
    #[error("retention must be positive, got {0} minutes")]
    NonPositiveRetention(i64),

    #[error("capacity must be non-zero")]
    ZeroCapacity,
}

/// Ordered sequence plus membership set, guarded as one unit.
///
/// The pair must stay behind a single lock: pruning, the duplicate check,
/// insertion, and capacity eviction all touch both fields and are only
/// correct when they happen atomically with respect to each other.
struct StoreInner {
    /// Front is oldest-inserted, back is newest-inserted. Insertion order is
    /// the store order; it is not re-sorted by timestamp.
    events: VecDeque<EventRecord>,

    /// Ids of all currently retained records, for O(1) duplicate detection.
    seen_ids: HashSet<String>,
}

/// Thread-safe, in-memory, time-pruned event store.
///
/// The store is the sole synchronization point between the ingestor and any
/// number of concurrent readers. All operations are total: duplicates and
/// stale candidates are silently dropped, and readers only ever receive
/// copies, never references into the interior.
pub struct EventStore {
    inner: Mutex<StoreInner>,
    retention: Duration,
    capacity: usize,
}

impl EventStore {
    /// Create a store with the given bounds.
    ///
    /// Returns [`StoreConfigError`] when retention is non-positive or
    /// capacity is zero.
    pub fn new(config: StoreConfig) -> Result<Self, StoreConfigError> {
        if config.retention_minutes <= 0 {
            return Err(StoreConfigError::NonPositiveRetention(config.retention_minutes));
        }
        if config.capacity == 0 {
            return Err(StoreConfigError::ZeroCapacity);
        }

        Ok(Self {
            inner: Mutex::new(StoreInner {
                events: VecDeque::new(),
                seen_ids: HashSet::new(),
            }),
            retention: Duration::minutes(config.retention_minutes),
            capacity: config.capacity,
        })
    }

    /// Add a batch of candidate records, returning how many were accepted.
    ///
    /// Before inserting, records older than the retention window are pruned
    /// from the front of the sequence. Candidates are then processed in input
    /// order: a candidate is dropped when its id is already present or when
    /// it is itself older than the cutoff. When the store is at capacity the
    /// oldest-inserted record is evicted to make room.
    pub fn add_events(&self, candidates: Vec<EventRecord>) -> usize {
        let cutoff = Utc::now() - self.retention;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        // Front-pruning is only correct because capacity eviction below also
        // removes from the front: the front is oldest-inserted, not
        // oldest-by-timestamp.
        while inner.events.front().is_some_and(|oldest| oldest.created_at < cutoff) {
            if let Some(expired) = inner.events.pop_front() {
                inner.seen_ids.remove(&expired.id);
            }
        }

        let mut added = 0;
        for event in candidates {
            if inner.seen_ids.contains(&event.id) {
                continue;
            }
            if event.created_at < cutoff {
                continue;
            }
            if inner.events.len() >= self.capacity {
                if let Some(evicted) = inner.events.pop_front() {
                    inner.seen_ids.remove(&evicted.id);
                }
            }
            inner.seen_ids.insert(event.id.clone());
            inner.events.push_back(event);
            added += 1;
        }
        added
    }

    /// Consistent point-in-time copy of all retained records, in store order.
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.inner.lock().events.iter().cloned().collect()
    }

    /// Subset of the current snapshot with `created_at >= since`, preserving
    /// store order.
    pub fn recent_since(&self, since: DateTime<Utc>) -> Vec<EventRecord> {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|event| event.created_at >= since)
            .cloned()
            .collect()
    }

    /// Number of currently retained records.
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    /// The configured retention window.
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// The configured hard capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
