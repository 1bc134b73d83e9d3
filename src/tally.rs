//! Sharded atomic tallies for per-method request statistics.
//!
//! [`Instrumented`](crate::service::instrumented::Instrumented) records a
//! handful of numbers on every call, from every thread that touches the
//! service. A single atomic per number would bounce its cache line between
//! cores on each call, so each tally is split into [`NUM_SHARDS`]
//! cache-padded slots and every thread writes only to its own slot.
//!
//! ```text
//!   Thread 0 ──add──►  [slot 0] (CachePadded)
//!   Thread 1 ──add──►  [slot 1] (CachePadded)
//!      ...                ...
//!   Thread 15 ─add──►  [slot 15] (CachePadded)
//!                          │
//!                          ▼
//!                  value() folds all slots
//! ```
//!
//! Slots are handed out round-robin on a thread's first write and wrap
//! after [`NUM_SHARDS`] threads. All operations use `Ordering::Relaxed`:
//! the tallies are statistics and order nothing else.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

/// Number of slots per tally.
pub(crate) const NUM_SHARDS: usize = 16;

static NEXT_SHARD: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static THREAD_SHARD: usize = NEXT_SHARD.fetch_add(1, Ordering::Relaxed) % NUM_SHARDS;
}

fn new_shards() -> [CachePadded<AtomicU64>; NUM_SHARDS] {
    std::array::from_fn(|_| CachePadded::new(AtomicU64::new(0)))
}

/// A monotonically growing sum.
pub struct Tally {
    shards: [CachePadded<AtomicU64>; NUM_SHARDS],
}

impl Tally {
    /// Creates a tally at zero.
    pub fn new() -> Self {
        Self {
            shards: new_shards(),
        }
    }

    /// Adds `value` to the current thread's slot.
    #[inline]
    pub fn add(&self, value: u64) {
        THREAD_SHARD.with(|idx| self.shards[*idx].fetch_add(value, Ordering::Relaxed));
    }

    /// Returns the sum over all slots.
    pub fn value(&self) -> u64 {
        self.shards
            .iter()
            .fold(0u64, |acc, s| acc.wrapping_add(s.load(Ordering::Relaxed)))
    }
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tally({})", self.value())
    }
}

/// The largest value observed so far.
pub struct Peak {
    shards: [CachePadded<AtomicU64>; NUM_SHARDS],
}

impl Peak {
    /// Creates a peak that reports zero until the first observation.
    pub fn new() -> Self {
        Self {
            shards: new_shards(),
        }
    }

    /// Raises the current thread's slot to `value` if it is larger.
    #[inline]
    pub fn observe(&self, value: u64) {
        THREAD_SHARD.with(|idx| self.shards[*idx].fetch_max(value, Ordering::Relaxed));
    }

    /// Returns the maximum over all slots.
    pub fn value(&self) -> u64 {
        self.shards
            .iter()
            .map(|s| s.load(Ordering::Relaxed))
            .max()
            .unwrap_or(0)
    }
}

impl Default for Peak {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Peak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Peak({})", self.value())
    }
}
