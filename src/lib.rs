//! # Classifica - Ranked View Counters
//!
//! An in-memory store of per-key view counters that can answer two ranking
//! queries without scanning every key:
//!
//! - **top N**: the keys with the most views, most viewed first
//! - **recent N**: the keys incremented most recently, newest first
//!
//! ## How It Works
//!
//! Every record lives once in an arena and is indexed by two
//! [`AddressableHeap`](heap::AddressableHeap)s, one ordered by count and one
//! ordered by recency. Each record remembers its position in both heaps
//! through a typed [`Handle`](heap::Handle), so an increment repairs exactly
//! the two affected heap entries in `O(log n)`:
//!
//! ```text
//!                ┌──────────────┐
//!   "video1" ──► │ record 0     │ ◄── by_count[2]
//!                │ count: 7     │ ◄── by_recency[0]
//!                │ sequence: 12 │
//!                └──────────────┘
//! ```
//!
//! Ranking queries walk a heap best-first and never mutate it, so reads run
//! concurrently behind a shared lock and cost `O(k log k)` for `k` results.
//!
//! | Operation | Cost |
//! |-----------|------|
//! | [`get_view`](RankedCounterStore::get_view) | `O(1)` |
//! | [`increment`](RankedCounterStore::increment) | `O(log n)` |
//! | [`get_top`](RankedCounterStore::get_top) | `O(k log k)` |
//! | [`get_recent`](RankedCounterStore::get_recent) | `O(k log k)` |
//! | [`get_all`](RankedCounterStore::get_all) | `O(n)` |
//!
//! Equal counts are ordered by ascending id. Recency is ordered by a
//! strictly increasing sequence number, so two increments never tie.
//!
//! ## Quick Start
//!
//! ```rust
//! use classifica::{RankedCounterStore, ViewCount};
//!
//! let store = RankedCounterStore::new();
//! for id in ["a", "b", "b", "a", "c"] {
//!     store.increment(id).unwrap();
//! }
//!
//! assert_eq!(store.get_view("b").unwrap(), 2);
//! assert_eq!(
//!     store.get_top(2).unwrap(),
//!     vec![ViewCount::new("a", 2), ViewCount::new("b", 2)]
//! );
//! assert_eq!(store.get_recent(1).unwrap(), vec![ViewCount::new("c", 1)]);
//! ```
//!
//! ## Services
//!
//! The [`ViewService`] trait is the seam between the store and its callers.
//! [`service::Logged`] and [`service::Instrumented`] wrap any service to add
//! `log` records and per-method request statistics:
//!
//! ```rust
//! use classifica::service::{Instrumented, Logged, Method, ViewService};
//! use classifica::RankedCounterStore;
//!
//! let service = Instrumented::new(Logged::new(RankedCounterStore::new()));
//! service.increment("video1").unwrap();
//! assert!(service.increment("").is_err());
//!
//! let stats = service.stats_for(Method::Increment);
//! assert_eq!(stats.requests, 2);
//! assert_eq!(stats.failures, 1);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | `Serialize`/`Deserialize` for [`ViewCount`], stats and [`snapshot`] |
//! | `json` | [`observers::json`] renderer (implies `serde`) |
//! | `table` | [`observers::table`] renderer |
//! | `prometheus` | [`observers::prometheus`] exporter |
//! | `full` | All of the above |
//! | `demo` | Everything needed by the interactive shell demo |

pub mod error;
pub mod heap;
pub mod observers;
pub mod service;
pub mod shell;
pub mod store;
pub mod tally;

#[cfg(feature = "serde")]
pub mod snapshot;

#[cfg(test)]
mod capture_log;

pub use error::{Result, ViewError};
pub use service::ViewService;
pub use store::{ByCount, ByRecency, RankedCounterStore, StoreConfig, ViewCount};
