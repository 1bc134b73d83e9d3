//! Renderers for view lists and request statistics.
//!
//! - [`table`] - Leaderboards and method statistics as tables using `tabled`
//! - [`json`] - View lists, snapshots and statistics as JSON
//! - [`prometheus`] - Method statistics in Prometheus exposition format
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module
//! - `prometheus` - Enables the [`prometheus`] module
//! - `full` - Enables all observer modules
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "table")]
//! # {
//! use classifica::observers::table::TableObserver;
//! use classifica::RankedCounterStore;
//!
//! let store = RankedCounterStore::new();
//! store.increment("video1").unwrap();
//! let table = TableObserver::new().render_views(&store.get_top(10).unwrap());
//! assert!(table.contains("video1"));
//! # }
//! ```

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "prometheus")]
pub mod prometheus;
