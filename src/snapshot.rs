//! Serializable point-in-time copy of every counter.
//!
//! # Feature Flag
//!
//! This module requires the `serde` feature:
//!
//! ```toml
//! [dependencies]
//! classifica = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use classifica::snapshot::StoreSnapshot;
//! use classifica::RankedCounterStore;
//!
//! let store = RankedCounterStore::new();
//! store.increment("video2")?;
//! store.increment("video1")?;
//! store.increment("video1")?;
//!
//! let snapshot = StoreSnapshot::capture(&store)?;
//! assert_eq!(snapshot.views[0].id, "video1");
//! assert_eq!(snapshot.get("video1").map(|v| v.views), Some(2));
//! assert_eq!(snapshot.total_views(), 3);
//! // serialized: {"views":[{"id":"video1","views":2},{"id":"video2","views":1}]}
//! # Ok::<(), classifica::ViewError>(())
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::service::ViewService;
use crate::store::ViewCount;

/// Every known id with its count, optionally stamped with capture time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Capture time in milliseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// The counters, sorted by id.
    pub views: Vec<ViewCount>,
}

impl StoreSnapshot {
    /// Creates a snapshot from `views`, sorting them by id.
    pub fn new(mut views: Vec<ViewCount>) -> Self {
        views.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        Self {
            timestamp_ms: None,
            views,
        }
    }

    /// Creates a snapshot from `views` stamped with `timestamp_ms`.
    pub fn with_timestamp(views: Vec<ViewCount>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            ..Self::new(views)
        }
    }

    /// Captures every counter of `service`.
    pub fn capture<S: ViewService + ?Sized>(service: &S) -> Result<Self> {
        Ok(Self::new(service.get_all()?))
    }

    /// Captures every counter of `service`, stamped with the current time.
    pub fn capture_now<S: ViewService + ?Sized>(service: &S) -> Result<Self> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Ok(Self::with_timestamp(service.get_all()?, now))
    }

    /// Finds the counter of `id`.
    pub fn get(&self, id: &str) -> Option<&ViewCount> {
        self.views
            .binary_search_by(|v| v.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.views[i])
    }

    /// Returns the sum of all counts.
    pub fn total_views(&self) -> u64 {
        self.views.iter().map(|v| v.views).sum()
    }
}
