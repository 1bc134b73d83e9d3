//! JSON observer for view lists, snapshots and statistics.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! classifica = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use classifica::observers::json::JsonObserver;
//! use classifica::RankedCounterStore;
//!
//! let store = RankedCounterStore::new();
//! store.increment("video1")?;
//!
//! let json = JsonObserver::new().render_views(&store.get_top(5)?)?;
//! assert_eq!(json, r#"[{"id":"video1","views":1}]"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;

use super::Result;
use crate::service::MethodStats;
use crate::snapshot::StoreSnapshot;
use crate::store::ViewCount;

/// Configuration for the JSON observer.
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Whether to pretty-print the JSON output.
    pub pretty: bool,
}

/// An observer that serializes counters and statistics to JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new JSON observer with the specified configuration.
    pub fn with_config(config: JsonConfig) -> Self {
        Self { config }
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Serializes `views` as an array, preserving order.
    pub fn render_views(&self, views: &[ViewCount]) -> Result<String> {
        self.to_json(views)
    }

    /// Serializes a [`StoreSnapshot`].
    pub fn render_snapshot(&self, snapshot: &StoreSnapshot) -> Result<String> {
        self.to_json(snapshot)
    }

    /// Serializes method statistics as an array.
    pub fn render_stats(&self, stats: &[MethodStats]) -> Result<String> {
        self.to_json(stats)
    }

    /// Serializes any value with the configured formatting.
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }
}
