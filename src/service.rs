//! The view counter interface consumed by request handlers.
//!
//! [`ViewService`] is the seam between request handling and whatever keeps
//! the counts. [`RankedCounterStore`] is the in-process implementation; a
//! durable backend would implement the same five calls. Decorators wrap any
//! implementation and forward every call:
//!
//! | Decorator | Adds |
//! |-----------|------|
//! | [`Logged`] | One log line per call with arguments, latency and outcome |
//! | [`Instrumented`] | Per-method request, failure and latency statistics |
//!
//! # Examples
//!
//! ```rust
//! use classifica::service::{Instrumented, Logged, Method, ViewService};
//! use classifica::RankedCounterStore;
//!
//! let service = Instrumented::new(Logged::new(RankedCounterStore::new()));
//! service.increment("video1")?;
//! service.increment("video1")?;
//! assert_eq!(service.get_view("video1")?, 2);
//!
//! let stats = service.stats_for(Method::Increment);
//! assert_eq!(stats.requests, 2);
//! # Ok::<(), classifica::ViewError>(())
//! ```

pub mod instrumented;
mod logging;

pub use instrumented::{Instrumented, MethodStats};
pub use logging::Logged;

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::store::{RankedCounterStore, ViewCount};

/// View counter operations.
///
/// Implementations must keep counts monotonic under concurrent increments,
/// answer reads of unknown ids with 0 and no side effects, and return
/// top/recent lists that reflect one consistent state.
pub trait ViewService: Send + Sync {
    /// Returns the count of `id`, or 0 if it was never incremented.
    fn get_view(&self, id: &str) -> Result<u64>;

    /// Returns every known id with its count.
    fn get_all(&self) -> Result<Vec<ViewCount>>;

    /// Records one view of `id`.
    fn increment(&self, id: &str) -> Result<()>;

    /// Returns up to `n` ids by descending count.
    fn get_top(&self, n: i64) -> Result<Vec<ViewCount>>;

    /// Returns up to `n` ids by most recent increment.
    fn get_recent(&self, n: i64) -> Result<Vec<ViewCount>>;
}

impl ViewService for RankedCounterStore {
    fn get_view(&self, id: &str) -> Result<u64> {
        RankedCounterStore::get_view(self, id)
    }

    fn get_all(&self) -> Result<Vec<ViewCount>> {
        Ok(RankedCounterStore::get_all(self))
    }

    fn increment(&self, id: &str) -> Result<()> {
        RankedCounterStore::increment(self, id)
    }

    fn get_top(&self, n: i64) -> Result<Vec<ViewCount>> {
        RankedCounterStore::get_top(self, n)
    }

    fn get_recent(&self, n: i64) -> Result<Vec<ViewCount>> {
        RankedCounterStore::get_recent(self, n)
    }
}

impl<S: ViewService + ?Sized> ViewService for Arc<S> {
    fn get_view(&self, id: &str) -> Result<u64> {
        (**self).get_view(id)
    }

    fn get_all(&self) -> Result<Vec<ViewCount>> {
        (**self).get_all()
    }

    fn increment(&self, id: &str) -> Result<()> {
        (**self).increment(id)
    }

    fn get_top(&self, n: i64) -> Result<Vec<ViewCount>> {
        (**self).get_top(n)
    }

    fn get_recent(&self, n: i64) -> Result<Vec<ViewCount>> {
        (**self).get_recent(n)
    }
}

/// The operations of [`ViewService`], used to label logs and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Method {
    /// [`ViewService::get_view`]
    GetView,
    /// [`ViewService::get_all`]
    GetAll,
    /// [`ViewService::increment`]
    Increment,
    /// [`ViewService::get_top`]
    GetTop,
    /// [`ViewService::get_recent`]
    GetRecent,
}

impl Method {
    /// Number of methods.
    pub const COUNT: usize = 5;

    /// Every method, in declaration order.
    pub const ALL: [Method; Method::COUNT] = [
        Method::GetView,
        Method::GetAll,
        Method::Increment,
        Method::GetTop,
        Method::GetRecent,
    ];

    /// Returns the snake_case name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GetView => "get_view",
            Method::GetAll => "get_all",
            Method::Increment => "increment",
            Method::GetTop => "get_top",
            Method::GetRecent => "get_recent",
        }
    }

    pub(crate) fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
