//! Request statistics for any [`ViewService`].
//!
//! [`Instrumented`] times every call and records, per [`Method`], how many
//! requests were made, how many failed, the summed latency and the slowest
//! call. Recording goes through sharded [`Tally`]/[`Peak`] cells, so threads
//! calling the service concurrently do not contend on the statistics.
//!
//! ```rust
//! use classifica::service::{Instrumented, Method, ViewService};
//! use classifica::RankedCounterStore;
//!
//! let service = Instrumented::new(RankedCounterStore::new());
//! service.increment("video1")?;
//! let _ = service.get_top(-1);
//!
//! let top = service.stats_for(Method::GetTop);
//! assert_eq!(top.requests, 1);
//! assert_eq!(top.failures, 1);
//! # Ok::<(), classifica::ViewError>(())
//! ```

use std::time::{Duration, Instant};

use super::{Method, ViewService};
use crate::error::Result;
use crate::store::ViewCount;
use crate::tally::{Peak, Tally};

/// Point-in-time statistics of one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodStats {
    /// The method these numbers describe.
    pub method: Method,
    /// Calls made, successful or not.
    pub requests: u64,
    /// Calls that returned an error.
    pub failures: u64,
    /// Summed latency of all calls.
    pub total_latency: Duration,
    /// Latency of the slowest call.
    pub max_latency: Duration,
}

impl MethodStats {
    /// Returns the mean latency, or zero if the method was never called.
    pub fn mean_latency(&self) -> Duration {
        if self.requests == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(saturating_nanos(self.total_latency) / self.requests)
    }
}

#[derive(Debug, Default)]
struct Meter {
    requests: Tally,
    failures: Tally,
    latency_ns: Tally,
    peak_ns: Peak,
}

impl Meter {
    fn record(&self, took: Duration, failed: bool) {
        let nanos = saturating_nanos(took);
        self.requests.add(1);
        if failed {
            self.failures.add(1);
        }
        self.latency_ns.add(nanos);
        self.peak_ns.observe(nanos);
    }

    fn stats(&self, method: Method) -> MethodStats {
        MethodStats {
            method,
            requests: self.requests.value(),
            failures: self.failures.value(),
            total_latency: Duration::from_nanos(self.latency_ns.value()),
            max_latency: Duration::from_nanos(self.peak_ns.value()),
        }
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Records per-method request statistics of the wrapped service.
#[derive(Debug)]
pub struct Instrumented<S> {
    inner: S,
    meters: [Meter; Method::COUNT],
}

impl<S> Instrumented<S> {
    /// Wraps `inner` with all statistics at zero.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            meters: Default::default(),
        }
    }

    /// Returns the wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the statistics of `method`.
    pub fn stats_for(&self, method: Method) -> MethodStats {
        self.meters[method.ordinal()].stats(method)
    }

    /// Returns the statistics of every method, in [`Method::ALL`] order.
    pub fn stats(&self) -> Vec<MethodStats> {
        Method::ALL.iter().map(|m| self.stats_for(*m)).collect()
    }

    fn timed<T>(&self, method: Method, call: impl FnOnce(&S) -> Result<T>) -> Result<T> {
        let begin = Instant::now();
        let result = call(&self.inner);
        self.meters[method.ordinal()].record(begin.elapsed(), result.is_err());
        result
    }
}

impl<S: ViewService> ViewService for Instrumented<S> {
    fn get_view(&self, id: &str) -> Result<u64> {
        self.timed(Method::GetView, |s| s.get_view(id))
    }

    fn get_all(&self) -> Result<Vec<ViewCount>> {
        self.timed(Method::GetAll, |s| s.get_all())
    }

    fn increment(&self, id: &str) -> Result<()> {
        self.timed(Method::Increment, |s| s.increment(id))
    }

    fn get_top(&self, n: i64) -> Result<Vec<ViewCount>> {
        self.timed(Method::GetTop, |s| s.get_top(n))
    }

    fn get_recent(&self, n: i64) -> Result<Vec<ViewCount>> {
        self.timed(Method::GetRecent, |s| s.get_recent(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RankedCounterStore;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_has_zero_stats() {
        let service = Instrumented::new(RankedCounterStore::new());
        let stats = service.stats();
        assert_eq!(stats.len(), Method::ALL.len());
        for s in stats {
            assert_eq!(s.requests, 0);
            assert_eq!(s.failures, 0);
            assert_eq!(s.mean_latency(), Duration::ZERO);
        }
    }

    #[test]
    fn test_counts_requests_and_failures() {
        let service = Instrumented::new(RankedCounterStore::new());
        service.increment("a").unwrap();
        service.increment("a").unwrap();
        assert!(service.increment("").is_err());
        assert_eq!(service.get_view("a"), Ok(2));
        assert!(service.get_recent(-2).is_err());

        let inc = service.stats_for(Method::Increment);
        assert_eq!(inc.method, Method::Increment);
        assert_eq!(inc.requests, 3);
        assert_eq!(inc.failures, 1);
        assert!(inc.max_latency <= inc.total_latency);

        assert_eq!(service.stats_for(Method::GetView).requests, 1);
        assert_eq!(service.stats_for(Method::GetRecent).failures, 1);
        assert_eq!(service.stats_for(Method::GetAll).requests, 0);
    }

    #[test]
    fn test_mean_latency() {
        let stats = MethodStats {
            method: Method::GetTop,
            requests: 4,
            failures: 0,
            total_latency: Duration::from_micros(100),
            max_latency: Duration::from_micros(40),
        };
        assert_eq!(stats.mean_latency(), Duration::from_micros(25));
    }

    #[test]
    fn test_concurrent_callers() {
        let service = Arc::new(Instrumented::new(RankedCounterStore::new()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    for _ in 0..250 {
                        service.increment("hot").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.stats_for(Method::Increment).requests, 1000);
        assert_eq!(service.get_view("hot"), Ok(1000));
    }
}
