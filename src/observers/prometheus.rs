//! Prometheus observer for per-method request statistics.
//!
//! [`PrometheusObserver`] turns the [`MethodStats`] collected by
//! [`Instrumented`](crate::service::Instrumented) into metrics of the
//! official `prometheus` crate and encodes them with its
//! [`TextEncoder`]. Every render builds a fresh [`Registry`], so the same
//! observer can be called repeatedly.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `requests_total` | counter | `method` |
//! | `request_failures_total` | counter | `method` |
//! | `request_latency_seconds_sum` | counter | `method` |
//! | `request_latency_seconds_count` | counter | `method` |
//! | `request_latency_seconds_max` | gauge | `method` |
//!
//! The `_sum`/`_count` pair carries the same series a Prometheus summary
//! named `request_latency_seconds` would, so `rate(..._sum) / rate(..._count)`
//! queries work unchanged. A namespace and subsystem are joined in front of
//! every name, `video_service_view_service_request_latency_seconds_sum` for
//! namespace `video_service` and subsystem `view_service`.
//!
//! # Feature Flag
//!
//! This module requires the `prometheus` feature:
//!
//! ```toml
//! [dependencies]
//! classifica = { version = "0.1", features = ["prometheus"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use classifica::observers::prometheus::PrometheusObserver;
//! use classifica::service::{Instrumented, ViewService};
//! use classifica::RankedCounterStore;
//!
//! let service = Instrumented::new(RankedCounterStore::new());
//! service.increment("video1")?;
//!
//! let output = PrometheusObserver::new()
//!     .with_namespace("views")
//!     .with_const_label("instance", "server-1")
//!     .render(&service.stats())?;
//! assert!(output.contains("views_requests_total{"));
//! assert!(output.contains(r#"instance="server-1""#));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;

use prometheus::{CounterVec, Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

use super::Result;
use crate::service::MethodStats;

const METHOD_LABEL: &str = "method";

/// Observer that exports method statistics in Prometheus text format.
#[derive(Debug, Clone, Default)]
pub struct PrometheusObserver {
    /// Namespace (prefix) for all metrics.
    namespace: Option<String>,
    /// Subsystem, placed between namespace and metric name.
    subsystem: Option<String>,
    /// Constant labels applied to all metrics.
    const_labels: HashMap<String, String>,
}

impl PrometheusObserver {
    /// Creates an observer without namespace or constant labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace prepended to every metric name.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Sets the subsystem placed between namespace and metric name.
    pub fn with_subsystem(mut self, subsystem: &str) -> Self {
        self.subsystem = Some(subsystem.to_string());
        self
    }

    /// Adds a label attached to every metric.
    pub fn with_const_label(mut self, name: &str, value: &str) -> Self {
        self.const_labels.insert(name.to_string(), value.to_string());
        self
    }

    fn opts(&self, name: &str, help: &str) -> Opts {
        let mut opts = Opts::new(name, help).const_labels(self.const_labels.clone());
        if let Some(ref namespace) = self.namespace {
            opts = opts.namespace(namespace.clone());
        }
        if let Some(ref subsystem) = self.subsystem {
            opts = opts.subsystem(subsystem.clone());
        }
        opts
    }

    /// Renders `stats` to Prometheus exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if metric creation, registration, or encoding fails.
    pub fn render(&self, stats: &[MethodStats]) -> Result<String> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            self.opts("requests_total", "Calls made, successful or not"),
            &[METHOD_LABEL],
        )?;
        let failures = IntCounterVec::new(
            self.opts("request_failures_total", "Calls that returned an error"),
            &[METHOD_LABEL],
        )?;
        let latency_sum = CounterVec::new(
            self.opts(
                "request_latency_seconds_sum",
                "Total duration of requests in seconds",
            ),
            &[METHOD_LABEL],
        )?;
        let latency_count = IntCounterVec::new(
            self.opts(
                "request_latency_seconds_count",
                "Requests included in the latency sum",
            ),
            &[METHOD_LABEL],
        )?;
        let peak = GaugeVec::new(
            self.opts("request_latency_seconds_max", "Latency of the slowest call"),
            &[METHOD_LABEL],
        )?;

        for s in stats {
            let method = [s.method.as_str()];
            requests.with_label_values(&method).inc_by(s.requests);
            failures.with_label_values(&method).inc_by(s.failures);
            latency_sum
                .with_label_values(&method)
                .inc_by(s.total_latency.as_secs_f64());
            latency_count.with_label_values(&method).inc_by(s.requests);
            peak.with_label_values(&method)
                .set(s.max_latency.as_secs_f64());
        }

        registry.register(Box::new(requests))?;
        registry.register(Box::new(failures))?;
        registry.register(Box::new(latency_sum))?;
        registry.register(Box::new(latency_count))?;
        registry.register(Box::new(peak))?;

        Self::encode_registry(&registry)
    }

    /// Renders `stats` to bytes (useful for HTTP responses).
    ///
    /// # Errors
    ///
    /// Returns an error if metric creation, registration, or encoding fails.
    pub fn render_bytes(&self, stats: &[MethodStats]) -> Result<Vec<u8>> {
        Ok(self.render(stats)?.into_bytes())
    }

    fn encode_registry(registry: &Registry) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Instrumented, Method, ViewService};
    use crate::store::RankedCounterStore;
    use std::time::Duration;

    fn sample() -> Vec<MethodStats> {
        vec![
            MethodStats {
                method: Method::Increment,
                requests: 5,
                failures: 1,
                total_latency: Duration::from_millis(10),
                max_latency: Duration::from_millis(4),
            },
            MethodStats {
                method: Method::GetTop,
                requests: 2,
                failures: 0,
                total_latency: Duration::from_millis(1),
                max_latency: Duration::from_millis(1),
            },
        ]
    }

    #[test]
    fn test_render_empty() {
        let output = PrometheusObserver::new().render(&[]).unwrap();
        assert!(!output.contains("method="));
    }

    #[test]
    fn test_render_counters() {
        let output = PrometheusObserver::new().render(&sample()).unwrap();
        assert!(output.contains("# TYPE requests_total counter"));
        assert!(output.contains(r#"requests_total{method="increment"} 5"#));
        assert!(output.contains(r#"requests_total{method="get_top"} 2"#));
        assert!(output.contains(r#"request_failures_total{method="increment"} 1"#));
        assert!(output.contains(r#"request_latency_seconds_sum{method="increment"} 0.01"#));
        assert!(output.contains(r#"request_latency_seconds_count{method="increment"} 5"#));
        assert!(output.contains(r#"request_latency_seconds_count{method="get_top"} 2"#));
        assert!(output.contains("# TYPE request_latency_seconds_max gauge"));
    }

    #[test]
    fn test_render_with_namespace() {
        let output = PrometheusObserver::new()
            .with_namespace("views")
            .render(&sample())
            .unwrap();
        assert!(output.contains("views_requests_total"));
        assert!(output.contains("views_request_failures_total"));
    }

    #[test]
    fn test_render_with_namespace_and_subsystem() {
        let output = PrometheusObserver::new()
            .with_namespace("video_service")
            .with_subsystem("view_service")
            .render(&sample())
            .unwrap();
        assert!(output.contains(
            r#"video_service_view_service_request_latency_seconds_sum{method="get_top"} 0.001"#
        ));
        assert!(output.contains(
            r#"video_service_view_service_request_latency_seconds_count{method="get_top"} 2"#
        ));
        assert!(!output.contains("\nrequests_total"));
    }

    #[test]
    fn test_render_with_const_labels() {
        let output = PrometheusObserver::new()
            .with_const_label("instance", "server-1")
            .render(&sample())
            .unwrap();
        assert!(output.contains(r#"instance="server-1""#));
    }

    #[test]
    fn test_render_is_repeatable() {
        let observer = PrometheusObserver::new();
        let first = observer.render(&sample()).unwrap();
        let second = observer.render(&sample()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_instrumented_service() {
        let service = Instrumented::new(RankedCounterStore::new());
        service.increment("a").unwrap();
        service.increment("a").unwrap();
        let bytes = PrometheusObserver::new()
            .render_bytes(&service.stats())
            .unwrap();
        let output = String::from_utf8(bytes).unwrap();
        assert!(output.contains(r#"requests_total{method="increment"} 2"#));
        assert!(output.contains(r#"requests_total{method="get_view"} 0"#));
    }
}
