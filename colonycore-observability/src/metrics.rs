use std::collections::BTreeMap;
use std::time::Duration;

use parking_lot::RwLock;
use prometheus::{HistogramVec, IntCounterVec, Opts, Registry};

/// Point-in-time per-operation totals, copied out of the live recorder so callers can
/// inspect them without holding a lock open (§4.6: "snapshot is copy-on-read").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationMetrics {
    pub success_count: u64,
    pub error_count: u64,
    pub total_duration: Duration,
}

impl OperationMetrics {
    pub fn total_count(&self) -> u64 {
        self.success_count + self.error_count
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub operations: BTreeMap<String, OperationMetrics>,
}

pub trait MetricsRecorder: Send + Sync {
    fn observe(&self, operation: &str, success: bool, duration: Duration);
    fn snapshot(&self) -> MetricsSnapshot;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn observe(&self, _operation: &str, _success: bool, _duration: Duration) {}

    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot::default()
    }
}

/// Publishes operation duration and success/error counts under a stable metric name family
/// via the `prometheus` crate's default registry conventions, while also keeping a plain
/// in-memory rollup so `snapshot()` doesn't have to walk Prometheus's own internal families.
pub struct PrometheusMetrics {
    registry: Registry,
    duration_ms: HistogramVec,
    outcomes: IntCounterVec,
    totals: RwLock<BTreeMap<String, OperationMetrics>>,
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let duration_ms = HistogramVec::new(
            prometheus::HistogramOpts::new("colonycore_operation_duration_ms", "Service operation duration in milliseconds"),
            &["operation"],
        )
        .expect("metric names and labels are static and well-formed");
        registry.register(Box::new(duration_ms.clone())).expect("metric registered exactly once");

        let outcomes = IntCounterVec::new(
            Opts::new("colonycore_operation_total", "Service operation count by outcome"),
            &["operation", "outcome"],
        )
        .expect("metric names and labels are static and well-formed");
        registry.register(Box::new(outcomes.clone())).expect("metric registered exactly once");

        PrometheusMetrics { registry, duration_ms, outcomes, totals: RwLock::new(BTreeMap::new()) }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for PrometheusMetrics {
    fn default() -> Self {
        PrometheusMetrics::new()
    }
}

impl MetricsRecorder for PrometheusMetrics {
    fn observe(&self, operation: &str, success: bool, duration: Duration) {
        self.duration_ms.with_label_values(&[operation]).observe(duration.as_secs_f64() * 1000.0);
        let outcome = if success { "success" } else { "error" };
        self.outcomes.with_label_values(&[operation, outcome]).inc();

        let mut totals = self.totals.write();
        let entry = totals.entry(operation.to_string()).or_default();
        if success {
            entry.success_count += 1;
        } else {
            entry.error_count += 1;
        }
        entry.total_duration += duration;
    }

    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot { operations: self.totals.read().clone() }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn snapshot_aggregates_success_and_error_counts() {
        let metrics = PrometheusMetrics::new();
        metrics.observe("create_organism", true, Duration::from_millis(10));
        metrics.observe("create_organism", false, Duration::from_millis(20));
        metrics.observe("list_organism", true, Duration::from_millis(5));

        let snapshot = metrics.snapshot();
        let create = &snapshot.operations["create_organism"];
        assert_eq!(create.success_count, 1);
        assert_eq!(create.error_count, 1);
        assert_eq!(create.total_duration, Duration::from_millis(30));
        assert_eq!(snapshot.operations["list_organism"].total_count(), 1);
    }

    #[test]
    fn noop_metrics_snapshot_is_always_empty() {
        let metrics = NoopMetrics;
        metrics.observe("anything", true, Duration::from_secs(1));
        assert!(metrics.snapshot().operations.is_empty());
    }
}
