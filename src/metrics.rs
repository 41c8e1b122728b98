/// Prometheus metrics for the order placement path.
///
/// The registry is process-global; an embedding server exposes
/// [`MetricsCollector::encode`] on its scrape endpoint.
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// Global metrics registry instance.
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

/// Labels for order placement outcomes. `status` is `committed` or the
/// snake_case error kind.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PlacementLabels {
    pub status: String,
}

pub struct MetricsCollector {
    registry: RwLock<Registry>,

    /// Placement attempts by outcome.
    pub orders_placed_total: Family<PlacementLabels, Counter>,

    /// Conditional decrements that lost a race to a concurrent order.
    pub stock_conflicts_total: Counter,

    /// Compensating increments that had to be retried.
    pub rollback_retries_total: Counter,

    /// Compensating increments that exhausted their retries; each one is
    /// a stock inconsistency needing manual reconciliation.
    pub rollback_failures_total: Counter,

    /// End-to-end placement latency in seconds.
    pub order_placement_duration_seconds: Histogram,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let orders_placed_total = Family::<PlacementLabels, Counter>::default();
        registry.register(
            "orders_placed_total",
            "Order placement attempts by outcome",
            orders_placed_total.clone(),
        );

        let stock_conflicts_total = Counter::default();
        registry.register(
            "stock_conflicts_total",
            "Conditional decrements lost to a concurrent order",
            stock_conflicts_total.clone(),
        );

        let rollback_retries_total = Counter::default();
        registry.register(
            "rollback_retries_total",
            "Compensating increment retries",
            rollback_retries_total.clone(),
        );

        let rollback_failures_total = Counter::default();
        registry.register(
            "rollback_failures_total",
            "Compensating increments that exhausted retries",
            rollback_failures_total.clone(),
        );

        let order_placement_duration_seconds = Histogram::new(exponential_buckets(0.001, 2.5, 10));
        registry.register(
            "order_placement_duration_seconds",
            "Order placement latency in seconds",
            order_placement_duration_seconds.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            orders_placed_total,
            stock_conflicts_total,
            rollback_retries_total,
            rollback_failures_total,
            order_placement_duration_seconds,
        }
    }

    pub fn record_placement(&self, status: &str) {
        self.orders_placed_total
            .get_or_create(&PlacementLabels {
                status: status.to_string(),
            })
            .inc();
    }

    /// Encode all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        if let Err(err) = text::encode(&mut buffer, &registry) {
            tracing::warn!(error = %err, "failed to encode metrics");
        }
        buffer
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
