//! Outcome counters for observability.
//!
//! A read-only projection of how orders settle, exposed at `GET /metrics`
//! in Prometheus text format. The counters mirror the classification
//! taxonomy and are never consulted for correctness; the ledger and the
//! order archive stay authoritative.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

use stockade_domain::Outcome;

use crate::error::{DaemonError, DaemonResult};

/// Daemon metrics registry.
pub struct Metrics {
    registry: Registry,
    /// Orders that completed
    pub orders_success_total: IntCounter,
    /// Orders with a declined payment
    pub orders_failed_total: IntCounter,
    /// Orders canceled (abandoned or timed out)
    pub orders_canceled_total: IntCounter,
    /// Orders turned away sold out
    pub orders_soldout_total: IntCounter,
    /// Requests rejected before classification (faults, bad input)
    pub orders_rejected_total: IntCounter,
    /// Products currently open in the ledger
    pub products_open: IntGauge,
}

impl Metrics {
    /// Create and register the daemon metrics.
    pub fn new() -> DaemonResult<Self> {
        let registry = Registry::new();

        let orders_success_total =
            IntCounter::new("orders_success_total", "Orders that completed")
                .map_err(|e| DaemonError::Metrics(e.to_string()))?;
        let orders_failed_total =
            IntCounter::new("orders_failed_total", "Orders with a declined payment")
                .map_err(|e| DaemonError::Metrics(e.to_string()))?;
        let orders_canceled_total =
            IntCounter::new("orders_canceled_total", "Orders canceled during payment")
                .map_err(|e| DaemonError::Metrics(e.to_string()))?;
        let orders_soldout_total =
            IntCounter::new("orders_soldout_total", "Orders turned away sold out")
                .map_err(|e| DaemonError::Metrics(e.to_string()))?;
        let orders_rejected_total =
            IntCounter::new("orders_rejected_total", "Requests rejected before classification")
                .map_err(|e| DaemonError::Metrics(e.to_string()))?;
        let products_open = IntGauge::new("products_open", "Products open in the ledger")
            .map_err(|e| DaemonError::Metrics(e.to_string()))?;

        for collector in [
            Box::new(orders_success_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(orders_failed_total.clone()),
            Box::new(orders_canceled_total.clone()),
            Box::new(orders_soldout_total.clone()),
            Box::new(orders_rejected_total.clone()),
            Box::new(products_open.clone()),
        ] {
            registry
                .register(collector)
                .map_err(|e| DaemonError::Metrics(e.to_string()))?;
        }

        Ok(Self {
            registry,
            orders_success_total,
            orders_failed_total,
            orders_canceled_total,
            orders_soldout_total,
            orders_rejected_total,
            products_open,
        })
    }

    /// Record one classified order.
    pub fn record_outcome(&self, outcome: Outcome) {
        match outcome {
            Outcome::Completed => self.orders_success_total.inc(),
            Outcome::PaymentFailed => self.orders_failed_total.inc(),
            Outcome::Canceled => self.orders_canceled_total.inc(),
            Outcome::SoldOut => self.orders_soldout_total.inc(),
        }
    }

    /// Encode all metrics to Prometheus text format.
    pub fn encode(&self) -> DaemonResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| DaemonError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| DaemonError::Metrics(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
