//! Daemon: Main runtime orchestrator.
//!
//! The Daemon ties together all components:
//! - Admission Service (order lifecycle)
//! - Stock Ledger (per-product availability)
//! - Event Bus (internal communication)
//! - API Server (HTTP endpoints)
//! - Metrics (outcome counters)
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Initialize components
//! 3. Start API server
//! 4. Main event loop (log settled orders and stock changes)
//! 5. Graceful shutdown on SIGINT

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use stockade_engine::{AdmissionService, PaymentPort, StubCatalog, StubPayment};
use stockade_ledger::{ReservationArbiter, StockLedger};
use stockade_store::MemoryOrderStore;

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::event_bus::{DaemonEvent, EventBus};
use crate::metrics::Metrics;

// =============================================================================
// Daemon
// =============================================================================

/// The main stockade daemon.
pub struct Daemon<P: PaymentPort + 'static> {
    /// Configuration
    config: Config,
    /// Shared API state (service, ledger, catalog, store, metrics, bus)
    state: Arc<ApiState<P>>,
}

impl Daemon<StubPayment> {
    /// Create a daemon with the approving payment stub.
    pub fn new_stub(config: Config) -> DaemonResult<Self> {
        Self::with_payment(config, StubPayment::approving())
    }

    /// Create a daemon with the simulated checkout funnel.
    pub fn new_simulated(config: Config) -> DaemonResult<Self> {
        Self::with_payment(config, StubPayment::simulated())
    }
}

impl<P: PaymentPort + 'static> Daemon<P> {
    /// Create a daemon around an explicit payment collaborator.
    pub fn with_payment(config: Config, payment: P) -> DaemonResult<Self> {
        let ledger = Arc::new(StockLedger::new());
        let catalog = Arc::new(StubCatalog::new());
        let store = Arc::new(MemoryOrderStore::new());
        let event_bus = Arc::new(EventBus::new(1000));
        let metrics = Arc::new(Metrics::new()?);

        let service = Arc::new(
            AdmissionService::new(
                Arc::new(ReservationArbiter::new(ledger.clone())),
                Arc::new(payment),
                catalog.clone(),
                store.clone(),
            )
            .with_payment_timeout(config.payment.timeout),
        );

        let state =
            Arc::new(ApiState { service, ledger, catalog, store, metrics, event_bus });

        Ok(Self { config, state })
    }

    /// Shared API state (for tests and embedding).
    pub fn state(&self) -> &Arc<ApiState<P>> {
        &self.state
    }

    /// Run the daemon.
    ///
    /// This method blocks until shutdown is requested (SIGINT).
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            "Starting stockade daemon"
        );

        // 1. Start API server
        let api_addr = self.start_api_server().await?;
        info!(%api_addr, "API server started");

        // 2. Subscribe to event bus
        let mut event_receiver = self.state.event_bus.subscribe();

        // 3. Main event loop
        info!("Entering main event loop");
        loop {
            tokio::select! {
                Some(event_result) = event_receiver.recv() => {
                    match event_result {
                        Ok(event) => {
                            if let Err(e) = self.handle_event(event) {
                                if matches!(e, DaemonError::Shutdown) {
                                    break;
                                }
                                error!(error = %e, "Error handling event");
                            }
                        }
                        Err(lag_msg) => {
                            warn!(%lag_msg, "Event receiver lagged");
                        }
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        // 4. Graceful shutdown
        self.shutdown();

        Ok(())
    }

    /// Start the API server on the configured host/port.
    pub async fn start_api_server(&self) -> DaemonResult<SocketAddr> {
        let router = create_router(self.state.clone());
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DaemonError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| DaemonError::Config(format!("Failed to get local address: {}", e)))?;

        // Spawn the server task
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "API server error");
            }
        });

        Ok(local_addr)
    }

    /// Handle an event from the event bus.
    fn handle_event(&self, event: DaemonEvent) -> DaemonResult<()> {
        match event {
            DaemonEvent::OrderAdmitted { order_id, product_id, quantity, .. } => {
                info!(%order_id, %product_id, quantity, "Order admitted");
            }

            DaemonEvent::OrderSettled { order_id, product_id, outcome, .. } => {
                info!(%order_id, %product_id, outcome = outcome.label(), "Order settled");
            }

            DaemonEvent::StockChanged { product_id, available, .. } => {
                info!(%product_id, available, "Stock changed");
            }

            DaemonEvent::Shutdown => {
                info!("Shutdown event received");
                return Err(DaemonError::Shutdown);
            }
        }

        Ok(())
    }

    /// Graceful shutdown.
    fn shutdown(&self) {
        info!("Initiating graceful shutdown");

        let archived = self.state.store.order_count();
        info!(archived_orders = archived, "Shutdown complete");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stockade_domain::{Price, ProductId};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_daemon_stub_creation() {
        let config = Config::test();
        let daemon = Daemon::new_stub(config).unwrap();

        assert_eq!(daemon.state().store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_daemon_api_server_start() {
        let config = Config::test();
        let daemon = Daemon::new_stub(config).unwrap();

        let addr = daemon.start_api_server().await.unwrap();

        // Server should be running on a port
        assert!(addr.port() > 0);

        // Can make a health check request
        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn test_daemon_handle_settled_event() {
        let config = Config::test();
        let daemon = Daemon::new_stub(config).unwrap();

        let product_id = ProductId::new(32).unwrap();
        daemon.state().catalog.add_product(product_id, Price::new(dec!(10)).unwrap());

        let event = DaemonEvent::StockChanged {
            product_id,
            available: 10,
            timestamp: chrono::Utc::now(),
        };
        daemon.handle_event(event).unwrap();
    }

    #[tokio::test]
    async fn test_daemon_shutdown_event_breaks_loop() {
        let config = Config::test();
        let daemon = Daemon::new_stub(config).unwrap();

        let result = daemon.handle_event(DaemonEvent::Shutdown);
        assert!(matches!(result, Err(DaemonError::Shutdown)));
    }
}
