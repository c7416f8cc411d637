//! Stockade Daemon Library
//!
//! Runtime orchestrator for the stockade admission engine.
//!
//! # Architecture
//!
//! ```text
//! HTTP → API Server → Admission Service → Arbiter → Stock Ledger
//!             │              │
//!             │              └→ Payment Port (stub or HTTP gateway)
//!             │
//!        Event Bus (admitted / settled / stock changes)
//!             │
//!          Metrics (outcome counters)
//! ```
//!
//! # Components
//!
//! - **Daemon**: Main runtime orchestrator
//! - **API**: HTTP endpoints (orders, products, health, metrics)
//! - **Event Bus**: Internal communication (order events, stock changes)
//! - **Metrics**: Prometheus outcome counters
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use stockaded::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::new_simulated(config).expect("Failed to build daemon");
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod event_bus;
pub mod metrics;

// Re-exports for convenience
pub use config::{ApiConfig, Config, Environment, PaymentConfig, PaymentMode};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use event_bus::{DaemonEvent, EventBus, EventReceiver};
pub use metrics::Metrics;
