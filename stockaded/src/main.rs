//! Stockade Daemon
//!
//! Runtime orchestrator for the admission engine and API server.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration
//! cargo run -p stockaded
//!
//! # Start with custom environment
//! STOCKADE_ENV=test STOCKADE_API_PORT=8081 cargo run -p stockaded
//! ```
//!
//! # Environment Variables
//!
//! - `STOCKADE_ENV`: Environment (test, development, production)
//! - `STOCKADE_API_HOST`: API host (default: 0.0.0.0)
//! - `STOCKADE_API_PORT`: API port (default: 8080)
//! - `STOCKADE_PAYMENT_MODE`: Payment mode (stub, simulated, http)
//! - `STOCKADE_PAY_SERVICE_URL`: Pay service base URL (http mode)
//! - `STOCKADE_PAYMENT_TIMEOUT_MS`: Settlement budget (default: 3000)

use stockade_connectors::HttpPaymentGateway;
use stockaded::{Config, Daemon, PaymentMode};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("stockaded=info".parse()?))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        payment_mode = ?config.payment.mode,
        "Stockade Daemon"
    );

    // Create and run daemon
    match config.payment.mode.clone() {
        PaymentMode::Stub => Daemon::new_stub(config)?.run().await?,
        PaymentMode::Simulated => Daemon::new_simulated(config)?.run().await?,
        PaymentMode::Http { base_url } => {
            let gateway = HttpPaymentGateway::new(base_url);
            Daemon::with_payment(config, gateway)?.run().await?
        }
    }

    Ok(())
}
