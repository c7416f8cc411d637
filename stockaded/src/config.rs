//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use std::env;
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Payment collaborator configuration
    pub payment: PaymentConfig,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Payment collaborator configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// How to settle payments
    pub mode: PaymentMode,
    /// Settlement budget; expiry is classified as buyer abandonment
    pub timeout: Duration,
}

/// Payment settlement mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMode {
    /// In-process stub that approves everything
    Stub,
    /// In-process stub mirroring a checkout funnel (abandons and declines)
    Simulated,
    /// External pay service over HTTP
    Http {
        /// Pay service base URL
        base_url: String,
    },
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment (uses stubs)
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let payment = Self::load_payment_config()?;

        Ok(Self { api, payment, environment })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            payment: PaymentConfig {
                mode: PaymentMode::Stub,
                timeout: Duration::from_millis(500),
            },
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("STOCKADE_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid STOCKADE_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("STOCKADE_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_str = env::var("STOCKADE_API_PORT").unwrap_or_else(|_| "8080".to_string());

        let port = port_str.parse::<u16>().map_err(|_| {
            DaemonError::Config(format!("Invalid STOCKADE_API_PORT: {}", port_str))
        })?;

        Ok(ApiConfig { host, port })
    }

    fn load_payment_config() -> DaemonResult<PaymentConfig> {
        let mode_str =
            env::var("STOCKADE_PAYMENT_MODE").unwrap_or_else(|_| "simulated".to_string());

        let mode = match mode_str.to_lowercase().as_str() {
            "stub" => PaymentMode::Stub,
            "simulated" => PaymentMode::Simulated,
            "http" => {
                let base_url = env::var("STOCKADE_PAY_SERVICE_URL").map_err(|_| {
                    DaemonError::Config(
                        "STOCKADE_PAY_SERVICE_URL is required when STOCKADE_PAYMENT_MODE=http"
                            .to_string(),
                    )
                })?;
                PaymentMode::Http { base_url }
            }
            other => {
                return Err(DaemonError::Config(format!(
                    "Invalid STOCKADE_PAYMENT_MODE: {}. Expected: stub, simulated, http",
                    other
                )))
            }
        };

        let timeout_str =
            env::var("STOCKADE_PAYMENT_TIMEOUT_MS").unwrap_or_else(|_| "3000".to_string());
        let timeout_ms = timeout_str.parse::<u64>().map_err(|_| {
            DaemonError::Config(format!("Invalid STOCKADE_PAYMENT_TIMEOUT_MS: {}", timeout_str))
        })?;

        Ok(PaymentConfig { mode, timeout: Duration::from_millis(timeout_ms) })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig { host: "0.0.0.0".to_string(), port: 8080 },
            payment: PaymentConfig {
                mode: PaymentMode::Simulated,
                timeout: Duration::from_millis(3000),
            },
            environment: Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
