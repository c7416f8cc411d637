//! Daemon error types.

use stockade_domain::DomainError;
use stockade_engine::AdmissionError;
use stockade_ledger::LedgerError;
use stockade_store::StoreError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Admission error
    #[error("Admission error: {0}")]
    Admission(#[from] AdmissionError),

    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Event bus error
    #[error("Event bus error: {0}")]
    EventBus(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shutdown requested
    #[error("Shutdown requested")]
    Shutdown,
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
