//! Engine layer error types.
//!
//! Only system faults live here. Business outcomes (sold out, payment
//! declined, buyer abandoned) are never errors — they come back as a
//! classified `OrderResult` with `success: false`.

use stockade_domain::ProductId;
use thiserror::Error;

/// Errors that can occur while admitting an order.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Product does not exist in the catalog (distinct from sold out)
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// Product exists but is not currently on sale
    #[error("Product not on sale: {0}")]
    ProductNotOnSale(ProductId),

    /// Payment collaborator could not be reached or answered garbage
    #[error("Payment collaborator fault: {0}")]
    Payment(String),

    /// Catalog collaborator fault
    #[error("Catalog fault: {0}")]
    Catalog(String),

    /// Ledger error (corrupted or missing stock record)
    #[error("Ledger error: {0}")]
    Ledger(#[from] stockade_ledger::LedgerError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] stockade_store::StoreError),

    /// Domain error (invalid transition is a programming fault)
    #[error("Domain error: {0}")]
    Domain(#[from] stockade_domain::DomainError),
}

/// Result type for admission operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;
