//! Stub implementations for testing.
//!
//! These implementations simulate the payment and catalog collaborators
//! without making real API calls.

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::time::Duration;

use stockade_domain::{BuyerId, OrderId, Price, ProductId};

use crate::error::AdmissionError;
use crate::ports::{CatalogPort, PaymentOutcome, PaymentPort, ProductRecord};

// =============================================================================
// Stub Payment
// =============================================================================

/// Behavior of the stub payment collaborator.
#[derive(Debug, Clone)]
pub enum StubPaymentMode {
    /// Every settlement is approved
    AlwaysApprove,
    /// Every settlement is declined with the given reason
    AlwaysDecline(String),
    /// Every buyer abandons before confirming
    AlwaysAbandon,
    /// The collaborator never answers (exercises the caller's timeout)
    NeverRespond,
    /// The collaborator is unreachable (transport fault)
    Unreachable,
    /// Random mix, mirroring a real checkout funnel: a share of buyers
    /// abandon, a share of captures decline, the rest approve
    Simulated {
        /// Probability in [0, 1] that the buyer abandons
        abandon_rate: f64,
        /// Probability in [0, 1] that the capture is declined
        decline_rate: f64,
    },
}

/// Stub payment collaborator for testing.
///
/// Either runs in a fixed mode or plays back a script of outcomes, one per
/// settlement, for deterministic multi-order tests.
pub struct StubPayment {
    mode: RwLock<StubPaymentMode>,
    script: RwLock<VecDeque<PaymentOutcome>>,
    settle_delay: RwLock<Duration>,
    settle_count: RwLock<u64>,
}

impl StubPayment {
    /// Create a stub with the given mode.
    pub fn new(mode: StubPaymentMode) -> Self {
        Self {
            mode: RwLock::new(mode),
            script: RwLock::new(VecDeque::new()),
            settle_delay: RwLock::new(Duration::ZERO),
            settle_count: RwLock::new(0),
        }
    }

    /// Stub that approves everything.
    pub fn approving() -> Self {
        Self::new(StubPaymentMode::AlwaysApprove)
    }

    /// Stub mirroring the original checkout funnel (20% abandon, 20% decline).
    pub fn simulated() -> Self {
        Self::new(StubPaymentMode::Simulated { abandon_rate: 0.2, decline_rate: 0.2 })
    }

    /// Swap the mode at runtime.
    pub fn set_mode(&self, mode: StubPaymentMode) {
        *self.mode.write().unwrap_or_else(|e| e.into_inner()) = mode;
    }

    /// Queue scripted outcomes; they take precedence over the mode until
    /// the queue drains.
    pub fn push_script(&self, outcomes: impl IntoIterator<Item = PaymentOutcome>) {
        let mut script = self.script.write().unwrap_or_else(|e| e.into_inner());
        script.extend(outcomes);
    }

    /// Add a fixed delay before each settlement resolves.
    pub fn set_settle_delay(&self, delay: Duration) {
        *self.settle_delay.write().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    /// How many settlements were attempted.
    pub fn settle_count(&self) -> u64 {
        *self.settle_count.read().unwrap_or_else(|e| e.into_inner())
    }

    fn next_outcome(&self) -> Result<Option<PaymentOutcome>, AdmissionError> {
        if let Some(scripted) =
            self.script.write().unwrap_or_else(|e| e.into_inner()).pop_front()
        {
            return Ok(Some(scripted));
        }

        let mode = self.mode.read().unwrap_or_else(|e| e.into_inner()).clone();
        match mode {
            StubPaymentMode::AlwaysApprove => Ok(Some(PaymentOutcome::Approved)),
            StubPaymentMode::AlwaysDecline(reason) => {
                Ok(Some(PaymentOutcome::Declined { reason }))
            }
            StubPaymentMode::AlwaysAbandon => Ok(Some(PaymentOutcome::Abandoned)),
            StubPaymentMode::NeverRespond => Ok(None),
            StubPaymentMode::Unreachable => {
                Err(AdmissionError::Payment("Simulated payment outage".to_string()))
            }
            StubPaymentMode::Simulated { abandon_rate, decline_rate } => {
                let mut rng = rand::thread_rng();
                if rng.gen::<f64>() < abandon_rate {
                    Ok(Some(PaymentOutcome::Abandoned))
                } else if rng.gen::<f64>() < decline_rate {
                    Ok(Some(PaymentOutcome::Declined {
                        reason: "card declined".to_string(),
                    }))
                } else {
                    Ok(Some(PaymentOutcome::Approved))
                }
            }
        }
    }
}

#[async_trait]
impl PaymentPort for StubPayment {
    async fn settle(
        &self,
        order_id: OrderId,
        _buyer_id: BuyerId,
        _amount: Decimal,
    ) -> Result<PaymentOutcome, AdmissionError> {
        {
            let mut count = self.settle_count.write().unwrap_or_else(|e| e.into_inner());
            *count += 1;
        }

        let delay = *self.settle_delay.read().unwrap_or_else(|e| e.into_inner());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.next_outcome()? {
            Some(outcome) => {
                tracing::debug!(%order_id, ?outcome, "Stub: payment settled");
                Ok(outcome)
            }
            None => {
                // NeverRespond: park until the caller's timeout fires
                tracing::debug!(%order_id, "Stub: payment pending forever");
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
        }
    }
}

// =============================================================================
// Stub Catalog
// =============================================================================

/// Stub catalog collaborator backed by an in-memory map.
pub struct StubCatalog {
    products: RwLock<HashMap<ProductId, ProductRecord>>,
}

impl StubCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self { products: RwLock::new(HashMap::new()) }
    }

    /// Register a product that is on sale.
    pub fn add_product(&self, product_id: ProductId, price: Price) {
        let mut products = self.products.write().unwrap_or_else(|e| e.into_inner());
        products.insert(product_id, ProductRecord { product_id, price, on_sale: true });
    }

    /// Register or update a product with explicit visibility.
    pub fn set_product(&self, record: ProductRecord) {
        let mut products = self.products.write().unwrap_or_else(|e| e.into_inner());
        products.insert(record.product_id, record);
    }
}

impl Default for StubCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogPort for StubCatalog {
    async fn resolve(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductRecord>, AdmissionError> {
        let products = self.products.read().unwrap_or_else(|e| e.into_inner());
        Ok(products.get(&product_id).cloned())
    }
}

// =============================================================================
// Tests
// =============================================================================
