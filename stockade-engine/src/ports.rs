//! Engine port definitions.
//!
//! Ports define the interfaces for external collaborators (payment, catalog).
//! Adapters implement these ports for specific services (HTTP gateway, stub).

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockade_domain::{BuyerId, OrderId, Price, ProductId};

use crate::error::AdmissionError;

// =============================================================================
// Payment Port
// =============================================================================

/// How one payment settlement resolved.
///
/// All three variants are ordinary business results. Transport failures
/// (collaborator unreachable, malformed response) are `AdmissionError`s on
/// the `settle` call itself, and are never folded into this enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// Funds captured; the order may complete
    Approved,
    /// The payment was rejected
    Declined {
        /// Reason reported by the collaborator
        reason: String,
    },
    /// The buyer walked away before confirming
    Abandoned,
}

/// Port for the payment collaborator.
///
/// Implementations:
/// - `StubPayment` - For testing (scripted or simulated outcomes)
/// - `HttpPaymentGateway` - Real pay service over HTTP (stockade-connectors)
#[async_trait]
pub trait PaymentPort: Send + Sync {
    /// Settle payment for one reserved order.
    ///
    /// Invoked exactly once per reserved order; the caller bounds the call
    /// with a timeout and treats expiry as buyer abandonment.
    ///
    /// # Arguments
    ///
    /// * `order_id` - Order being settled
    /// * `buyer_id` - Buyer the funds are captured from
    /// * `amount` - Total order amount
    ///
    /// # Errors
    ///
    /// Only transport/collaborator faults; a declined payment is
    /// `Ok(PaymentOutcome::Declined { .. })`.
    async fn settle(
        &self,
        order_id: OrderId,
        buyer_id: BuyerId,
        amount: Decimal,
    ) -> Result<PaymentOutcome, AdmissionError>;
}

// =============================================================================
// Catalog Port
// =============================================================================

/// Product record resolved from the catalog collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product identifier
    pub product_id: ProductId,
    /// Unit price
    pub price: Price,
    /// Whether the product is currently purchasable
    pub on_sale: bool,
}

/// Port for the catalog collaborator.
///
/// This core does not own product creation/removal; it only resolves ids.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Resolve a product id to its record.
    ///
    /// Returns `Ok(None)` when the product does not exist; the caller maps
    /// that to `AdmissionError::UnknownProduct` (a fault, never sold-out).
    ///
    /// # Errors
    ///
    /// Collaborator faults only.
    async fn resolve(&self, product_id: ProductId) -> Result<Option<ProductRecord>, AdmissionError>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_outcome_serialization() {
        let declined = PaymentOutcome::Declined { reason: "insufficient funds".to_string() };
        let json = serde_json::to_string(&declined).unwrap();
        let parsed: PaymentOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, declined);
    }

    #[test]
    fn test_product_record_serialization() {
        let record = ProductRecord {
            product_id: ProductId::new(32).unwrap(),
            price: Price::new(dec!(49.90)).unwrap(),
            on_sale: true,
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: ProductRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.product_id, record.product_id);
        assert!(parsed.on_sale);
    }
}
