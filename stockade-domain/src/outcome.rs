//! Outcome classification.
//!
//! Maps terminal order states to the externally reported result. The mapping
//! is exhaustive and mutually exclusive: every order ends in exactly one
//! outcome. Classification is enum dispatch on the state machine; the string
//! code and message are a rendering concern only.

use crate::order::{CancelReason, Order, OrderId, OrderState};
use crate::value_objects::DomainError;
use serde::{Deserialize, Serialize};

// =============================================================================
// Outcome
// =============================================================================

/// Closed enumeration of terminal order outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Payment settled; stock permanently decremented
    Completed,
    /// Reservation attempt found insufficient stock
    SoldOut,
    /// Payment was declined
    PaymentFailed,
    /// Buyer abandoned during payment (explicitly or by timeout)
    Canceled,
}

impl Outcome {
    /// Classify a terminal order state.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTransition` for non-terminal states;
    /// intermediate states must never be reported to callers.
    pub fn classify(state: &OrderState) -> Result<Self, DomainError> {
        match state {
            OrderState::Completed => Ok(Outcome::Completed),
            OrderState::SoldOut => Ok(Outcome::SoldOut),
            OrderState::PaymentFailed { .. } => Ok(Outcome::PaymentFailed),
            OrderState::Canceled { .. } => Ok(Outcome::Canceled),
            other => Err(DomainError::InvalidTransition(format!(
                "Cannot classify non-terminal state {}",
                other.name()
            ))),
        }
    }

    /// True for the single success row.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Completed => "success",
            Outcome::SoldOut => "soldout",
            Outcome::PaymentFailed => "failed",
            Outcome::Canceled => "canceled",
        }
    }
}

// =============================================================================
// OrderResult
// =============================================================================

/// Structured error reported for a failed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    /// Machine-readable code (e.g. `NOT_ENOUGH_PRODUCT`)
    pub code: String,
    /// Human-readable message; failure class is recoverable from it
    pub message: String,
}

/// The single result returned to the caller for every accepted order.
///
/// Business failures are `success: false` with a structured error, never a
/// transport-level error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    /// The order this result settles
    pub order_id: OrderId,
    /// True only for completed orders
    pub success: bool,
    /// Present exactly when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

impl OrderResult {
    /// Render the final result for a terminal order.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTransition` if the order is not terminal.
    pub fn from_order(order: &Order) -> Result<Self, DomainError> {
        let outcome = Outcome::classify(&order.state)?;
        Ok(Self {
            order_id: order.id,
            success: outcome.is_success(),
            error: render_error(order),
        })
    }

    /// The outcome this result was rendered from.
    pub fn outcome(&self) -> Outcome {
        match &self.error {
            None => Outcome::Completed,
            Some(err) if err.code == codes::NOT_ENOUGH_PRODUCT => Outcome::SoldOut,
            Some(err) if err.code == codes::ORDER_CANCELED => Outcome::Canceled,
            Some(_) => Outcome::PaymentFailed,
        }
    }
}

/// Error codes recognized by callers.
pub mod codes {
    /// Reservation attempt found insufficient stock
    pub const NOT_ENOUGH_PRODUCT: &str = "NOT_ENOUGH_PRODUCT";
    /// Payment was declined
    pub const PAYMENT_FAILED: &str = "PAYMENT_FAILED";
    /// Buyer abandoned during payment
    pub const ORDER_CANCELED: &str = "ORDER_CANCELED";
}

fn render_error(order: &Order) -> Option<OutcomeError> {
    match &order.state {
        OrderState::Completed => None,
        OrderState::SoldOut => Some(OutcomeError {
            code: codes::NOT_ENOUGH_PRODUCT.to_string(),
            message: "Not enough stock to fulfill the requested quantity".to_string(),
        }),
        OrderState::PaymentFailed { reason } => Some(OutcomeError {
            code: codes::PAYMENT_FAILED.to_string(),
            message: format!("Payment FAILED: {}", reason),
        }),
        OrderState::Canceled { reason } => Some(OutcomeError {
            code: codes::ORDER_CANCELED.to_string(),
            message: match reason {
                CancelReason::BuyerAbandoned => {
                    "Order CANCELED: buyer abandoned during payment".to_string()
                }
                CancelReason::PaymentTimeout => {
                    "Order CANCELED: payment did not resolve in time".to_string()
                }
            },
        }),
        // Non-terminal states are rejected by classify() before we get here
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{ProductId, Quantity};

    fn order() -> Order {
        Order::new(28, ProductId::new(32).unwrap(), Quantity::new(1).unwrap())
    }

    #[test]
    fn test_classify_rejects_intermediate_states() {
        assert!(Outcome::classify(&OrderState::Pending).is_err());

        let mut o = order();
        o.mark_reserved().unwrap();
        assert!(Outcome::classify(&o.state).is_err());
    }

    #[test]
    fn test_completed_result() {
        let mut o = order();
        o.mark_reserved().unwrap();
        o.mark_completed().unwrap();

        let result = OrderResult::from_order(&o).unwrap();
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.outcome(), Outcome::Completed);
    }

    #[test]
    fn test_sold_out_result_carries_code() {
        let mut o = order();
        o.mark_sold_out().unwrap();

        let result = OrderResult::from_order(&o).unwrap();
        assert!(!result.success);
        let err = result.error.as_ref().unwrap();
        assert_eq!(err.code, codes::NOT_ENOUGH_PRODUCT);
        assert_eq!(result.outcome(), Outcome::SoldOut);
    }

    #[test]
    fn test_payment_failed_message_contains_failed() {
        let mut o = order();
        o.mark_reserved().unwrap();
        o.mark_payment_failed("insufficient funds").unwrap();

        let result = OrderResult::from_order(&o).unwrap();
        let err = result.error.as_ref().unwrap();
        assert!(err.message.contains("FAILED"));
        assert_eq!(result.outcome(), Outcome::PaymentFailed);
    }

    #[test]
    fn test_canceled_message_contains_canceled() {
        for reason in [CancelReason::BuyerAbandoned, CancelReason::PaymentTimeout] {
            let mut o = order();
            o.mark_reserved().unwrap();
            o.mark_canceled(reason).unwrap();

            let result = OrderResult::from_order(&o).unwrap();
            let err = result.error.as_ref().unwrap();
            assert!(err.message.contains("CANCELED"));
            assert_eq!(result.outcome(), Outcome::Canceled);
        }
    }

    #[test]
    fn test_classification_is_exhaustive_and_exclusive() {
        // Every terminal state maps to exactly one outcome
        let mut completed = order();
        completed.mark_reserved().unwrap();
        completed.mark_completed().unwrap();

        let mut sold_out = order();
        sold_out.mark_sold_out().unwrap();

        let mut failed = order();
        failed.mark_reserved().unwrap();
        failed.mark_payment_failed("declined").unwrap();

        let mut canceled = order();
        canceled.mark_reserved().unwrap();
        canceled.mark_canceled(CancelReason::BuyerAbandoned).unwrap();

        let outcomes: Vec<Outcome> = [&completed, &sold_out, &failed, &canceled]
            .iter()
            .map(|o| Outcome::classify(&o.state).unwrap())
            .collect();

        assert_eq!(
            outcomes,
            vec![
                Outcome::Completed,
                Outcome::SoldOut,
                Outcome::PaymentFailed,
                Outcome::Canceled
            ]
        );
    }

    #[test]
    fn test_result_serialization_shape() {
        let mut o = order();
        o.mark_sold_out().unwrap();

        let result = OrderResult::from_order(&o).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_ENOUGH_PRODUCT");

        let mut done = order();
        done.mark_reserved().unwrap();
        done.mark_completed().unwrap();
        let json = serde_json::to_value(OrderResult::from_order(&done).unwrap()).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
    }
}
