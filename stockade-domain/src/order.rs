//! Order entity and lifecycle state machine.
//!
//! An order is created in `Pending` the instant a request is accepted, and
//! moves to exactly one terminal state:
//!
//! ```text
//! Pending --reserve ok--> Reserved --payment ok--> Completed
//! Pending --no stock----> SoldOut                          [terminal]
//! Reserved --payment declined--> PaymentFailed             [terminal, stock released]
//! Reserved --abandoned / timeout--> Canceled               [terminal, stock released]
//! ```
//!
//! Terminal states are final: an order never re-enters `Pending` or
//! `Reserved`. A retry is a brand-new order with its own reservation.

use crate::value_objects::{DomainError, ProductId, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for an Order
pub type OrderId = Uuid;

/// Opaque buyer identity, carried through from the caller's auth layer
pub type BuyerId = i64;

// =============================================================================
// Order State
// =============================================================================

/// Lifecycle state of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    /// Request accepted, no reservation attempted yet
    Pending,

    /// Stock units are held against the ledger; payment is in flight
    Reserved {
        /// When the reservation was granted
        reserved_at: DateTime<Utc>,
    },

    /// Payment settled; the reserved units are permanently decremented
    Completed,

    /// Payment was declined; the reservation has been released
    PaymentFailed {
        /// Reason reported by the payment collaborator
        reason: String,
    },

    /// Buyer abandoned during payment (explicitly or by timeout);
    /// the reservation has been released
    Canceled {
        /// Why the order was canceled
        reason: CancelReason,
    },

    /// The reservation attempt found insufficient stock; nothing was held
    SoldOut,
}

/// Why a reserved order was canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// Buyer walked away during the payment step
    BuyerAbandoned,
    /// The payment collaborator did not resolve within the timeout budget
    PaymentTimeout,
}

impl OrderState {
    /// Short state name for logging and projections.
    pub fn name(&self) -> &'static str {
        match self {
            OrderState::Pending => "Pending",
            OrderState::Reserved { .. } => "Reserved",
            OrderState::Completed => "Completed",
            OrderState::PaymentFailed { .. } => "PaymentFailed",
            OrderState::Canceled { .. } => "Canceled",
            OrderState::SoldOut => "SoldOut",
        }
    }

    /// True once no further transition can occur.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderState::Pending | OrderState::Reserved { .. })
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order races for stock on behalf of one buyer.
///
/// The order holds a *claim* on stock units, never ownership: the ledger owns
/// the counter, and the claim is revocable only through the arbiter. Request
/// parameters are immutable after creation; only `state`, `reserved_units`
/// and the audit timestamps change, and only via the transition methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Assigned at creation, immutable
    pub id: OrderId,
    /// Buyer placing the order
    pub buyer_id: BuyerId,
    /// Product being ordered
    pub product_id: ProductId,
    /// Requested unit count
    pub quantity: Quantity,
    /// Current lifecycle state
    pub state: OrderState,
    /// Units currently held against the ledger; 0 once released or never held
    pub reserved_units: u32,
    /// When the request was accepted
    pub created_at: DateTime<Utc>,
    /// When a terminal state was reached
    pub terminated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a new pending order.
    pub fn new(buyer_id: BuyerId, product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id: Uuid::now_v7(),
            buyer_id,
            product_id,
            quantity,
            state: OrderState::Pending,
            reserved_units: 0,
            created_at: Utc::now(),
            terminated_at: None,
        }
    }

    /// True once no further transition can occur.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Pending → Reserved, after the arbiter granted a ticket.
    pub fn mark_reserved(&mut self) -> Result<(), DomainError> {
        match self.state {
            OrderState::Pending => {
                self.state = OrderState::Reserved { reserved_at: Utc::now() };
                self.reserved_units = self.quantity.as_u32();
                Ok(())
            }
            _ => Err(self.bad_transition("Reserved")),
        }
    }

    /// Pending → SoldOut. No reservation was ever held, so nothing to release.
    pub fn mark_sold_out(&mut self) -> Result<(), DomainError> {
        match self.state {
            OrderState::Pending => {
                self.state = OrderState::SoldOut;
                self.terminate();
                Ok(())
            }
            _ => Err(self.bad_transition("SoldOut")),
        }
    }

    /// Reserved → Completed. The held units become a permanent decrement.
    pub fn mark_completed(&mut self) -> Result<(), DomainError> {
        match self.state {
            OrderState::Reserved { .. } => {
                self.state = OrderState::Completed;
                self.terminate();
                Ok(())
            }
            _ => Err(self.bad_transition("Completed")),
        }
    }

    /// Reserved → PaymentFailed. The caller must have released the ticket.
    pub fn mark_payment_failed(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        match self.state {
            OrderState::Reserved { .. } => {
                self.state = OrderState::PaymentFailed { reason: reason.into() };
                self.reserved_units = 0;
                self.terminate();
                Ok(())
            }
            _ => Err(self.bad_transition("PaymentFailed")),
        }
    }

    /// Reserved → Canceled. The caller must have released the ticket.
    pub fn mark_canceled(&mut self, reason: CancelReason) -> Result<(), DomainError> {
        match self.state {
            OrderState::Reserved { .. } => {
                self.state = OrderState::Canceled { reason };
                self.reserved_units = 0;
                self.terminate();
                Ok(())
            }
            _ => Err(self.bad_transition("Canceled")),
        }
    }

    /// Drop the claim on held units without leaving `Reserved`.
    ///
    /// Used when the held units go back to the ledger for a reason that has
    /// no business classification (a collaborator fault): the order keeps
    /// its non-terminal state, but the archive must not claim a hold the
    /// ledger no longer carries.
    pub fn release_claim(&mut self) {
        self.reserved_units = 0;
    }

    fn terminate(&mut self) {
        self.terminated_at = Some(Utc::now());
    }

    fn bad_transition(&self, target: &str) -> DomainError {
        DomainError::InvalidTransition(format!(
            "Order {} cannot move {} -> {}",
            self.id,
            self.state.name(),
            target
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
