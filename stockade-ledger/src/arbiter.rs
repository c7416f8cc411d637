//! Reservation arbiter: serializes admission attempts against the ledger.
//!
//! # Flow
//!
//! 1. `reserve` — atomically test-and-decrement the product counter
//! 2. On success, a `ReservationTicket` is issued
//! 3. The ticket is settled exactly once: `commit` (keep the decrement)
//!    or `release` (restore the units)
//!
//! The ticket is the only handle that can release a hold, and it is consumed
//! by value, so a double release does not typecheck. No fairness is promised
//! among concurrent contenders; the only guaranteed property is that the
//! count of admitted reservations never exceeds the available stock.

use std::sync::Arc;

use stockade_domain::{OrderId, ProductId, Quantity};

use crate::ledger::{LedgerResult, StockLedger};

// =============================================================================
// Reservation Ticket
// =============================================================================

/// Capability object binding a granted hold to one order.
///
/// Not `Clone`: exactly one settlement per ticket.
#[derive(Debug)]
pub struct ReservationTicket {
    /// Order the hold belongs to
    pub order_id: OrderId,
    /// Product the units are held against
    pub product_id: ProductId,
    /// Units held
    pub quantity: Quantity,
}

/// Decision returned by the arbiter for one reservation attempt.
#[derive(Debug)]
pub enum Admission {
    /// Units are held; settle the ticket exactly once
    Admitted(ReservationTicket),
    /// Insufficient stock; nothing is held
    SoldOut,
}

// =============================================================================
// Reservation Arbiter
// =============================================================================

/// Arbitrates concurrent reservation attempts per product.
///
/// Thin by design: the per-product serialization lives in the ledger's
/// compare-and-swap loop, and the arbiter adds the ticket protocol on top so
/// every admitted hold is settled exactly once.
pub struct ReservationArbiter {
    ledger: Arc<StockLedger>,
}

impl ReservationArbiter {
    /// Create an arbiter over the given ledger.
    pub fn new(ledger: Arc<StockLedger>) -> Self {
        Self { ledger }
    }

    /// The ledger this arbiter guards.
    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    /// Attempt to reserve `quantity` units for `order_id`.
    ///
    /// # Errors
    /// Propagates `LedgerError::UnknownProduct`; contention loss is the
    /// ordinary `Admission::SoldOut`, never an error.
    pub fn reserve(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> LedgerResult<Admission> {
        if self.ledger.try_reserve(product_id, quantity)? {
            tracing::debug!(%order_id, %product_id, %quantity, "Reservation admitted");
            Ok(Admission::Admitted(ReservationTicket { order_id, product_id, quantity }))
        } else {
            tracing::debug!(%order_id, %product_id, %quantity, "Reservation sold out");
            Ok(Admission::SoldOut)
        }
    }

    /// Keep the decrement: the order completed. Consumes the ticket.
    pub fn commit(&self, ticket: ReservationTicket) {
        tracing::debug!(
            order_id = %ticket.order_id,
            product_id = %ticket.product_id,
            quantity = %ticket.quantity,
            "Reservation committed"
        );
        // The units were already decremented at reserve time; committing
        // just retires the ticket.
    }

    /// Restore the held units: the order failed or was canceled.
    /// Consumes the ticket.
    ///
    /// # Errors
    /// Propagates `LedgerError::UnknownProduct` (a fault: the record existed
    /// when the ticket was issued).
    pub fn release(&self, ticket: ReservationTicket) -> LedgerResult<()> {
        tracing::debug!(
            order_id = %ticket.order_id,
            product_id = %ticket.product_id,
            quantity = %ticket.quantity,
            "Reservation released"
        );
        self.ledger.release(ticket.product_id, ticket.quantity)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn setup(initial: u32) -> (Arc<StockLedger>, ReservationArbiter) {
        let ledger = Arc::new(StockLedger::new());
        ledger.open_product(product(), initial).unwrap();
        let arbiter = ReservationArbiter::new(ledger.clone());
        (ledger, arbiter)
    }

    fn product() -> ProductId {
        ProductId::new(32).unwrap()
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_admit_then_commit_keeps_decrement() {
        let (ledger, arbiter) = setup(5);

        let admission = arbiter.reserve(Uuid::now_v7(), product(), qty(2)).unwrap();
        let ticket = match admission {
            Admission::Admitted(t) => t,
            Admission::SoldOut => panic!("Expected admission"),
        };

        arbiter.commit(ticket);
        assert_eq!(ledger.available(product()).unwrap(), 3);
    }

    #[test]
    fn test_admit_then_release_restores_units() {
        let (ledger, arbiter) = setup(5);

        let admission = arbiter.reserve(Uuid::now_v7(), product(), qty(2)).unwrap();
        if let Admission::Admitted(ticket) = admission {
            arbiter.release(ticket).unwrap();
        }
        assert_eq!(ledger.available(product()).unwrap(), 5);
    }

    #[test]
    fn test_sold_out_holds_nothing() {
        let (ledger, arbiter) = setup(1);

        let admission = arbiter.reserve(Uuid::now_v7(), product(), qty(2)).unwrap();
        assert!(matches!(admission, Admission::SoldOut));
        assert_eq!(ledger.available(product()).unwrap(), 1);
    }

    #[test]
    fn test_unknown_product_propagates() {
        let (_ledger, arbiter) = setup(1);
        let missing = ProductId::new(99).unwrap();

        let result = arbiter.reserve(Uuid::now_v7(), missing, qty(1));
        assert!(matches!(result, Err(LedgerError::UnknownProduct(_))));
    }

    #[test]
    fn test_released_units_immediately_reservable() {
        let (_ledger, arbiter) = setup(1);

        let first = arbiter.reserve(Uuid::now_v7(), product(), qty(1)).unwrap();
        let ticket = match first {
            Admission::Admitted(t) => t,
            Admission::SoldOut => panic!("Expected admission"),
        };

        // Pool exhausted while the ticket is held
        assert!(matches!(
            arbiter.reserve(Uuid::now_v7(), product(), qty(1)).unwrap(),
            Admission::SoldOut
        ));

        arbiter.release(ticket).unwrap();

        // Freed units are visible to the next contender
        assert!(matches!(
            arbiter.reserve(Uuid::now_v7(), product(), qty(1)).unwrap(),
            Admission::Admitted(_)
        ));
    }

    #[test]
    fn test_concurrent_admissions_match_initial_stock() {
        let (ledger, arbiter) = setup(10);
        let arbiter = Arc::new(arbiter);
        let admitted = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let arbiter = arbiter.clone();
            let admitted = admitted.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..10 {
                    let admission =
                        arbiter.reserve(Uuid::now_v7(), product(), qty(1)).unwrap();
                    if let Admission::Admitted(ticket) = admission {
                        admitted.fetch_add(1, Ordering::SeqCst);
                        arbiter.commit(ticket);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 10);
        assert_eq!(ledger.available(product()).unwrap(), 0);
    }
}
