//! Admission service: the boundary operation `place_order`.
//!
//! Orchestrates one order from request receipt to a single terminal
//! classification:
//!
//! ```text
//! Catalog lookup → Arbiter (reserve) → Payment (bounded by timeout)
//!        → commit/release → Outcome Classifier → OrderResult
//! ```
//!
//! The call returns exactly once with exactly one classification; callers
//! never observe `Pending` or `Reserved`. Every path that exits `Reserved`
//! without completing releases the held units before the order is archived,
//! so released stock is immediately visible to other contenders.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use stockade_domain::{
    BuyerId, CancelReason, Order, OrderResult, ProductId, Quantity,
};
use stockade_ledger::{Admission, ReservationArbiter, ReservationTicket};
use stockade_store::OrderRepository;

use crate::error::{AdmissionError, AdmissionResult};
use crate::ports::{CatalogPort, PaymentOutcome, PaymentPort, ProductRecord};

// =============================================================================
// Admission Service
// =============================================================================

/// Default budget for the payment step before the buyer is considered gone.
pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(3);

/// Admits orders against the stock ledger and settles their outcome.
///
/// The reservation critical section is in-memory arithmetic inside the
/// arbiter; everything else here (catalog, payment, archival) runs without
/// shared mutable state and fully in parallel across orders.
pub struct AdmissionService<P: PaymentPort, C: CatalogPort, S: OrderRepository> {
    arbiter: Arc<ReservationArbiter>,
    payment: Arc<P>,
    catalog: Arc<C>,
    store: Arc<S>,
    payment_timeout: Duration,
}

impl<P: PaymentPort, C: CatalogPort, S: OrderRepository> AdmissionService<P, C, S> {
    /// Create a new admission service.
    pub fn new(
        arbiter: Arc<ReservationArbiter>,
        payment: Arc<P>,
        catalog: Arc<C>,
        store: Arc<S>,
    ) -> Self {
        Self {
            arbiter,
            payment,
            catalog,
            store,
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
        }
    }

    /// Override the payment timeout budget.
    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }

    /// The arbiter this service admits through.
    pub fn arbiter(&self) -> &ReservationArbiter {
        &self.arbiter
    }

    /// The order archive.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Place an order: reserve stock, settle payment, classify the outcome.
    ///
    /// # Errors
    ///
    /// Only system faults (unknown product, collaborator outage, corrupted
    /// ledger). Sold-out, declined and abandoned orders are `Ok` results
    /// with `success: false`.
    pub async fn place_order(
        &self,
        product_id: ProductId,
        quantity: Quantity,
        buyer_id: BuyerId,
    ) -> AdmissionResult<OrderResult> {
        // 1. Resolve the product; a miss is a fault, never sold-out
        let record = self.resolve_product(product_id).await?;

        // 2. Accept the request
        let mut order = Order::new(buyer_id, product_id, quantity);
        info!(
            order_id = %order.id,
            %product_id,
            %quantity,
            buyer_id,
            "Order accepted"
        );
        self.store.save(&order).await?;

        // 3. Race for stock
        let ticket = match self.arbiter.reserve(order.id, product_id, quantity)? {
            Admission::Admitted(ticket) => ticket,
            Admission::SoldOut => {
                order.mark_sold_out()?;
                self.store.save(&order).await?;
                info!(order_id = %order.id, %product_id, "Order sold out");
                return Ok(OrderResult::from_order(&order)?);
            }
        };
        order.mark_reserved()?;
        self.store.save(&order).await?;

        // 4. Settle payment within the budget
        let amount = record.price.amount_for(quantity);
        debug!(order_id = %order.id, %amount, "Settling payment");

        let settled = tokio::time::timeout(
            self.payment_timeout,
            self.payment.settle(order.id, buyer_id, amount),
        )
        .await;

        // 5. Drive the machine to its terminal state
        match settled {
            Ok(Ok(PaymentOutcome::Approved)) => {
                self.arbiter.commit(ticket);
                order.mark_completed()?;
                info!(order_id = %order.id, %amount, "Order completed");
            }
            Ok(Ok(PaymentOutcome::Declined { reason })) => {
                self.arbiter.release(ticket)?;
                order.mark_payment_failed(&reason)?;
                info!(order_id = %order.id, reason, "Payment declined");
            }
            Ok(Ok(PaymentOutcome::Abandoned)) => {
                self.arbiter.release(ticket)?;
                order.mark_canceled(CancelReason::BuyerAbandoned)?;
                info!(order_id = %order.id, "Buyer abandoned during payment");
            }
            Ok(Err(fault)) => {
                // Collaborator fault: free the units first, then propagate.
                // The fault is never reclassified as a business outcome.
                self.release_on_fault(ticket);
                order.release_claim();
                self.store.save(&order).await?;
                warn!(order_id = %order.id, error = %fault, "Payment collaborator fault");
                return Err(fault);
            }
            Err(_elapsed) => {
                self.arbiter.release(ticket)?;
                order.mark_canceled(CancelReason::PaymentTimeout)?;
                info!(
                    order_id = %order.id,
                    timeout_ms = self.payment_timeout.as_millis() as u64,
                    "Payment timed out; order canceled"
                );
            }
        }

        // 6. Archive and report
        self.store.save(&order).await?;
        Ok(OrderResult::from_order(&order)?)
    }

    async fn resolve_product(&self, product_id: ProductId) -> AdmissionResult<ProductRecord> {
        let record = self
            .catalog
            .resolve(product_id)
            .await?
            .ok_or(AdmissionError::UnknownProduct(product_id))?;

        if !record.on_sale {
            return Err(AdmissionError::ProductNotOnSale(product_id));
        }
        Ok(record)
    }

    fn release_on_fault(&self, ticket: ReservationTicket) {
        let order_id = ticket.order_id;
        if let Err(release_err) = self.arbiter.release(ticket) {
            // The stock record existed when the ticket was issued; losing it
            // mid-flight means the ledger itself is corrupted.
            warn!(%order_id, error = %release_err, "Release after fault failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
