//! Stock ledger: authoritative counter of reservable units per product.
//!
//! Each product gets its own atomic counter, so unrelated products never
//! contend. `try_reserve` is a compare-and-swap loop over the counter: the
//! critical section is in-memory arithmetic only, with no I/O.
//!
//! Absence of stock is a normal negative result, not an error. The only
//! error this module produces is a lookup miss for a product that was never
//! opened, which is a caller fault.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use stockade_domain::{ProductId, Quantity};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Errors from ledger operations.
///
/// Insufficient stock is deliberately NOT represented here; `try_reserve`
/// reports it as `Ok(false)` so callers can distinguish contention loss from
/// a system fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The product has no stock record (was never opened)
    #[error("No stock record for product {0}")]
    UnknownProduct(ProductId),

    /// The product already has a stock record
    #[error("Stock record already exists for product {0}")]
    ProductExists(ProductId),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Stock Ledger
// =============================================================================

/// One product's counter. Shared out as an `Arc` so reserve/release never
/// hold the map lock while mutating the counter.
struct StockSlot {
    available: AtomicI64,
}

/// Authoritative, thread-safe stock counters keyed by product.
///
/// The map lock guards only slot lookup and insertion; counter updates go
/// through per-product atomics. `available` decreases only via a successful
/// `try_reserve` and increases only via `release` or `restock`.
pub struct StockLedger {
    slots: RwLock<HashMap<ProductId, Arc<StockSlot>>>,
}

impl StockLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self { slots: RwLock::new(HashMap::new()) }
    }

    /// Open a stock record for a product with its initial unit count.
    ///
    /// # Errors
    /// Returns `LedgerError::ProductExists` if the product is already open.
    pub fn open_product(&self, product_id: ProductId, initial: u32) -> LedgerResult<()> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        if slots.contains_key(&product_id) {
            return Err(LedgerError::ProductExists(product_id));
        }
        slots.insert(
            product_id,
            Arc::new(StockSlot { available: AtomicI64::new(i64::from(initial)) }),
        );
        tracing::info!(%product_id, initial, "Stock record opened");
        Ok(())
    }

    /// True if the product has a stock record.
    pub fn has_product(&self, product_id: ProductId) -> bool {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.contains_key(&product_id)
    }

    /// Atomically reserve `quantity` units if available.
    ///
    /// Returns `Ok(true)` and decrements on success; `Ok(false)` leaving the
    /// counter untouched when stock is insufficient. No partial reservation.
    ///
    /// # Errors
    /// Returns `LedgerError::UnknownProduct` if the product was never opened.
    pub fn try_reserve(&self, product_id: ProductId, quantity: Quantity) -> LedgerResult<bool> {
        let slot = self.slot(product_id)?;
        let want = quantity.as_i64();

        let mut current = slot.available.load(Ordering::Acquire);
        loop {
            if current < want {
                return Ok(false);
            }
            match slot.available.compare_exchange_weak(
                current,
                current - want,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    tracing::debug!(
                        %product_id,
                        reserved = want,
                        remaining = current - want,
                        "Stock reserved"
                    );
                    return Ok(true);
                }
                // Lost the race; retry against the observed value
                Err(observed) => current = observed,
            }
        }
    }

    /// Atomically return `quantity` units to the pool.
    ///
    /// Double-release protection is the caller's responsibility (the arbiter
    /// consumes tickets by value); the ledger applies every call it receives.
    ///
    /// # Errors
    /// Returns `LedgerError::UnknownProduct` if the product was never opened.
    pub fn release(&self, product_id: ProductId, quantity: Quantity) -> LedgerResult<()> {
        let slot = self.slot(product_id)?;
        let returned = slot.available.fetch_add(quantity.as_i64(), Ordering::AcqRel);
        tracing::debug!(
            %product_id,
            released = quantity.as_i64(),
            remaining = returned + quantity.as_i64(),
            "Stock released"
        );
        Ok(())
    }

    /// Explicitly add stock (an admin restock, not a reservation release).
    ///
    /// # Errors
    /// Returns `LedgerError::UnknownProduct` if the product was never opened.
    pub fn restock(&self, product_id: ProductId, quantity: Quantity) -> LedgerResult<i64> {
        let slot = self.slot(product_id)?;
        let before = slot.available.fetch_add(quantity.as_i64(), Ordering::AcqRel);
        let after = before + quantity.as_i64();
        tracing::info!(%product_id, added = quantity.as_i64(), available = after, "Restocked");
        Ok(after)
    }

    /// Current available unit count.
    ///
    /// # Errors
    /// Returns `LedgerError::UnknownProduct` if the product was never opened.
    pub fn available(&self, product_id: ProductId) -> LedgerResult<i64> {
        let slot = self.slot(product_id)?;
        Ok(slot.available.load(Ordering::Acquire))
    }

    fn slot(&self, product_id: ProductId) -> LedgerResult<Arc<StockSlot>> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots
            .get(&product_id)
            .cloned()
            .ok_or(LedgerError::UnknownProduct(product_id))
    }
}

impl Default for StockLedger {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
