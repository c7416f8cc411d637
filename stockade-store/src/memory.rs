//! In-memory store implementation
//!
//! The default order archive: thread-safe using RwLock for concurrent
//! access. Also keeps a running tally of terminal outcomes, exposed as a
//! read-only projection for observability — never used for admission
//! decisions.

use crate::error::StoreError;
use crate::repository::OrderRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use stockade_domain::{BuyerId, Order, OrderId, Outcome, ProductId};

/// In-memory order archive.
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    tallies: RwLock<HashMap<Outcome, u64>>,
}

impl MemoryOrderStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            tallies: RwLock::new(HashMap::new()),
        }
    }

    /// Number of archived orders
    pub fn order_count(&self) -> usize {
        self.orders.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// How many orders terminated with the given outcome
    pub fn tally(&self, outcome: Outcome) -> u64 {
        let tallies = self.tallies.read().unwrap_or_else(|e| e.into_inner());
        tallies.get(&outcome).copied().unwrap_or(0)
    }

    /// Clear all data (useful for test setup)
    pub fn clear(&self) {
        self.orders.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.tallies.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderStore {
    async fn save(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().unwrap_or_else(|e| e.into_inner());

        // Tally the outcome exactly once: on the write that first archives
        // a terminal state for this order.
        if order.is_terminal() {
            let already_terminal = orders
                .get(&order.id)
                .map(|existing| existing.is_terminal())
                .unwrap_or(false);
            if !already_terminal {
                if let Ok(outcome) = Outcome::classify(&order.state) {
                    let mut tallies =
                        self.tallies.write().unwrap_or_else(|e| e.into_inner());
                    *tallies.entry(outcome).or_insert(0) += 1;
                }
            }
        }

        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().unwrap_or_else(|e| e.into_inner());
        Ok(orders.get(&id).cloned())
    }

    async fn find_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().unwrap_or_else(|e| e.into_inner());
        Ok(orders.values().filter(|o| o.buyer_id == buyer_id).cloned().collect())
    }

    async fn find_by_product(&self, product_id: ProductId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().unwrap_or_else(|e| e.into_inner());
        Ok(orders.values().filter(|o| o.product_id == product_id).cloned().collect())
    }

    async fn find_open(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().unwrap_or_else(|e| e.into_inner());
        Ok(orders.values().filter(|o| !o.is_terminal()).cloned().collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
