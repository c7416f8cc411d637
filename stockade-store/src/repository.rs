//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the domain.
//! Implementations can be in-memory or a database-backed store; the
//! admission core only depends on the trait.

use crate::error::StoreError;
use async_trait::async_trait;
use stockade_domain::{BuyerId, Order, OrderId, ProductId};

/// Repository for Order entities
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Save an order (insert or update)
    async fn save(&self, order: &Order) -> Result<(), StoreError>;

    /// Find an order by ID
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Find all orders placed by a buyer
    async fn find_by_buyer(&self, buyer_id: BuyerId) -> Result<Vec<Order>, StoreError>;

    /// Find all orders for a product
    async fn find_by_product(&self, product_id: ProductId) -> Result<Vec<Order>, StoreError>;

    /// Find orders that have not yet reached a terminal state
    async fn find_open(&self) -> Result<Vec<Order>, StoreError>;
}
