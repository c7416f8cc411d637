//! Value Objects for the Stockade Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation and state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Quantity must be at least 1
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Price must be positive
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Product identifier must be positive
    #[error("Invalid product id: {0}")]
    InvalidProductId(String),

    /// Invalid order state transition
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

// =============================================================================
// ProductId
// =============================================================================

/// Identifier of a product stock record.
///
/// # Invariants
/// - Must be > 0 (mirrors the catalog's numeric product-info keys)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Create a new ProductId with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidProductId` if value <= 0
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidProductId(format!(
                "Product id must be positive, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the underlying numeric value
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Quantity of stock units requested or held.
///
/// # Invariants
/// - Must be >= 1 (the minimum order size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Create a new Quantity with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidQuantity` if value is 0
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::InvalidQuantity(
                "Quantity must be at least 1".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Get the underlying unit count
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Unit count widened for ledger arithmetic
    pub fn as_i64(&self) -> i64 {
        i64::from(self.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Price
// =============================================================================

/// Unit price of a product.
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrice` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidPrice("Price must be positive".to_string()));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Total amount for `quantity` units at this price
    pub fn amount_for(&self, quantity: Quantity) -> Decimal {
        self.0 * Decimal::from(quantity.as_u32())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_id_valid() {
        let id = ProductId::new(32).unwrap();
        assert_eq!(id.as_i64(), 32);
        assert_eq!(id.to_string(), "32");
    }

    #[test]
    fn test_product_id_rejects_non_positive() {
        assert!(ProductId::new(0).is_err());
        assert!(ProductId::new(-5).is_err());
    }

    #[test]
    fn test_quantity_valid() {
        let qty = Quantity::new(3).unwrap();
        assert_eq!(qty.as_u32(), 3);
        assert_eq!(qty.as_i64(), 3);
    }

    #[test]
    fn test_quantity_rejects_zero() {
        let err = Quantity::new(0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));
    }

    #[test]
    fn test_price_valid() {
        let price = Price::new(dec!(19.90)).unwrap();
        assert_eq!(price.as_decimal(), dec!(19.90));
    }

    #[test]
    fn test_price_rejects_non_positive() {
        assert!(Price::new(dec!(0)).is_err());
        assert!(Price::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_amount_for_quantity() {
        let price = Price::new(dec!(10)).unwrap();
        let qty = Quantity::new(3).unwrap();
        assert_eq!(price.amount_for(qty), dec!(30));
    }

    #[test]
    fn test_serde_transparent() {
        let id: ProductId = serde_json::from_str("32").unwrap();
        assert_eq!(id, ProductId::new(32).unwrap());

        let qty: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(qty, Quantity::new(2).unwrap());
    }
}
