//! Stockade Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains the order entity, its lifecycle state machine, validated value
//! objects, and the outcome classifier that maps terminal states to the
//! externally reported result.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod order;
pub mod outcome;
pub mod value_objects;

// Re-export commonly used types
pub use order::{BuyerId, CancelReason, Order, OrderId, OrderState};
pub use outcome::{Outcome, OutcomeError, OrderResult};
pub use value_objects::{DomainError, Price, ProductId, Quantity};
