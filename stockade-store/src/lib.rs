//! Stockade Storage Layer
//!
//! Repository trait for the order archive plus the in-memory implementation.
//! Orders are written here once on creation and once per state change; after
//! a terminal state is reported to the caller the record is an audit
//! artifact, never resurrected.

#![warn(clippy::all)]

pub mod error;
pub mod memory;
pub mod repository;

pub use error::StoreError;
pub use memory::MemoryOrderStore;
pub use repository::OrderRepository;
