//! Stockade Ledger Layer
//!
//! The authoritative stock counters and the arbiter that serializes
//! concurrent reservation attempts against them. This layer is the single
//! point that prevents overselling: all mutation of available quantity goes
//! through here, and the counter never goes negative at any observable point.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arbiter;
pub mod ledger;

pub use arbiter::{Admission, ReservationArbiter, ReservationTicket};
pub use ledger::{LedgerError, LedgerResult, StockLedger};
