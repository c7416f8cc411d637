//! Stockade Engine Layer
//!
//! Drives each order from `Pending` to a terminal state: reservation via the
//! arbiter, payment settlement via the payment port (bounded by a timeout),
//! commit/release of the held units, and outcome classification. The engine
//! is the bridge between the pure domain state machine and the impure
//! collaborators (payment, catalog, storage).

#![warn(clippy::all)]

pub mod admission;
pub mod error;
pub mod ports;
pub mod stub;

pub use admission::AdmissionService;
pub use error::{AdmissionError, AdmissionResult};
pub use ports::{CatalogPort, PaymentOutcome, PaymentPort, ProductRecord};
pub use stub::{StubCatalog, StubPayment, StubPaymentMode};
