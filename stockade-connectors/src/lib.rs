//! Stockade Collaborator Connectors
//!
//! Adapters for external collaborator APIs over HTTP.
//! Normalizes collaborator-specific wire types to engine port types.

#![warn(clippy::all)]

pub mod payment_http;

pub use payment_http::{HttpPaymentGateway, PaymentHttpError, SettleRequest, SettleResponse};
