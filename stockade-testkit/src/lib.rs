//! Test helpers for stockade admission tests.
//!
//! Provides seeded admission services and a concurrent demand runner so the
//! daemon and engine tests exercise the same scenarios the same way.

mod helpers;

pub use helpers::{
    run_demand, seeded_service, seeded_service_with, DemandReport, SeededService, TEST_PRODUCT,
};
