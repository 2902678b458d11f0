//! Shared test utilities for the till workspace
//!
//! Builders and seeded fixtures over the in-memory adapters, so integration
//! tests describe scenarios instead of hand-assembling entry streams.

pub mod builders;
pub mod fixtures;
pub mod logging;

pub use builders::{sale, seeded_store, SaleBuilder};
pub use fixtures::{reconciliation_scenario, ReconciliationScenario};
pub use logging::init_logging;
