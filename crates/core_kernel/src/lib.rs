//! Core Kernel - foundational types for the till back office
//!
//! This crate provides the building blocks shared by the domain and
//! infrastructure layers:
//! - Cash amounts with exact 2-digit round-half-up arithmetic
//! - Reporting periods and business-day boundary helpers
//! - Strongly-typed identifiers

pub mod identifiers;
pub mod money;
pub mod temporal;

pub use identifiers::{ActorId, DrawerId, EntryId, SaleId};
pub use money::{round_cash, Cash, CASH_SCALE};
pub use temporal::{ReportPeriod, TemporalError, Timezone};
