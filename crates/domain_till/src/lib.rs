//! Till domain - cash-drawer ledger and end-of-shift reconciliation
//!
//! The financial core of the point-of-sale back office. A drawer's history
//! is an append-only stream of immutable [`entry::LedgerEntry`] values;
//! balance and open/closed state are derived from that stream, never stored.
//! The [`ledger::LedgerService`] owns the entry lifecycle and state machine;
//! the [`reconciliation::ReconciliationService`] turns the entry stream plus
//! a sales feed into an expected-vs-counted cash report (the "corte").

pub mod adapters;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod ports;
pub mod reconciliation;
pub mod sales;
pub mod summary;

pub use entry::{EntryKind, LedgerEntry};
pub use error::TillError;
pub use ledger::LedgerService;
pub use ports::{AppendPrecondition, EntryStore, PreconditionFailure, StoreError};
pub use reconciliation::{
    ReconciliationReport, ReconciliationService, CASH_PAYMENT_METHOD, UNSPECIFIED_PAYMENT_METHOD,
};
pub use sales::{SaleRecord, SalesSource};
pub use summary::DrawerSummary;
