//! Till domain errors
//!
//! The taxonomy separates validation errors (caller-correctable input),
//! state errors (operation illegal in the drawer's current state), domain
//! rules (insufficient funds, invalid period), and store failures, so the
//! presentation layer can phrase each kind differently without parsing
//! message strings.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{Cash, TemporalError};

use crate::ports::StoreError;

/// Errors produced by the ledger and reconciliation engines
#[derive(Debug, Error)]
pub enum TillError {
    /// `open_drawer` on a drawer that is already open.
    #[error("the drawer is already open")]
    AlreadyOpen,

    /// Mutation on a drawer that is not open.
    #[error("the drawer is not open")]
    NotOpen,

    /// An amount outside the operation's accepted range.
    #[error("invalid {field}: {amount}")]
    InvalidAmount { field: &'static str, amount: Decimal },

    /// Manual `In`/`Out` entries require a reason.
    #[error("a description is required to {operation}")]
    MissingDescription { operation: &'static str },

    /// Withdrawal larger than the drawer balance.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Cash, available: Cash },

    /// Reconciliation window with `end < start`.
    #[error(transparent)]
    InvalidPeriod(#[from] TemporalError),

    /// The entry store did not complete the operation.
    #[error("entry store error: {0}")]
    Store(#[from] StoreError),
}

impl TillError {
    /// Caller-correctable input problems.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TillError::InvalidAmount { .. } | TillError::MissingDescription { .. }
        )
    }

    /// Operation was legal input but illegal in the drawer's current state.
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, TillError::AlreadyOpen | TillError::NotOpen)
    }

    /// True when retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, TillError::Store(err) if err.is_transient())
    }
}
