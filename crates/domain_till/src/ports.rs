//! Entry store contract
//!
//! The ledger's only shared mutable resource is an append-only entry store.
//! Mutations go through [`EntryStore::append`], which verifies a precondition
//! and inserts the entry as one atomic unit - equivalent to a single
//! serializable transaction. Without that, two concurrent opens could both
//! observe "closed", or two withdrawals could jointly overdraw the drawer.
//!
//! Adapters must treat serializable (or equivalent optimistic-retry)
//! isolation as a requirement of this contract, not an implementation detail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use core_kernel::{Cash, DrawerId};

use crate::entry::LedgerEntry;

/// Precondition checked atomically with an [`EntryStore::append`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendPrecondition {
    /// The drawer must be closed (no `Start` without a later `Close`).
    DrawerClosed,
    /// The drawer must be open.
    DrawerOpen,
    /// The drawer must be open and its balance at least this amount.
    OpenWithBalanceAtLeast(Cash),
}

/// Why an [`AppendPrecondition`] did not hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionFailure {
    #[error("drawer is already open")]
    DrawerAlreadyOpen,

    #[error("drawer is not open")]
    DrawerNotOpen,

    #[error("insufficient balance: {available} available")]
    InsufficientBalance { available: Cash },
}

/// Errors surfaced by entry store adapters
///
/// Infrastructure failures are opaque to the core beyond "the operation did
/// not complete"; the core propagates them unchanged and never retries
/// (retrying a financial mutation without idempotency keys risks
/// double-insertion - retry policy belongs to the caller).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The append's precondition did not hold inside the transaction.
    #[error("precondition failed: {0}")]
    PreconditionFailed(PreconditionFailure),

    /// The store could not be reached.
    #[error("store connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out.
    #[error("store timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// A concurrent transaction conflicted (e.g. serialization failure).
    #[error("conflicting concurrent update: {0}")]
    Conflict(String),

    /// Anything else the adapter could not classify.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        StoreError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        StoreError::Internal(message.into())
    }

    /// True for failures that may succeed if the caller retries.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Connection { .. } | StoreError::Timeout { .. } | StoreError::Conflict(_)
        )
    }
}

/// Append-only store of ledger entries, queryable by drawer and time range
///
/// `drawer` of `None` selects the single default drawer throughout.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Atomically verifies `precondition` and appends `entry`.
    ///
    /// Returns the entry with its store-assigned id. The precondition check
    /// and the insertion must never be observable as two separate steps by a
    /// concurrent caller.
    ///
    /// # Errors
    ///
    /// [`StoreError::PreconditionFailed`] when the precondition does not
    /// hold; transient variants for infrastructure failures.
    async fn append(
        &self,
        entry: LedgerEntry,
        precondition: AppendPrecondition,
    ) -> Result<LedgerEntry, StoreError>;

    /// All entries for the drawer with `start <= timestamp <= end`,
    /// ascending by timestamp.
    async fn entries_in_range(
        &self,
        drawer: Option<DrawerId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Sum of all entry amounts for the drawer.
    async fn current_balance(&self, drawer: Option<DrawerId>) -> Result<Cash, StoreError>;

    /// Derived open state: the most recent `Start` entry has no `Close`
    /// entry with a strictly later timestamp.
    async fn is_drawer_open(&self, drawer: Option<DrawerId>) -> Result<bool, StoreError>;

    /// Most recent `Start` entry for the drawer, if any.
    async fn last_start_entry(
        &self,
        drawer: Option<DrawerId>,
    ) -> Result<Option<LedgerEntry>, StoreError>;

    /// Most recent `Start` entry strictly before `cutoff`, if any.
    async fn last_start_before(
        &self,
        drawer: Option<DrawerId>,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<LedgerEntry>, StoreError>;
}
