//! Ledger engine - the drawer's entry lifecycle
//!
//! Owns validation and the open/closed state machine. Preconditions are not
//! checked here and then acted on later: every mutation hands its
//! precondition to [`EntryStore::append`], which verifies and inserts inside
//! one transaction. This service only validates amounts, builds the entry,
//! and translates precondition failures into the domain error taxonomy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use core_kernel::{ActorId, Cash, DrawerId, Timezone};

use crate::entry::{
    EntryKind, LedgerEntry, DEFAULT_CLOSE_DESCRIPTION, DEFAULT_OPEN_DESCRIPTION,
    DEFAULT_RETURN_DESCRIPTION, DEFAULT_SALE_DESCRIPTION,
};
use crate::error::TillError;
use crate::ports::{AppendPrecondition, EntryStore, PreconditionFailure, StoreError};
use crate::summary::DrawerSummary;

/// Service owning the cash-drawer entry lifecycle
///
/// Holds no mutable state of its own; drawer state is derived from the entry
/// store on every call.
pub struct LedgerService {
    store: Arc<dyn EntryStore>,
    timezone: Timezone,
}

impl LedgerService {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self {
            store,
            timezone: Timezone::default(),
        }
    }

    /// Sets the till's local timezone, used for calendar-day summaries.
    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Opens the drawer with an initial float.
    ///
    /// # Errors
    ///
    /// `AlreadyOpen` if the drawer is open; `InvalidAmount` if
    /// `initial_amount` is negative.
    pub async fn open_drawer(
        &self,
        initial_amount: Decimal,
        description: Option<String>,
        actor: ActorId,
        drawer: Option<DrawerId>,
    ) -> Result<LedgerEntry, TillError> {
        if initial_amount < Decimal::ZERO {
            return Err(TillError::InvalidAmount {
                field: "initial_amount",
                amount: initial_amount,
            });
        }

        let description = description.unwrap_or_else(|| DEFAULT_OPEN_DESCRIPTION.to_string());
        let entry = target(LedgerEntry::start(initial_amount, description, actor), drawer);

        let stored = self
            .store
            .append(entry, AppendPrecondition::DrawerClosed)
            .await
            .map_err(|err| map_append_failure(err, None))?;

        info!(drawer = ?drawer, amount = %stored.amount, "drawer opened");
        Ok(stored)
    }

    /// Records a manual cash deposit.
    ///
    /// # Errors
    ///
    /// `NotOpen` if the drawer is closed; `InvalidAmount` unless
    /// `amount > 0`; `MissingDescription` if no reason is given.
    pub async fn add_cash(
        &self,
        amount: Decimal,
        description: impl Into<String>,
        actor: ActorId,
        drawer: Option<DrawerId>,
    ) -> Result<LedgerEntry, TillError> {
        let description = require_description(description, "deposit cash")?;
        require_positive(amount, "amount")?;

        let entry = target(LedgerEntry::cash_in(amount, description, actor), drawer);
        let stored = self
            .store
            .append(entry, AppendPrecondition::DrawerOpen)
            .await
            .map_err(|err| map_append_failure(err, None))?;

        info!(drawer = ?drawer, amount = %stored.amount, "cash added");
        Ok(stored)
    }

    /// Records a manual cash withdrawal. The stored entry carries the
    /// negated, quantized amount.
    ///
    /// # Errors
    ///
    /// `NotOpen`; `InvalidAmount` unless `amount > 0`; `MissingDescription`;
    /// `InsufficientFunds` (with the available balance) if the withdrawal
    /// would overdraw the drawer.
    pub async fn remove_cash(
        &self,
        amount: Decimal,
        description: impl Into<String>,
        actor: ActorId,
        drawer: Option<DrawerId>,
    ) -> Result<LedgerEntry, TillError> {
        let description = require_description(description, "withdraw cash")?;
        require_positive(amount, "amount")?;

        let requested = Cash::new(amount);
        let entry = target(LedgerEntry::cash_out(amount, description, actor), drawer);

        let result = self
            .store
            .append(entry, AppendPrecondition::OpenWithBalanceAtLeast(requested))
            .await
            .map_err(|err| map_append_failure(err, Some(requested)));

        match &result {
            Ok(stored) => info!(drawer = ?drawer, amount = %stored.amount, "cash removed"),
            Err(TillError::InsufficientFunds { available, .. }) => {
                warn!(drawer = ?drawer, requested = %requested, available = %available,
                    "withdrawal refused: insufficient funds");
            }
            Err(_) => {}
        }
        result
    }

    /// Records the cash flow of a completed sale.
    pub async fn record_sale(
        &self,
        amount: Decimal,
        description: Option<String>,
        actor: ActorId,
        drawer: Option<DrawerId>,
    ) -> Result<LedgerEntry, TillError> {
        require_positive(amount, "amount")?;

        let description = description.unwrap_or_else(|| DEFAULT_SALE_DESCRIPTION.to_string());
        let entry = target(LedgerEntry::sale(amount, description, actor), drawer);
        self.store
            .append(entry, AppendPrecondition::DrawerOpen)
            .await
            .map_err(|err| map_append_failure(err, None))
    }

    /// Records the cash flow of a return.
    pub async fn record_return(
        &self,
        amount: Decimal,
        description: Option<String>,
        actor: ActorId,
        drawer: Option<DrawerId>,
    ) -> Result<LedgerEntry, TillError> {
        require_positive(amount, "amount")?;

        let description = description.unwrap_or_else(|| DEFAULT_RETURN_DESCRIPTION.to_string());
        let entry = target(LedgerEntry::sale_return(amount, description, actor), drawer);
        self.store
            .append(entry, AppendPrecondition::DrawerOpen)
            .await
            .map_err(|err| map_append_failure(err, None))
    }

    /// Closes the drawer, recording the counted amount.
    ///
    /// The entry carries the count itself, not a computed difference -
    /// expected-vs-actual is a reconciliation concern.
    ///
    /// # Errors
    ///
    /// `NotOpen`; `InvalidAmount` if `actual_amount` is negative.
    pub async fn close_drawer(
        &self,
        actual_amount: Decimal,
        description: Option<String>,
        actor: ActorId,
        drawer: Option<DrawerId>,
    ) -> Result<LedgerEntry, TillError> {
        if actual_amount < Decimal::ZERO {
            return Err(TillError::InvalidAmount {
                field: "actual_amount",
                amount: actual_amount,
            });
        }

        let description = description.unwrap_or_else(|| DEFAULT_CLOSE_DESCRIPTION.to_string());
        let entry = target(LedgerEntry::close(actual_amount, description, actor), drawer);

        let stored = self
            .store
            .append(entry, AppendPrecondition::DrawerOpen)
            .await
            .map_err(|err| map_append_failure(err, None))?;

        info!(drawer = ?drawer, counted = %stored.amount, "drawer closed");
        Ok(stored)
    }

    /// Pure query: drawer state plus same-day activity as of `as_of`
    /// (defaults to now).
    ///
    /// Day totals are computed from a single fetched entry list, so the sums
    /// always match the entries they were derived from.
    pub async fn summary(
        &self,
        drawer: Option<DrawerId>,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<DrawerSummary, TillError> {
        let as_of = as_of.unwrap_or_else(Utc::now);
        let (day_start, day_end) = self.timezone.day_bounds(as_of);

        let entries_for_day = self.store.entries_in_range(drawer, day_start, day_end).await?;
        let current_balance = self.store.current_balance(drawer).await?;
        let is_open = self.store.is_drawer_open(drawer).await?;

        let initial_amount_for_day = entries_for_day
            .iter()
            .find(|e| e.kind == EntryKind::Start)
            .map(|e| e.amount)
            .unwrap_or_default();

        let total_in_for_day: Cash = entries_for_day
            .iter()
            .filter(|e| e.kind == EntryKind::In)
            .map(|e| e.amount)
            .sum();

        // Stored negative; reported as a positive magnitude.
        let total_out_for_day: Cash = -entries_for_day
            .iter()
            .filter(|e| e.kind == EntryKind::Out)
            .map(|e| e.amount)
            .sum::<Cash>();

        let (opened_at, opened_by) = if is_open {
            match self.store.last_start_entry(drawer).await? {
                Some(start) => (Some(start.timestamp), Some(start.actor_id)),
                None => (None, None),
            }
        } else {
            (None, None)
        };

        Ok(DrawerSummary {
            is_open,
            current_balance,
            entries_for_day,
            initial_amount_for_day,
            total_in_for_day,
            total_out_for_day,
            opened_at,
            opened_by,
        })
    }
}

fn target(entry: LedgerEntry, drawer: Option<DrawerId>) -> LedgerEntry {
    match drawer {
        Some(id) => entry.with_drawer(id),
        None => entry,
    }
}

fn require_positive(amount: Decimal, field: &'static str) -> Result<(), TillError> {
    if amount <= Decimal::ZERO {
        return Err(TillError::InvalidAmount { field, amount });
    }
    Ok(())
}

fn require_description(
    description: impl Into<String>,
    operation: &'static str,
) -> Result<String, TillError> {
    let description = description.into();
    if description.trim().is_empty() {
        return Err(TillError::MissingDescription { operation });
    }
    Ok(description)
}

/// Translates store precondition failures into the domain taxonomy.
///
/// `requested` is the withdrawal amount, present only on the `remove_cash`
/// path so `InsufficientFunds` can report both sides.
fn map_append_failure(err: StoreError, requested: Option<Cash>) -> TillError {
    match err {
        StoreError::PreconditionFailed(PreconditionFailure::DrawerAlreadyOpen) => {
            TillError::AlreadyOpen
        }
        StoreError::PreconditionFailed(PreconditionFailure::DrawerNotOpen) => TillError::NotOpen,
        StoreError::PreconditionFailed(PreconditionFailure::InsufficientBalance { available }) => {
            TillError::InsufficientFunds {
                requested: requested.unwrap_or_default(),
                available,
            }
        }
        other => TillError::Store(other),
    }
}
