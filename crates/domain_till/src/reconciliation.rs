//! Reconciliation engine (corte)
//!
//! Aggregates sales and drawer entries over an arbitrary window and computes
//! the cash that should be in the drawer versus the amount actually counted.
//! Reports are recomputed fresh on every request and never persisted; the
//! caller either gets a complete report or an error, never a partial one.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use core_kernel::{ActorId, Cash, DrawerId, ReportPeriod};

use crate::entry::{EntryKind, LedgerEntry};
use crate::error::TillError;
use crate::ledger::LedgerService;
use crate::ports::EntryStore;
use crate::sales::SalesSource;

/// Default label of the sales bucket that moves physical cash.
pub const CASH_PAYMENT_METHOD: &str = "Efectivo";
/// Bucket for sales that carry no payment-method label.
pub const UNSPECIFIED_PAYMENT_METHOD: &str = "Sin especificar";

/// Point-in-time financial reconciliation of a drawer over a window
///
/// `sales_by_method` is a `BTreeMap` so recomputing over an unchanged store
/// yields a bit-identical report. `cash_out_total` is a positive magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub period: ReportPeriod,
    pub drawer_id: Option<DrawerId>,
    /// Float carried from the most recent `Start` strictly before the window.
    pub starting_balance: Cash,
    pub sales_by_method: BTreeMap<String, Cash>,
    pub total_sales: Cash,
    pub sale_count: usize,
    pub cash_in_entries: Vec<LedgerEntry>,
    pub cash_out_entries: Vec<LedgerEntry>,
    pub cash_in_total: Cash,
    pub cash_out_total: Cash,
    /// `starting_balance + cash sales + cash_in_total - cash_out_total`.
    pub expected_cash: Cash,
    /// Counted amount, once supplied via [`Self::with_counted_cash`].
    pub actual_cash: Option<Cash>,
    /// `actual_cash - expected_cash`; negative means a shortage.
    pub difference: Option<Cash>,
}

impl ReconciliationReport {
    /// Registers the physically counted amount, deriving the shortage or
    /// overage against `expected_cash`.
    pub fn with_counted_cash(mut self, counted: Decimal) -> Self {
        let counted = Cash::new(counted);
        self.actual_cash = Some(counted);
        self.difference = Some(counted - self.expected_cash);
        self
    }
}

/// Combines ledger queries with the sales feed into a verified summary
///
/// Holds no mutable state; every report is freshly computed from the store's
/// current contents.
pub struct ReconciliationService {
    store: Arc<dyn EntryStore>,
    sales: Arc<dyn SalesSource>,
    ledger: LedgerService,
    cash_method: String,
}

impl ReconciliationService {
    pub fn new(store: Arc<dyn EntryStore>, sales: Arc<dyn SalesSource>) -> Self {
        let ledger = LedgerService::new(Arc::clone(&store));
        Self {
            store,
            sales,
            ledger,
            cash_method: CASH_PAYMENT_METHOD.to_string(),
        }
    }

    /// Overrides the payment-method label treated as physical cash.
    pub fn with_cash_method(mut self, label: impl Into<String>) -> Self {
        self.cash_method = label.into();
        self
    }

    /// Builds the reconciliation report for `[start, end]`.
    ///
    /// The window is validated before any store access; no sales and no
    /// prior `Start` entry are valid empty results (zeroes), not errors.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` when `end < start`; store failures propagate as a
    /// single aggregate failure.
    pub async fn calculate_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        drawer: Option<DrawerId>,
    ) -> Result<ReconciliationReport, TillError> {
        let period = ReportPeriod::new(start, end)?;

        let starting_balance = self
            .store
            .last_start_before(drawer, period.start())
            .await?
            .map(|entry| entry.amount)
            .unwrap_or_default();

        let sales = self.sales.sales_by_period(&period).await?;
        let sale_count = sales.len();

        let mut sales_by_method: BTreeMap<String, Cash> = BTreeMap::new();
        for sale in sales {
            let label = sale
                .payment_method
                .unwrap_or_else(|| UNSPECIFIED_PAYMENT_METHOD.to_string());
            let bucket = sales_by_method.entry(label).or_insert_with(Cash::zero);
            *bucket = *bucket + sale.amount;
        }
        let total_sales: Cash = sales_by_method.values().copied().sum();

        let entries = self
            .store
            .entries_in_range(drawer, period.start(), period.end())
            .await?;

        let cash_in_entries: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::In)
            .cloned()
            .collect();
        let cash_out_entries: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::Out)
            .cloned()
            .collect();

        let cash_in_total: Cash = cash_in_entries.iter().map(|e| e.amount).sum();
        // Out amounts are stored negative; report the positive magnitude.
        let cash_out_total: Cash = -cash_out_entries.iter().map(|e| e.amount).sum::<Cash>();

        let cash_sales = sales_by_method
            .get(self.cash_method.as_str())
            .copied()
            .unwrap_or_default();
        let expected_cash = starting_balance + cash_sales + cash_in_total - cash_out_total;

        debug!(
            drawer = ?drawer,
            %starting_balance,
            %total_sales,
            %cash_in_total,
            %cash_out_total,
            %expected_cash,
            "reconciliation report computed"
        );

        Ok(ReconciliationReport {
            period,
            drawer_id: drawer,
            starting_balance,
            sales_by_method,
            total_sales,
            sale_count,
            cash_in_entries,
            cash_out_entries,
            cash_in_total,
            cash_out_total,
            expected_cash,
            actual_cash: None,
            difference: None,
        })
    }

    /// Registers the counted closing amount in the ledger.
    ///
    /// Thin delegation to [`LedgerService::close_drawer`]; callers typically
    /// invoke it right after reviewing a report, pairing the stored count
    /// with [`ReconciliationReport::with_counted_cash`] for the difference.
    pub async fn register_closing_balance(
        &self,
        drawer: Option<DrawerId>,
        actual_amount: Decimal,
        description: Option<String>,
        actor: ActorId,
    ) -> Result<LedgerEntry, TillError> {
        let entry = self
            .ledger
            .close_drawer(actual_amount, description, actor, drawer)
            .await?;
        info!(drawer = ?drawer, counted = %entry.amount, "closing balance registered");
        Ok(entry)
    }
}
