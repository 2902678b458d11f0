//! Integration tests for the reconciliation engine (corte)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{ActorId, Cash, DrawerId, ReportPeriod, TemporalError};
use domain_till::adapters::{InMemoryEntryStore, InMemorySalesSource};
use domain_till::{
    AppendPrecondition, EntryStore, LedgerEntry, ReconciliationService, SaleRecord, SalesSource,
    StoreError, TillError, UNSPECIFIED_PAYMENT_METHOD,
};
use test_utils::{reconciliation_scenario, sale, seeded_store};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
}

#[tokio::test]
async fn canonical_shift_reconciles_to_expected_cash() {
    let scenario = reconciliation_scenario();
    let service = ReconciliationService::new(scenario.store.clone(), scenario.sales.clone());

    let report = service
        .calculate_report(scenario.window_start, scenario.window_end, None)
        .await
        .unwrap();

    assert_eq!(report.starting_balance, Cash::new(dec!(1000.00)));
    assert_eq!(report.sale_count, 3);
    assert_eq!(report.sales_by_method.len(), 3);
    assert_eq!(report.sales_by_method["Efectivo"], Cash::new(dec!(225.50)));
    assert_eq!(report.sales_by_method["Tarjeta"], Cash::new(dec!(250.00)));
    assert_eq!(report.sales_by_method["Crédito"], Cash::new(dec!(430.00)));
    assert_eq!(report.total_sales, Cash::new(dec!(905.50)));
    assert_eq!(report.cash_in_entries.len(), 2);
    assert_eq!(report.cash_out_entries.len(), 1);
    assert_eq!(report.cash_in_total, Cash::new(dec!(500.00)));
    // Positive magnitude even though Out entries are stored negative.
    assert_eq!(report.cash_out_total, Cash::new(dec!(200.00)));
    // 1000.00 + 225.50 + 500.00 - 200.00
    assert_eq!(report.expected_cash, Cash::new(dec!(1525.50)));
    assert!(report.actual_cash.is_none());
    assert!(report.difference.is_none());
}

#[tokio::test]
async fn counted_cash_yields_shortage_or_overage() {
    let scenario = reconciliation_scenario();
    let service = ReconciliationService::new(scenario.store.clone(), scenario.sales.clone());

    let report = service
        .calculate_report(scenario.window_start, scenario.window_end, None)
        .await
        .unwrap()
        .with_counted_cash(dec!(1500.00));

    assert_eq!(report.actual_cash, Some(Cash::new(dec!(1500.00))));
    // 25.50 short.
    assert_eq!(report.difference, Some(Cash::new(dec!(-25.50))));
}

#[tokio::test]
async fn recomputation_without_mutations_is_bit_identical() {
    let scenario = reconciliation_scenario();
    let service = ReconciliationService::new(scenario.store.clone(), scenario.sales.clone());

    let first = service
        .calculate_report(scenario.window_start, scenario.window_end, None)
        .await
        .unwrap();
    let second = service
        .calculate_report(scenario.window_start, scenario.window_end, None)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn empty_window_is_a_valid_zero_report() {
    let store = Arc::new(InMemoryEntryStore::new());
    let sales = Arc::new(InMemorySalesSource::new());
    let service = ReconciliationService::new(store, sales);

    let report = service
        .calculate_report(at(9, 0), at(18, 0), None)
        .await
        .unwrap();

    assert_eq!(report.starting_balance, Cash::zero());
    assert!(report.sales_by_method.is_empty());
    assert_eq!(report.total_sales, Cash::zero());
    assert_eq!(report.sale_count, 0);
    assert!(report.cash_in_entries.is_empty());
    assert!(report.cash_out_entries.is_empty());
    assert_eq!(report.expected_cash, Cash::zero());
}

#[tokio::test]
async fn unlabeled_sales_fold_into_the_unspecified_bucket() {
    let store = Arc::new(InMemoryEntryStore::new());
    let sales = Arc::new(InMemorySalesSource::new());
    sales.record(sale(dec!(50.00)).at(at(10, 0)).build());
    sales.record(sale(dec!(30.00)).at(at(11, 0)).build());
    sales.record(sale(dec!(20.00)).paid_with("Efectivo").at(at(12, 0)).build());

    let service = ReconciliationService::new(store, sales);
    let report = service
        .calculate_report(at(9, 0), at(18, 0), None)
        .await
        .unwrap();

    assert_eq!(
        report.sales_by_method[UNSPECIFIED_PAYMENT_METHOD],
        Cash::new(dec!(80.00))
    );
    assert_eq!(report.total_sales, Cash::new(dec!(100.00)));
    assert_eq!(report.expected_cash, Cash::new(dec!(20.00)));
}

#[tokio::test]
async fn starting_balance_only_looks_strictly_before_the_window() {
    let actor = ActorId::new();
    // The Start entry sits exactly on the window's start bound.
    let store = seeded_store([
        LedgerEntry::start(dec!(400.00), "Apertura de caja", actor).with_timestamp(at(9, 0)),
    ]);
    let sales = Arc::new(InMemorySalesSource::new());
    let service = ReconciliationService::new(store, sales);

    let report = service
        .calculate_report(at(9, 0), at(18, 0), None)
        .await
        .unwrap();

    assert_eq!(report.starting_balance, Cash::zero());
}

#[tokio::test]
async fn cash_bucket_label_is_configurable() {
    let store = Arc::new(InMemoryEntryStore::new());
    let sales = Arc::new(InMemorySalesSource::new());
    sales.record(sale(dec!(75.00)).paid_with("cash").at(at(10, 0)).build());

    let service = ReconciliationService::new(store, sales).with_cash_method("cash");
    let report = service
        .calculate_report(at(9, 0), at(18, 0), None)
        .await
        .unwrap();

    assert_eq!(report.expected_cash, Cash::new(dec!(75.00)));
}

#[tokio::test]
async fn register_closing_balance_closes_the_drawer() {
    let scenario = reconciliation_scenario();
    let service = ReconciliationService::new(scenario.store.clone(), scenario.sales.clone());

    let entry = service
        .register_closing_balance(None, dec!(1500.00), None, scenario.actor)
        .await
        .unwrap();

    assert_eq!(entry.amount, Cash::new(dec!(1500.00)));
    assert!(!scenario.store.is_drawer_open(None).await.unwrap());
}

#[tokio::test]
async fn register_closing_balance_requires_an_open_drawer() {
    let store = Arc::new(InMemoryEntryStore::new());
    let sales = Arc::new(InMemorySalesSource::new());
    let service = ReconciliationService::new(store, sales);

    let err = service
        .register_closing_balance(None, dec!(100.00), None, ActorId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TillError::NotOpen));
}

/// Store and sales source that fail the test if touched at all.
struct Unreachable;

#[async_trait]
impl EntryStore for Unreachable {
    async fn append(
        &self,
        _entry: LedgerEntry,
        _precondition: AppendPrecondition,
    ) -> Result<LedgerEntry, StoreError> {
        panic!("store must not be touched");
    }

    async fn entries_in_range(
        &self,
        _drawer: Option<DrawerId>,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        panic!("store must not be touched");
    }

    async fn current_balance(&self, _drawer: Option<DrawerId>) -> Result<Cash, StoreError> {
        panic!("store must not be touched");
    }

    async fn is_drawer_open(&self, _drawer: Option<DrawerId>) -> Result<bool, StoreError> {
        panic!("store must not be touched");
    }

    async fn last_start_entry(
        &self,
        _drawer: Option<DrawerId>,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        panic!("store must not be touched");
    }

    async fn last_start_before(
        &self,
        _drawer: Option<DrawerId>,
        _cutoff: DateTime<Utc>,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        panic!("store must not be touched");
    }
}

#[async_trait]
impl SalesSource for Unreachable {
    async fn sales_by_period(&self, _period: &ReportPeriod) -> Result<Vec<SaleRecord>, StoreError> {
        panic!("sales must not be touched");
    }
}

#[tokio::test]
async fn inverted_period_fails_before_any_store_query() {
    let service = ReconciliationService::new(Arc::new(Unreachable), Arc::new(Unreachable));

    let err = service
        .calculate_report(at(18, 0), at(9, 0), None)
        .await
        .unwrap_err();

    match err {
        TillError::InvalidPeriod(TemporalError::InvalidPeriod { start, end }) => {
            assert_eq!(start, at(18, 0));
            assert_eq!(end, at(9, 0));
        }
        other => panic!("expected InvalidPeriod, got {other:?}"),
    }
}
