//! In-memory reference adapters
//!
//! Single-process implementations of the entry store and sales source,
//! used by the test suite and by demos. A single `RwLock` write guard spans
//! the precondition check and the insertion, which satisfies the append
//! contract's atomicity requirement.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{Cash, DrawerId, EntryId, ReportPeriod};

use crate::entry::{EntryKind, LedgerEntry};
use crate::ports::{AppendPrecondition, EntryStore, PreconditionFailure, StoreError};
use crate::sales::{SaleRecord, SalesSource};

/// Append-only entry store backed by a `Vec`
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry without precondition checks, for test fixtures.
    pub fn seed(&self, entry: LedgerEntry) -> LedgerEntry {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let stored = LedgerEntry {
            id: Some(EntryId::new_v7()),
            ..entry
        };
        entries.push(stored.clone());
        stored
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<LedgerEntry>>, StoreError> {
        self.entries
            .read()
            .map_err(|_| StoreError::internal("entry store lock poisoned"))
    }
}

fn drawer_matches(entry: &LedgerEntry, drawer: Option<DrawerId>) -> bool {
    entry.drawer_id == drawer
}

fn last_start(entries: &[LedgerEntry], drawer: Option<DrawerId>) -> Option<LedgerEntry> {
    entries
        .iter()
        .filter(|e| drawer_matches(e, drawer) && e.kind == EntryKind::Start)
        .max_by_key(|e| e.timestamp)
        .cloned()
}

fn drawer_open(entries: &[LedgerEntry], drawer: Option<DrawerId>) -> bool {
    match last_start(entries, drawer) {
        Some(start) => !entries.iter().any(|e| {
            drawer_matches(e, drawer) && e.kind == EntryKind::Close && e.timestamp > start.timestamp
        }),
        None => false,
    }
}

fn balance(entries: &[LedgerEntry], drawer: Option<DrawerId>) -> Cash {
    entries
        .iter()
        .filter(|e| drawer_matches(e, drawer))
        .map(|e| e.amount)
        .sum()
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn append(
        &self,
        entry: LedgerEntry,
        precondition: AppendPrecondition,
    ) -> Result<LedgerEntry, StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::internal("entry store lock poisoned"))?;
        let drawer = entry.drawer_id;

        match precondition {
            AppendPrecondition::DrawerClosed => {
                if drawer_open(&entries, drawer) {
                    return Err(StoreError::PreconditionFailed(
                        PreconditionFailure::DrawerAlreadyOpen,
                    ));
                }
            }
            AppendPrecondition::DrawerOpen => {
                if !drawer_open(&entries, drawer) {
                    return Err(StoreError::PreconditionFailed(
                        PreconditionFailure::DrawerNotOpen,
                    ));
                }
            }
            AppendPrecondition::OpenWithBalanceAtLeast(required) => {
                if !drawer_open(&entries, drawer) {
                    return Err(StoreError::PreconditionFailed(
                        PreconditionFailure::DrawerNotOpen,
                    ));
                }
                let available = balance(&entries, drawer);
                if available < required {
                    return Err(StoreError::PreconditionFailed(
                        PreconditionFailure::InsufficientBalance { available },
                    ));
                }
            }
        }

        let stored = LedgerEntry {
            id: Some(EntryId::new_v7()),
            ..entry
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn entries_in_range(
        &self,
        drawer: Option<DrawerId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let entries = self.read()?;
        let mut matched: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| drawer_matches(e, drawer) && start <= e.timestamp && e.timestamp <= end)
            .cloned()
            .collect();
        matched.sort_by_key(|e| e.timestamp);
        Ok(matched)
    }

    async fn current_balance(&self, drawer: Option<DrawerId>) -> Result<Cash, StoreError> {
        let entries = self.read()?;
        Ok(balance(&entries, drawer))
    }

    async fn is_drawer_open(&self, drawer: Option<DrawerId>) -> Result<bool, StoreError> {
        let entries = self.read()?;
        Ok(drawer_open(&entries, drawer))
    }

    async fn last_start_entry(
        &self,
        drawer: Option<DrawerId>,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let entries = self.read()?;
        Ok(last_start(&entries, drawer))
    }

    async fn last_start_before(
        &self,
        drawer: Option<DrawerId>,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let entries = self.read()?;
        Ok(entries
            .iter()
            .filter(|e| {
                drawer_matches(e, drawer) && e.kind == EntryKind::Start && e.timestamp < cutoff
            })
            .max_by_key(|e| e.timestamp)
            .cloned())
    }
}

/// Sales source backed by a `Vec`
#[derive(Debug, Default)]
pub struct InMemorySalesSource {
    sales: RwLock<Vec<SaleRecord>>,
}

impl InMemorySalesSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, sale: SaleRecord) {
        let mut sales = self.sales.write().unwrap_or_else(|e| e.into_inner());
        sales.push(sale);
    }
}

#[async_trait]
impl SalesSource for InMemorySalesSource {
    async fn sales_by_period(&self, period: &ReportPeriod) -> Result<Vec<SaleRecord>, StoreError> {
        let sales = self
            .sales
            .read()
            .map_err(|_| StoreError::internal("sales lock poisoned"))?;
        Ok(sales
            .iter()
            .filter(|s| period.contains(s.timestamp))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ActorId;
    use rust_decimal_macros::dec;

    fn start_entry(amount: rust_decimal::Decimal) -> LedgerEntry {
        LedgerEntry::start(amount, "apertura", ActorId::new())
    }

    #[tokio::test]
    async fn drawer_state_is_derived_from_entries() {
        let store = InMemoryEntryStore::new();
        assert!(!store.is_drawer_open(None).await.unwrap());

        store
            .append(start_entry(dec!(100)), AppendPrecondition::DrawerClosed)
            .await
            .unwrap();
        assert!(store.is_drawer_open(None).await.unwrap());

        store
            .append(
                LedgerEntry::close(dec!(100), "corte", ActorId::new()),
                AppendPrecondition::DrawerOpen,
            )
            .await
            .unwrap();
        assert!(!store.is_drawer_open(None).await.unwrap());
    }

    #[tokio::test]
    async fn double_open_is_rejected_by_the_precondition() {
        let store = InMemoryEntryStore::new();
        store
            .append(start_entry(dec!(100)), AppendPrecondition::DrawerClosed)
            .await
            .unwrap();

        let err = store
            .append(start_entry(dec!(100)), AppendPrecondition::DrawerClosed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::PreconditionFailed(PreconditionFailure::DrawerAlreadyOpen)
        ));
    }

    #[tokio::test]
    async fn balance_precondition_reports_available_amount() {
        let store = InMemoryEntryStore::new();
        store
            .append(start_entry(dec!(50)), AppendPrecondition::DrawerClosed)
            .await
            .unwrap();

        let err = store
            .append(
                LedgerEntry::cash_out(dec!(80), "retiro", ActorId::new()),
                AppendPrecondition::OpenWithBalanceAtLeast(Cash::new(dec!(80))),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::PreconditionFailed(PreconditionFailure::InsufficientBalance { available })
                if available == Cash::new(dec!(50))
        ));
    }

    #[tokio::test]
    async fn drawers_are_isolated_from_each_other() {
        let store = InMemoryEntryStore::new();
        let side_drawer = DrawerId::new();

        store
            .append(start_entry(dec!(100)), AppendPrecondition::DrawerClosed)
            .await
            .unwrap();

        // The named drawer is still closed even though the default one is open.
        assert!(!store.is_drawer_open(Some(side_drawer)).await.unwrap());
        assert_eq!(
            store.current_balance(Some(side_drawer)).await.unwrap(),
            Cash::zero()
        );
    }
}
