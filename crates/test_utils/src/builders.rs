//! Builders for entries, sales, and seeded stores

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use domain_till::adapters::InMemoryEntryStore;
use domain_till::{LedgerEntry, SaleRecord};

/// Seeds an in-memory entry store with a prepared history.
///
/// Entries are inserted verbatim (no precondition checks), so fixtures can
/// describe any historical state, including pathological ones.
pub fn seeded_store(entries: impl IntoIterator<Item = LedgerEntry>) -> Arc<InMemoryEntryStore> {
    let store = InMemoryEntryStore::new();
    for entry in entries {
        store.seed(entry);
    }
    Arc::new(store)
}

/// Shorthand for a [`SaleBuilder`].
pub fn sale(amount: Decimal) -> SaleBuilder {
    SaleBuilder::new(amount)
}

/// Builder for [`SaleRecord`] values
#[derive(Debug, Clone)]
pub struct SaleBuilder {
    amount: Decimal,
    payment_method: Option<String>,
    timestamp: DateTime<Utc>,
}

impl SaleBuilder {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            payment_method: None,
            timestamp: Utc::now(),
        }
    }

    pub fn paid_with(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self) -> SaleRecord {
        SaleRecord::new(self.amount, self.payment_method, self.timestamp)
    }
}
