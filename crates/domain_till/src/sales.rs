//! Consumed contract of the sales aggregator
//!
//! The reconciliation engine only needs completed sale records for a time
//! window; where they come from (POS database, sync feed) is an adapter
//! concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Cash, ReportPeriod, SaleId};

use crate::ports::StoreError;

/// A completed sale as seen by the reconciliation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: SaleId,
    pub amount: Cash,
    /// Payment-method label ("Efectivo", "Tarjeta", ...). `None` folds into
    /// the unspecified bucket during reconciliation.
    pub payment_method: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SaleRecord {
    pub fn new(amount: Decimal, payment_method: Option<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: SaleId::new_v7(),
            amount: Cash::new(amount),
            payment_method,
            timestamp,
        }
    }
}

/// Read-only source of completed sales
#[async_trait]
pub trait SalesSource: Send + Sync {
    /// All sales with a timestamp inside the (inclusive) period.
    async fn sales_by_period(&self, period: &ReportPeriod) -> Result<Vec<SaleRecord>, StoreError>;
}
