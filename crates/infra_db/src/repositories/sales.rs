//! PostgreSQL sales source
//!
//! Read-only adapter over the sales table the point-of-sale writes to. The
//! reconciliation engine only ever queries by time window.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use core_kernel::{Cash, ReportPeriod, SaleId};
use domain_till::{SaleRecord, SalesSource, StoreError};

use crate::error::DatabaseError;

/// Sales source backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgSalesSource {
    pool: PgPool,
}

impl PgSalesSource {
    /// Creates a new source over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn sale_from_row(row: &PgRow) -> Result<SaleRecord, DatabaseError> {
    let amount: Decimal = row.try_get("amount")?;

    Ok(SaleRecord {
        id: SaleId::from(row.try_get::<Uuid, _>("sale_id")?),
        amount: Cash::new(amount),
        payment_method: row.try_get("payment_method")?,
        timestamp: row.try_get("sold_at")?,
    })
}

#[async_trait]
impl SalesSource for PgSalesSource {
    async fn sales_by_period(&self, period: &ReportPeriod) -> Result<Vec<SaleRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT sale_id, amount, payment_method, sold_at
            FROM sales
            WHERE sold_at BETWEEN $1 AND $2
            ORDER BY sold_at ASC, sale_id ASC
            "#,
        )
        .bind(period.start())
        .bind(period.end())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from(DatabaseError::from(e)))?;

        rows.iter()
            .map(|row| sale_from_row(row).map_err(StoreError::from))
            .collect()
    }
}
