//! PostgreSQL entry store
//!
//! Implements the append-only ledger contract on a single `ledger_entries`
//! table. The precondition check and the insert run inside one SERIALIZABLE
//! transaction; a concurrent conflicting append surfaces as SQLSTATE 40001,
//! which the error layer maps to a transient [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use core_kernel::{ActorId, Cash, DrawerId, EntryId};
use domain_till::{
    AppendPrecondition, EntryKind, EntryStore, LedgerEntry, PreconditionFailure, StoreError,
};

use crate::error::DatabaseError;

/// Entry store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    /// Creates a new store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_err(error: sqlx::Error) -> StoreError {
    DatabaseError::from(error).into()
}

fn entry_from_row(row: &PgRow) -> Result<LedgerEntry, DatabaseError> {
    let kind: String = row.try_get("kind")?;
    let kind = kind
        .parse::<EntryKind>()
        .map_err(DatabaseError::DecodeFailed)?;
    let amount: Decimal = row.try_get("amount")?;

    Ok(LedgerEntry {
        id: Some(EntryId::from(row.try_get::<Uuid, _>("entry_id")?)),
        drawer_id: row
            .try_get::<Option<Uuid>, _>("drawer_id")?
            .map(DrawerId::from),
        timestamp: row.try_get("recorded_at")?,
        kind,
        amount: Cash::new(amount),
        description: row.try_get("description")?,
        actor_id: ActorId::from(row.try_get::<Uuid, _>("actor_id")?),
    })
}

/// Derived open state inside the current transaction.
///
/// A drawer is open when its most recent `start` entry has no `close` entry
/// with a strictly later timestamp. `drawer` of `None` selects the default
/// drawer, matched with `IS NOT DISTINCT FROM` so NULL compares equal.
async fn drawer_open(conn: &mut PgConnection, drawer: Option<Uuid>) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT NOT EXISTS (
            SELECT 1 FROM ledger_entries c
            WHERE c.kind = 'close'
              AND c.drawer_id IS NOT DISTINCT FROM $1
              AND c.recorded_at > s.recorded_at
        ) AS is_open
        FROM (
            SELECT recorded_at FROM ledger_entries
            WHERE kind = 'start' AND drawer_id IS NOT DISTINCT FROM $1
            ORDER BY recorded_at DESC
            LIMIT 1
        ) s
        "#,
    )
    .bind(drawer)
    .fetch_optional(&mut *conn)
    .await?;

    // No start entry at all means the drawer has never been opened.
    match row {
        Some(row) => row.try_get("is_open"),
        None => Ok(false),
    }
}

async fn balance_of(conn: &mut PgConnection, drawer: Option<Uuid>) -> Result<Cash, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COALESCE(SUM(amount), 0) AS balance
        FROM ledger_entries
        WHERE drawer_id IS NOT DISTINCT FROM $1
        "#,
    )
    .bind(drawer)
    .fetch_one(&mut *conn)
    .await?;

    let balance: Decimal = row.try_get("balance")?;
    Ok(Cash::new(balance))
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn append(
        &self,
        entry: LedgerEntry,
        precondition: AppendPrecondition,
    ) -> Result<LedgerEntry, StoreError> {
        let drawer = entry.drawer_id.map(Uuid::from);

        let mut tx = self.pool.begin().await.map_err(store_err)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        let open = drawer_open(&mut tx, drawer).await.map_err(store_err)?;
        match precondition {
            AppendPrecondition::DrawerClosed => {
                if open {
                    return Err(StoreError::PreconditionFailed(
                        PreconditionFailure::DrawerAlreadyOpen,
                    ));
                }
            }
            AppendPrecondition::DrawerOpen => {
                if !open {
                    return Err(StoreError::PreconditionFailed(
                        PreconditionFailure::DrawerNotOpen,
                    ));
                }
            }
            AppendPrecondition::OpenWithBalanceAtLeast(required) => {
                if !open {
                    return Err(StoreError::PreconditionFailed(
                        PreconditionFailure::DrawerNotOpen,
                    ));
                }
                let available = balance_of(&mut tx, drawer).await.map_err(store_err)?;
                if available < required {
                    return Err(StoreError::PreconditionFailed(
                        PreconditionFailure::InsufficientBalance { available },
                    ));
                }
            }
        }

        let id = EntryId::new_v7();
        sqlx::query(
            r#"
            INSERT INTO ledger_entries
                (entry_id, drawer_id, recorded_at, kind, amount, description, actor_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(id))
        .bind(drawer)
        .bind(entry.timestamp)
        .bind(entry.kind.as_str())
        .bind(entry.amount.amount())
        .bind(&entry.description)
        .bind(Uuid::from(entry.actor_id))
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        debug!(entry_id = %id, kind = %entry.kind, "ledger entry appended");

        Ok(LedgerEntry {
            id: Some(id),
            ..entry
        })
    }

    async fn entries_in_range(
        &self,
        drawer: Option<DrawerId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT entry_id, drawer_id, recorded_at, kind, amount, description, actor_id
            FROM ledger_entries
            WHERE drawer_id IS NOT DISTINCT FROM $1
              AND recorded_at BETWEEN $2 AND $3
            ORDER BY recorded_at ASC, entry_id ASC
            "#,
        )
        .bind(drawer.map(Uuid::from))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| entry_from_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn current_balance(&self, drawer: Option<DrawerId>) -> Result<Cash, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(store_err)?;
        balance_of(&mut conn, drawer.map(Uuid::from))
            .await
            .map_err(store_err)
    }

    async fn is_drawer_open(&self, drawer: Option<DrawerId>) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(store_err)?;
        drawer_open(&mut conn, drawer.map(Uuid::from))
            .await
            .map_err(store_err)
    }

    async fn last_start_entry(
        &self,
        drawer: Option<DrawerId>,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT entry_id, drawer_id, recorded_at, kind, amount, description, actor_id
            FROM ledger_entries
            WHERE kind = 'start' AND drawer_id IS NOT DISTINCT FROM $1
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(drawer.map(Uuid::from))
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref()
            .map(entry_from_row)
            .transpose()
            .map_err(StoreError::from)
    }

    async fn last_start_before(
        &self,
        drawer: Option<DrawerId>,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT entry_id, drawer_id, recorded_at, kind, amount, description, actor_id
            FROM ledger_entries
            WHERE kind = 'start'
              AND drawer_id IS NOT DISTINCT FROM $1
              AND recorded_at < $2
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(drawer.map(Uuid::from))
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.as_ref()
            .map(entry_from_row)
            .transpose()
            .map_err(StoreError::from)
    }
}
