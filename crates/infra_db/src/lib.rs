//! PostgreSQL infrastructure for the till
//!
//! Adapters implementing the domain's persistence contracts on PostgreSQL
//! using SQLx: the append-only [`PgEntryStore`] and the read-only
//! [`PgSalesSource`]. Appends run their precondition check and insert inside
//! a single SERIALIZABLE transaction; serialization conflicts surface as
//! transient errors so callers can retry.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgEntryStore};
//!
//! let pool = create_pool(&DatabaseConfig::new("postgres://localhost/till")).await?;
//! let store = PgEntryStore::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{PgEntryStore, PgSalesSource};
