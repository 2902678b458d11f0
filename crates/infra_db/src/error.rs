//! Database error types
//!
//! Classifies SQLx failures by PostgreSQL error code and bridges them into
//! the domain's `StoreError` so the core stays ignorant of the database.

use thiserror::Error;

use domain_till::StoreError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A serializable transaction lost to a concurrent one (SQLSTATE 40001).
    #[error("serialization conflict: {0}")]
    SerializationConflict(String),

    /// Constraint violation (unique, check, foreign key).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A stored row could not be decoded into a domain value.
    #[error("row decode error: {0}")]
    DecodeFailed(String),

    /// No available connections.
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),
}

impl DatabaseError {
    /// True when retrying the operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_)
                | DatabaseError::SerializationConflict(_)
                | DatabaseError::PoolExhausted
        )
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Tls(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::DecodeFailed(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                match db_err.code().as_deref() {
                    Some("40001") => {
                        DatabaseError::SerializationConflict(db_err.message().to_string())
                    }
                    Some(code) if code.starts_with("23") => {
                        DatabaseError::ConstraintViolation(db_err.message().to_string())
                    }
                    _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

/// Bridges database failures into the entry-store contract.
///
/// Serialization conflicts surface as transient `Conflict` values so callers
/// can apply their own retry policy; the core never retries.
impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::ConnectionFailed(message) => StoreError::Connection {
                message,
                source: None,
            },
            DatabaseError::PoolExhausted => StoreError::connection("connection pool exhausted"),
            DatabaseError::SerializationConflict(message) => StoreError::Conflict(message),
            other => StoreError::Internal(other.to_string()),
        }
    }
}
