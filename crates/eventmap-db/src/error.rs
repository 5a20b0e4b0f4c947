//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] and [`fred`] errors. At the engine boundary they are folded into
//! the core's [`StoreError`] and [`PersistenceError`].

use eventmap_core::{PersistenceError, StoreError};

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Whether the failure is a connectivity problem rather than a bad query.
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Postgres(sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed)
                | Self::Dragonfly(_)
                | Self::Config(_)
        )
    }
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        if e.is_unavailable() {
            Self::Unavailable(e.to_string())
        } else {
            Self::Query(e.to_string())
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(e: DbError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_unavailable() {
        let err = DbError::Postgres(sqlx::Error::PoolTimedOut);
        assert!(err.is_unavailable());
        assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));
    }

    #[test]
    fn missing_row_is_a_query_failure() {
        let err = DbError::Postgres(sqlx::Error::RowNotFound);
        assert!(!err.is_unavailable());
        assert!(matches!(StoreError::from(err), StoreError::Query(_)));
    }
}
