//! Shared classification of pool and Diesel failures.
//!
//! Each repository maps a [`StorageErrorKind`] into its own port error type,
//! so the classification logic (and its logging) lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Transport-agnostic classification of a storage failure.
pub(crate) enum StorageErrorKind {
    /// The database could not be reached.
    Connection(String),
    /// The statement failed during execution.
    Query(String),
    /// A uniqueness constraint rejected the write.
    Duplicate,
}

pub(crate) fn classify_pool_error(error: PoolError) -> StorageErrorKind {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StorageErrorKind::Connection(message)
        }
    }
}

pub(crate) fn classify_diesel_error(error: DieselError) -> StorageErrorKind {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StorageErrorKind::Duplicate
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StorageErrorKind::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => StorageErrorKind::Query("record not found".to_owned()),
        _ => StorageErrorKind::Query("database error".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_classify_as_connection() {
        let kind = classify_pool_error(PoolError::checkout("refused"));
        assert!(matches!(kind, StorageErrorKind::Connection(message) if message == "refused"));
    }

    #[test]
    fn not_found_classifies_as_query() {
        let kind = classify_diesel_error(DieselError::NotFound);
        assert!(matches!(kind, StorageErrorKind::Query(_)));
    }
}
