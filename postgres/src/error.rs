//! sqlx error classification.

use webnovel_core::store::StoreError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const QUERY_CANCELED: &str = "57014";
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

/// Map a sqlx error onto the storage taxonomy.
///
/// Serialization failures, deadlocks, statement timeouts and connection
/// problems are transient; constraint violations are conflicts; everything
/// else is a plain database error.
#[must_use]
pub fn map_sqlx_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED | QUERY_CANCELED) => {
                tracing::warn!(error = %db, "Transaction could not be serialized");
                StoreError::Unavailable(db.to_string())
            }
            Some(UNIQUE_VIOLATION | CHECK_VIOLATION) => StoreError::Conflict(db.to_string()),
            _ => StoreError::Database(db.to_string()),
        },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(error.to_string())
        }
        _ => StoreError::Database(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhaustion_is_transient() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn missing_rows_are_database_errors() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
