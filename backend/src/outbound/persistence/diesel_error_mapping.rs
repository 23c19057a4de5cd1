//! Shared mapping from pool and Diesel failures onto [`PersistenceError`].

use tracing::debug;

use crate::domain::ports::PersistenceError;

use super::pool::PoolError;

/// Map pool checkout/build failures to connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> PersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors, logging the database detail at debug level only.
///
/// Constraint names are surfaced in the resulting message so callers can tell
/// which uniqueness rule fired; SQL text is never included.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> PersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => PersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PersistenceError::query("database query error"),
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().unwrap_or("unnamed constraint");
            match kind {
                DatabaseErrorKind::UniqueViolation => {
                    PersistenceError::conflict(format!("{constraint} already exists"))
                }
                DatabaseErrorKind::ForeignKeyViolation | DatabaseErrorKind::CheckViolation => {
                    PersistenceError::foreign_key(format!("{constraint} rejected the row"))
                }
                DatabaseErrorKind::ClosedConnection => {
                    PersistenceError::connection("database connection error")
                }
                _ => PersistenceError::query("database error"),
            }
        }
        _ => PersistenceError::query("database error"),
    }
}

/// Collect row conversion results, reporting the first invalid stored row.
pub(crate) fn collect_rows<T>(
    results: impl Iterator<Item = Result<T, String>>,
) -> Result<Vec<T>, PersistenceError> {
    results
        .collect::<Result<Vec<_>, _>>()
        .map_err(|message| PersistenceError::query(format!("invalid stored row: {message}")))
}

/// Convert a row count into the `u64` totals the ports report.
pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
