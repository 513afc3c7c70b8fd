//! Error translation shared by the Diesel repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub(crate) fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Log a Diesel failure at debug level and return its message.
pub(crate) fn map_diesel_error_message(error: &DieselError, operation: &str) -> String {
    match error {
        DieselError::DatabaseError(kind, info) => debug!(
            ?kind,
            message = info.message(),
            constraint = ?info.constraint_name(),
            %operation,
            "diesel operation failed"
        ),
        _ => debug!(%error, %operation, "diesel operation failed"),
    }
    error.to_string()
}

/// Whether the error means the connection itself is gone.
pub(crate) fn is_connection_error(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
            | DieselError::BrokenTransactionManager
    )
}

/// Name of the foreign-key constraint `error` violated, if any.
pub(crate) fn violated_foreign_key(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

/// One-line description of a failed row write.
///
/// Constraint violations on the external-id indexes name the column, so a
/// concurrent import that claimed the same provider id is recognisable.
pub(crate) fn describe_row_error(error: &DieselError) -> String {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some(name) => match name.strip_suffix("_key").and_then(|n| n.strip_prefix("pois_")) {
                    Some(column) => format!("{column} is already used by another POI"),
                    None => format!("unique constraint {name} violated"),
                },
                None => "unique constraint violated".to_owned(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            format!(
                "foreign key {} violated",
                info.constraint_name().unwrap_or("constraint")
            )
        }
        other => other.to_string(),
    }
}
