//! Mapping of sqlx failures onto [`AppError`].

use stash_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error, classifying connectivity problems as transient.
pub fn db_error(context: &str, e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AppError::with_source(
                ErrorKind::Transient,
                format!("{context}: database unavailable"),
                e,
            )
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}

/// Whether the error is a violation of the named unique constraint.
pub fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
