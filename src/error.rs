//! Error types for classroom_insights

use rusqlite::ErrorCode;
use thiserror::Error;

/// Main error type for the aggregation engine
#[derive(Error, Debug)]
pub enum Error {
    /// The store could not be reached, was busy past the fetch timeout, or is locked
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A persisted record failed validation at the parsing boundary
    #[error("malformed {record} record '{key}': {reason}")]
    Malformed {
        record: &'static str,
        key: String,
        reason: String,
    },

    /// Any other SQLite failure
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// Schema migration failure
    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// JSON encoding of a list column failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A write was rejected before reaching the store
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn malformed(record: &'static str, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Malformed {
            record,
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether a caller assembling results for many users should skip the
    /// failing user instead of aborting.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen) => {
                return Error::Unavailable(err.to_string());
            }
            _ => {}
        }

        match &err {
            rusqlite::Error::InvalidColumnType(_, column, column_type) => Error::malformed(
                "row",
                column.clone(),
                format!("unexpected column type {column_type}"),
            ),
            rusqlite::Error::IntegralValueOutOfRange(index, value) => Error::malformed(
                "row",
                format!("column {index}"),
                format!("integer {value} out of range"),
            ),
            rusqlite::Error::FromSqlConversionFailure(index, _, cause) => Error::malformed(
                "row",
                format!("column {index}"),
                cause.to_string(),
            ),
            _ => Error::Database(err),
        }
    }
}

/// Result type alias for classroom_insights
pub type Result<T> = std::result::Result<T, Error>;
