pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Stale version for {entity_type} {id}: expected {expected}, stored {actual}")]
    StaleVersion {
        entity_type: String,
        id: i64,
        expected: i64,
        actual: i64,
    },
}

impl DatabaseError {
    pub(crate) fn not_found(entity_type: &str, id: i64) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }
}

/// Lift SQLite constraint failures (foreign keys, NOT NULL) out of the generic
/// `Sqlite` variant so callers can map them to a conflict.
pub(crate) fn classify(err: rusqlite::Error) -> DatabaseError {
    match err.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => {
            DatabaseError::ConstraintViolation(err.to_string())
        }
        _ => DatabaseError::Sqlite(err),
    }
}
