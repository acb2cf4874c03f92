//! Error types for atlas-db.

use miette::Diagnostic;
use thiserror::Error;

use crate::record::Record;

/// Database error type for atlas-db operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(atlas_db::connection),
        help("Check if the database file exists and is accessible")
    )]
    ConnectionError(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(code(atlas_db::query))]
    QueryError(String),

    #[error("Database migration failed: {0}")]
    #[diagnostic(
        code(atlas_db::migration),
        help("Run 'atlas migrate status' to inspect the applied migrations")
    )]
    MigrationError(String),

    #[error("Conflicting row: {0}")]
    #[diagnostic(
        code(atlas_db::unique_violation),
        help("A row with the same key already exists")
    )]
    UniqueViolation(String),

    #[error("Record not found: {0}")]
    #[diagnostic(code(atlas_db::not_found))]
    NotFound(String),

    #[error("{message}")]
    #[diagnostic(code(atlas_db::no_entity_exists))]
    NoEntityExists {
        message: String,
        filter_criteria: Record,
    },

    #[error("{message}")]
    #[diagnostic(
        code(atlas_db::non_unique_result),
        help("Narrow the filter criteria so that at most one row matches")
    )]
    NonUniqueResult {
        message: String,
        filter_criteria: Record,
    },

    #[error("Unsupported field: {0}")]
    #[diagnostic(code(atlas_db::unsupported_field))]
    UnsupportedField(String),

    #[error("Invalid column: {0}")]
    #[diagnostic(code(atlas_db::invalid_column))]
    InvalidColumn(String),

    #[error("Empty update: no updatable fields were provided")]
    #[diagnostic(code(atlas_db::empty_update))]
    EmptyUpdate,

    #[error("Chunk size must be greater than zero")]
    #[diagnostic(code(atlas_db::invalid_chunk_size))]
    InvalidChunkSize,

    #[error("Invalid page: {0}")]
    #[diagnostic(code(atlas_db::invalid_page))]
    InvalidPage(String),

    #[error("Operation requires an open transaction")]
    #[diagnostic(
        code(atlas_db::no_transaction),
        help("Call it from inside `transaction` or `immediate_transaction`")
    )]
    NoActiveTransaction,

    #[error("Invalid record: {0}")]
    #[diagnostic(code(atlas_db::invalid_record))]
    InvalidRecord(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(atlas_db::io), help("Check file permissions and disk space"))]
    IoError(#[from] std::io::Error),
}

impl DbError {
    pub fn no_entity_exists(message: impl Into<String>, filter_criteria: Record) -> Self {
        Self::NoEntityExists {
            message: message.into(),
            filter_criteria,
        }
    }

    pub fn non_unique_result(message: impl Into<String>, filter_criteria: Record) -> Self {
        Self::NonUniqueResult {
            message: message.into(),
            filter_criteria,
        }
    }
}

impl From<diesel::result::Error> for DbError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => DbError::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => DbError::UniqueViolation(info.message().to_string()),
            diesel::result::Error::DatabaseError(_, info) => {
                DbError::QueryError(info.message().to_string())
            }
            other => DbError::QueryError(other.to_string()),
        }
    }
}

impl From<diesel::result::ConnectionError> for DbError {
    fn from(err: diesel::result::ConnectionError) -> Self {
        DbError::ConnectionError(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::InvalidRecord(err.to_string())
    }
}

/// Result type alias for atlas-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
