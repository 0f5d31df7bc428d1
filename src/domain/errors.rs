//! Domain error types
//!
//! These errors are framework-agnostic and represent storage-level failures.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No row with the requested id
    NotFound,
    /// ISBN uniqueness constraint violated
    DuplicateIsbn,
    /// A stored row failed validation
    Parse(String),
    /// Database/persistence error
    Database(String),
}

impl DomainError {
    /// Stable machine-readable code
    pub fn reason(&self) -> &'static str {
        match self {
            DomainError::NotFound => "not_found",
            DomainError::DuplicateIsbn => "duplicate_isbn",
            DomainError::Parse(_) => "parse_error",
            DomainError::Database(_) => "db_error",
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Book not found"),
            DomainError::DuplicateIsbn => write!(f, "Book with this ISBN already exists"),
            DomainError::Parse(msg) => write!(f, "Malformed book row: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        use sea_orm::{DbErr, RuntimeErr};

        match e {
            // NULL where the row type expects a value
            DbErr::Type(msg) => DomainError::Parse(msg),
            // Stored value has the wrong type for its column, e.g. TEXT in
            // `total_pages` or REAL in `current_page`
            DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::ColumnDecode { index, source })) => {
                DomainError::Parse(format!("column {}: {}", index, source))
            }
            other => DomainError::Database(other.to_string()),
        }
    }
}

impl From<crate::models::RowError> for DomainError {
    fn from(e: crate::models::RowError) -> Self {
        DomainError::Parse(e.to_string())
    }
}
