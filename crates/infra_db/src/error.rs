//! Database error types
//!
//! This module defines the error types that can occur during storage
//! operations and classifies them into the taxonomy callers render:
//! validation, conflict, not-found and storage-unavailable.

use core_kernel::{CoreError, MoneyError};
use sqlx::error::ErrorKind as SqlxErrorKind;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Input rejected before any write: missing or malformed field,
    /// out-of-domain value, or a reference that does not resolve
    #[error("Invalid {entity}: '{field}' {message}")]
    Validation {
        entity: String,
        field: String,
        message: String,
    },

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transaction error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Schema provisioning error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be decoded into its domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An aggregate over stored amounts left the representable range
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] MoneyError),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Caller-facing classification of a [`DatabaseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    StorageUnavailable,
    Internal,
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Violation", 42);
    /// assert!(error.to_string().contains("Violation"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Creates a duplicate entry error
    pub fn duplicate(entity: &str, field: &str, value: impl std::fmt::Display) -> Self {
        DatabaseError::DuplicateEntry(format!(
            "{} with {} '{}' already exists",
            entity, field, value
        ))
    }

    pub fn validation(entity: &str, field: &str, message: impl Into<String>) -> Self {
        DatabaseError::Validation {
            entity: entity.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Rejects a reference to a row that does not exist
    pub fn unresolved(entity: &str, field: &str, id: impl std::fmt::Display) -> Self {
        Self::validation(entity, field, format!("references missing record {}", id))
    }

    /// Attaches the entity name to a domain-level rejection
    pub fn invalid(entity: &str, error: CoreError) -> Self {
        match error {
            CoreError::Validation { field, message } => Self::validation(entity, &field, message),
            CoreError::NotFound(message) => DatabaseError::NotFound(message),
            CoreError::Money(e) => Self::validation(entity, "amount", e.to_string()),
            CoreError::Temporal(e) => Self::validation(entity, "window", e.to_string()),
            CoreError::InvalidStateTransition(message) => Self::validation(entity, "status", message),
            CoreError::Configuration(message) => DatabaseError::QueryFailed(message),
        }
    }

    /// Maps the error onto the caller-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::Validation { .. }
            | DatabaseError::ForeignKeyViolation(_)
            | DatabaseError::ConstraintViolation(_) => ErrorKind::Validation,
            DatabaseError::DuplicateEntry(_) => ErrorKind::Conflict,
            DatabaseError::NotFound(_) => ErrorKind::NotFound,
            DatabaseError::ConnectionFailed(_)
            | DatabaseError::MigrationFailed(_)
            | DatabaseError::PoolExhausted => ErrorKind::StorageUnavailable,
            DatabaseError::SqlError(e) => match DatabaseError::from(e) {
                DatabaseError::QueryFailed(_) => ErrorKind::Internal,
                classified => classified.kind(),
            },
            DatabaseError::QueryFailed(_)
            | DatabaseError::TransactionFailed(_)
            | DatabaseError::SerializationError(_)
            | DatabaseError::Arithmetic(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry after correcting input
    ///
    /// Conflicts and validation failures are retryable with different
    /// data; an unavailable store needs operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Conflict)
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        self.kind() == ErrorKind::StorageUnavailable
    }

    /// The offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            DatabaseError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// The entity a validation error concerns
    pub fn entity(&self) -> Option<&str> {
        match self {
            DatabaseError::Validation { entity, .. } => Some(entity),
            _ => None,
        }
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
///
/// SQLite reports constraint failures through extended result codes:
/// 2067/1555 (unique, primary key), 787 (foreign key), 275 (check).
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    SqlxErrorKind::UniqueViolation => DatabaseError::DuplicateEntry(message),
                    SqlxErrorKind::ForeignKeyViolation => DatabaseError::ForeignKeyViolation(message),
                    SqlxErrorKind::CheckViolation | SqlxErrorKind::NotNullViolation => {
                        DatabaseError::ConstraintViolation(message)
                    }
                    _ => match db_err.code().as_deref() {
                        Some("2067") | Some("1555") => DatabaseError::DuplicateEntry(message),
                        Some("787") => DatabaseError::ForeignKeyViolation(message),
                        Some("275") => DatabaseError::ConstraintViolation(message),
                        _ => DatabaseError::QueryFailed(message),
                    },
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

/// Classifies a failed write so constraint collisions surface as such
pub(crate) fn classify(error: sqlx::Error) -> DatabaseError {
    match DatabaseError::from(&error) {
        DatabaseError::QueryFailed(_) => DatabaseError::SqlError(error),
        classified => classified,
    }
}
