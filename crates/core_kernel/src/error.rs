//! Core error types used across the system

use thiserror::Error;
use crate::money::MoneyError;
use crate::temporal::TemporalError;

/// Core error type for the kernel
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// A field failed validation: missing, malformed, or outside its domain
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Rejects a value that is not a member of an enumerated domain
    pub fn out_of_domain(field: &str, value: &str, allowed: &[&str]) -> Self {
        CoreError::validation(
            field,
            format!("'{}' is not one of: {}", value, allowed.join(", ")),
        )
    }

    /// Rejects an empty required field
    pub fn required(field: &str) -> Self {
        CoreError::validation(field, "is required")
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidStateTransition(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }

    /// Returns the offending field name for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
