//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Lookup failures raised by a field source.
///
/// The template renderer recovers from both variants by leaving the
/// placeholder in the output untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("record shortcut not found: {0}")]
    ShortcutNotFound(char),

    #[error("record field not found: {0}")]
    FieldNotFound(String),
}

/// Domain errors represent business rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid retention code: {0}")]
    InvalidRetention(String),

    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
}
