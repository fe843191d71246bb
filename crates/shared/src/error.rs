//! Application-wide error types.

use thiserror::Error;

use crate::types::AmountParseError;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// This is the caller-facing outcome of an operation. Domain crates convert their
/// own error enums into it at the service boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Raw input could not be parsed.
    #[error(transparent)]
    Parse(#[from] AmountParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Operation was blocked by activity screening.
    #[error("{0}")]
    Blocked(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Internal state is inconsistent; needs operator attention.
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl AppError {
    /// Returns the error code for display and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Blocked(_) => "BLOCKED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Fatal(_) => "FATAL",
        }
    }

    /// Returns true if the process should stop instead of prompting again.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Fatal(_))
    }
}
