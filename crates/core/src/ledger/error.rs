//! Ledger error types for validation, funds, and consistency failures.
//!
//! Every variant except the fatal ones is a business-rule rejection: the
//! operation that raised it has not mutated anything.

use rust_decimal::Decimal;
use thiserror::Error;

use cashdesk_shared::AppError;

use crate::screening::ActivityCategory;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount is zero or negative.
    #[error("Amount cannot be negative or zero: {0}")]
    NegativeAmount(Decimal),

    /// Structurally invalid request.
    #[error("Invalid {operation} transaction: {reason}")]
    InvalidTransaction {
        /// The operation being attempted (creation, transfer, deletion, ...).
        operation: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    // ========== Account Errors ==========
    /// Account reference is missing or unknown.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Withdrawal or transfer exceeds the current balance.
    #[error("Insufficient funds: Required {required:.2}, Available {available:.2}")]
    InsufficientFunds {
        /// Amount the operation needs.
        required: Decimal,
        /// Balance at the time of the check.
        available: Decimal,
    },

    // ========== Screening Errors ==========
    /// Rejected by the activity screener.
    #[error("Suspicious activity detected: {category} - {detail}")]
    SuspiciousActivity {
        /// Which rule matched.
        category: ActivityCategory,
        /// Human-readable explanation.
        detail: String,
    },

    // ========== Fatal Errors ==========
    /// A deletion left balances and histories out of step.
    #[error("Ledger inconsistency: {0}")]
    LedgerInconsistency(String),

    /// Internal error (e.g. a poisoned account lock).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Shorthand for [`LedgerError::InvalidTransaction`].
    pub fn invalid(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidTransaction {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::InvalidTransaction { .. } => "INVALID_TRANSACTION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::SuspiciousActivity { .. } => "SUSPICIOUS_ACTIVITY",
            Self::LedgerInconsistency(_) => "LEDGER_INCONSISTENCY",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the error needs operator attention rather than a retry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LedgerInconsistency(_) | Self::Internal(_))
    }

    /// Returns the screening category if this is a screening rejection.
    #[must_use]
    pub fn activity_category(&self) -> Option<ActivityCategory> {
        match self {
            Self::SuspiciousActivity { category, .. } => Some(*category),
            _ => None,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::NegativeAmount(_) | LedgerError::InvalidTransaction { .. } => {
                Self::Validation(message)
            }
            LedgerError::AccountNotFound(_) => Self::NotFound(message),
            LedgerError::InsufficientFunds { .. } => Self::BusinessRule(message),
            LedgerError::SuspiciousActivity { .. } => Self::Blocked(message),
            LedgerError::LedgerInconsistency(_) | LedgerError::Internal(_) => Self::Fatal(message),
        }
    }
}
