//! Directory error types.

use thiserror::Error;

use cashdesk_shared::AppError;
use cashdesk_shared::types::{AccountId, CustomerId};

use crate::account::AccountKind;
use crate::ledger::LedgerError;

/// Directory-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// No customer matched the lookup.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Email is already registered.
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    /// A required customer field is blank.
    #[error("Invalid customer: {0}")]
    InvalidCustomer(String),

    /// The customer already holds an account of this kind.
    #[error("Customer {customer} already has a {kind} account")]
    DuplicateAccountKind {
        /// Owning customer.
        customer: CustomerId,
        /// Requested kind.
        kind: AccountKind,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account cannot be closed while it has transactions.
    #[error("Cannot close account {0} with existing transactions")]
    AccountHasTransactions(AccountId),

    /// Customer cannot be removed while holding accounts.
    #[error("Cannot remove customer {0} with existing accounts")]
    CustomerHasAccounts(CustomerId),

    /// Account access failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Directory lock poisoned.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DirectoryError {
    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            Self::InvalidCustomer(_) => "INVALID_CUSTOMER",
            Self::DuplicateAccountKind { .. } => "DUPLICATE_ACCOUNT_KIND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountHasTransactions(_) => "ACCOUNT_HAS_TRANSACTIONS",
            Self::CustomerHasAccounts(_) => "CUSTOMER_HAS_ACCOUNTS",
            Self::Ledger(err) => err.error_code(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DirectoryError> for LedgerError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Ledger(inner) => inner,
            DirectoryError::Internal(detail) => Self::Internal(detail),
            other => Self::AccountNotFound(other.to_string()),
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        let message = err.to_string();
        match err {
            DirectoryError::CustomerNotFound(_) | DirectoryError::AccountNotFound(_) => {
                Self::NotFound(message)
            }
            DirectoryError::DuplicateEmail(_) | DirectoryError::InvalidCustomer(_) => {
                Self::Validation(message)
            }
            DirectoryError::DuplicateAccountKind { .. }
            | DirectoryError::AccountHasTransactions(_)
            | DirectoryError::CustomerHasAccounts(_) => Self::BusinessRule(message),
            DirectoryError::Ledger(inner) => inner.into(),
            DirectoryError::Internal(_) => Self::Fatal(message),
        }
    }
}
