//! Service result types.

use rust_decimal::Decimal;
use serde::Serialize;

use cashdesk_shared::types::AccountId;

/// An account whose stored balance disagrees with its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceMismatch {
    /// Affected account.
    pub account: AccountId,
    /// Incrementally maintained balance.
    pub stored: Decimal,
    /// Balance recomputed from history.
    pub recomputed: Decimal,
}

/// Result of [`super::TransactionService::audit`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Number of accounts checked.
    pub accounts_checked: usize,
    /// Accounts that failed the check.
    pub mismatches: Vec<BalanceMismatch>,
}

impl AuditReport {
    /// Returns true if every account balanced.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}
