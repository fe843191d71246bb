//! Report types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use cashdesk_shared::types::{AccountId, CustomerId};

use crate::account::AccountKind;
use crate::ledger::TransactionType;

/// Transaction counts per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    /// Number of deposits.
    pub deposits: usize,
    /// Number of withdrawals.
    pub withdrawals: usize,
    /// Number of transfers.
    pub transfers: usize,
}

impl TypeCounts {
    /// Sum over all types.
    #[must_use]
    pub fn total(&self) -> usize {
        self.deposits + self.withdrawals + self.transfers
    }

    pub(crate) fn record(&mut self, kind: TransactionType) {
        match kind {
            TransactionType::Deposit => self.deposits += 1,
            TransactionType::Withdrawal => self.withdrawals += 1,
            TransactionType::Transfer => self.transfers += 1,
        }
    }
}

/// Per-account statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStatement {
    /// Account.
    pub account_id: AccountId,
    /// Account kind.
    pub kind: AccountKind,
    /// Owning customer.
    pub owner: CustomerId,
    /// Current balance.
    pub balance: Decimal,
    /// Transactions in the history.
    pub transaction_count: usize,
    /// Deposits plus incoming transfers.
    pub money_in: Decimal,
    /// Withdrawals plus outgoing transfers.
    pub money_out: Decimal,
    /// `money_in - money_out`.
    pub net_change: Decimal,
    /// Timestamp of the first transaction.
    pub first_transaction: Option<DateTime<Utc>>,
    /// Timestamp of the last transaction.
    pub last_transaction: Option<DateTime<Utc>>,
}

/// One line of a customer's account overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalanceLine {
    /// Account.
    pub account_id: AccountId,
    /// Account kind.
    pub kind: AccountKind,
    /// Current balance.
    pub balance: Decimal,
}

/// Statistics across all of a customer's accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    /// Customer.
    pub customer_id: CustomerId,
    /// Balance per account.
    pub accounts: Vec<AccountBalanceLine>,
    /// Combined balance.
    pub total_balance: Decimal,
    /// Distinct transactions by type.
    pub counts: TypeCounts,
    /// Transfers between the customer's own accounts.
    pub internal_transfers: usize,
    /// Money received from outside.
    pub money_in: Decimal,
    /// Money sent outside.
    pub money_out: Decimal,
    /// `money_in - money_out`.
    pub net_change: Decimal,
    /// Mean transaction amount.
    pub average_amount: Option<Decimal>,
    /// Largest transaction amount.
    pub largest_amount: Option<Decimal>,
    /// Earliest transaction.
    pub first_transaction: Option<DateTime<Utc>>,
    /// Most recent transaction.
    pub last_transaction: Option<DateTime<Utc>>,
}

/// Statistics over the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemSummary {
    /// Transactions by type.
    pub counts: TypeCounts,
    /// Sum of deposits.
    pub total_deposits: Decimal,
    /// Sum of withdrawals.
    pub total_withdrawals: Decimal,
    /// Sum of transfers.
    pub total_transfers: Decimal,
    /// Sum of everything.
    pub total_volume: Decimal,
    /// Deposits minus withdrawals.
    pub net_change: Decimal,
}
