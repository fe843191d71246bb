//! Filters and sort orders for transaction histories.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use cashdesk_shared::types::AccountId;

use crate::ledger::{Transaction, TransactionType};

/// Filter over a transaction list. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only this type.
    pub kind: Option<TransactionType>,
    /// Case-insensitive substring of the description.
    pub keyword: Option<String>,
    /// Inclusive lower date bound (UTC day).
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound (UTC day).
    pub to: Option<NaiveDate>,
    /// Inclusive minimum amount.
    pub min_amount: Option<Decimal>,
    /// Inclusive maximum amount.
    pub max_amount: Option<Decimal>,
}

impl TransactionFilter {
    /// Creates a filter that matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one transaction type.
    #[must_use]
    pub fn with_kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to descriptions containing `keyword`. A blank keyword is ignored.
    #[must_use]
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        let keyword = keyword.trim();
        self.keyword = (!keyword.is_empty()).then(|| keyword.to_lowercase());
        self
    }

    /// Restricts to an inclusive date range; either end may be open.
    #[must_use]
    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Restricts to an inclusive amount range; either end may be open.
    #[must_use]
    pub fn with_amounts(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    /// Returns true if `tx` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        let day = tx.created_at().date_naive();
        self.kind.is_none_or(|kind| tx.kind() == kind)
            && self
                .keyword
                .as_deref()
                .is_none_or(|k| tx.description().to_lowercase().contains(k))
            && self.from.is_none_or(|from| day >= from)
            && self.to.is_none_or(|to| day <= to)
            && self.min_amount.is_none_or(|min| tx.amount() >= min)
            && self.max_amount.is_none_or(|max| tx.amount() <= max)
    }

    /// Matching transactions, order preserved.
    #[must_use]
    pub fn apply(&self, transactions: &[Arc<Transaction>]) -> Vec<Arc<Transaction>> {
        transactions
            .iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect()
    }
}

/// Sort order for a transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSort {
    /// Most recent first.
    NewestFirst,
    /// Oldest first.
    OldestFirst,
    /// Largest amount first.
    AmountHighToLow,
    /// Smallest amount first.
    AmountLowToHigh,
    /// Deposits, then withdrawals, then transfers.
    ByType,
}

impl TransactionSort {
    /// All orders, in menu order.
    pub const ALL: [Self; 5] = [
        Self::NewestFirst,
        Self::OldestFirst,
        Self::AmountHighToLow,
        Self::AmountLowToHigh,
        Self::ByType,
    ];

    /// Menu label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NewestFirst => "Date (newest first)",
            Self::OldestFirst => "Date (oldest first)",
            Self::AmountHighToLow => "Amount (highest first)",
            Self::AmountLowToHigh => "Amount (lowest first)",
            Self::ByType => "Type",
        }
    }

    /// Sorts in place. Stable, so ties keep their prior order.
    pub fn apply(&self, transactions: &mut [Arc<Transaction>]) {
        match self {
            Self::NewestFirst => {
                transactions.sort_by_key(|tx| std::cmp::Reverse(tx.created_at()));
            }
            Self::OldestFirst => transactions.sort_by_key(|tx| tx.created_at()),
            Self::AmountHighToLow => {
                transactions.sort_by_key(|tx| std::cmp::Reverse(tx.amount()));
            }
            Self::AmountLowToHigh => transactions.sort_by_key(|tx| tx.amount()),
            Self::ByType => transactions.sort_by_key(|tx| tx.kind()),
        }
    }
}

/// How a transaction looks from one viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Money arrived.
    Incoming,
    /// Money left.
    Outgoing,
    /// Moved between accounts of the same customer.
    Internal,
}

impl Direction {
    /// Sign shown before the amount.
    #[must_use]
    pub const fn sign(&self) -> &'static str {
        match self {
            Self::Incoming => "+",
            Self::Outgoing => "-",
            Self::Internal => "",
        }
    }
}

/// Direction of `tx` for a viewer owning `accounts`.
///
/// Pass one account for an account view, all of a customer's accounts for a
/// customer view; only the latter can yield [`Direction::Internal`].
#[must_use]
pub fn direction_for(tx: &Transaction, accounts: &HashSet<AccountId>) -> Direction {
    if tx.kind() == TransactionType::Transfer
        && accounts.len() > 1
        && accounts.contains(&tx.source())
        && accounts.contains(&tx.destination())
    {
        return Direction::Internal;
    }
    if accounts.iter().any(|&account| tx.is_incoming_for(account)) {
        Direction::Incoming
    } else {
        Direction::Outgoing
    }
}
