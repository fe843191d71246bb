//! Account entity.
//!
//! An account keeps an incrementally maintained balance plus the ordered list of
//! transactions that produced it. At every observable point
//! `balance == Σ signed_effect(tx)` over the history; `recompute_balance` exists
//! to audit exactly that.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashdesk_shared::types::{AccountId, CustomerId, TransactionId};

use crate::ledger::{LedgerError, Transaction, TransactionType};

/// Account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    /// Everyday account.
    Checking,
    /// Savings account.
    Savings,
}

impl AccountKind {
    /// All account kinds, in menu order.
    pub const ALL: [Self; 2] = [Self::Checking, Self::Savings];

    /// Returns the upper-case display name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CHECKING" => Ok(Self::Checking),
            "SAVINGS" => Ok(Self::Savings),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// Saved balance and history, used to roll back a multi-step mutation.
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    balance: Decimal,
    history: Vec<Arc<Transaction>>,
}

/// A customer account.
#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    kind: AccountKind,
    owner: CustomerId,
    balance: Decimal,
    history: Vec<Arc<Transaction>>,
    opened_at: DateTime<Utc>,
    closed: bool,
}

impl Account {
    /// Opens an empty account for `owner`.
    #[must_use]
    pub fn new(kind: AccountKind, owner: CustomerId, opened_at: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            kind,
            owner,
            balance: Decimal::ZERO,
            history: Vec::new(),
            opened_at,
            closed: false,
        }
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Account category.
    #[must_use]
    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Owning customer (back-reference only).
    #[must_use]
    pub fn owner(&self) -> CustomerId {
        self.owner
    }

    /// Current balance.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// When the account was opened.
    #[must_use]
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Returns true once the account has been closed in the directory.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Attached transactions in application order.
    #[must_use]
    pub fn history(&self) -> &[Arc<Transaction>] {
        &self.history
    }

    /// Owned copy of the history.
    #[must_use]
    pub fn transactions(&self) -> Vec<Arc<Transaction>> {
        self.history.clone()
    }

    /// Looks up an attached transaction.
    #[must_use]
    pub fn find(&self, id: TransactionId) -> Option<&Arc<Transaction>> {
        self.history.iter().find(|tx| tx.id() == id)
    }

    /// Effect `tx` has (or would have) on this account's balance.
    #[must_use]
    pub fn signed_effect(&self, tx: &Transaction) -> Decimal {
        let amount = tx.amount();
        match tx.kind() {
            TransactionType::Deposit if tx.destination() == self.id => amount,
            TransactionType::Withdrawal if tx.source() == self.id => -amount,
            TransactionType::Transfer => {
                let mut effect = Decimal::ZERO;
                if tx.source() == self.id {
                    effect -= amount;
                }
                if tx.destination() == self.id {
                    effect += amount;
                }
                effect
            }
            _ => Decimal::ZERO,
        }
    }

    /// Recomputes the balance from scratch.
    ///
    /// Saturates at the `Decimal` bounds, so a history that could not have been
    /// attached shows up as a mismatch rather than a panic.
    #[must_use]
    pub fn recompute_balance(&self) -> Decimal {
        self.history
            .iter()
            .map(|tx| self.signed_effect(tx))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Returns true if the stored balance matches the history.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.balance == self.recompute_balance()
    }

    /// Applies a transaction to this account and appends it to the history.
    ///
    /// A transfer only acts on the role this account plays in it: the source is
    /// debited, the destination credited. On error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransaction` for a non-positive amount or a transaction
    /// that does not involve this account, `InsufficientFunds` when a debit
    /// exceeds the balance, and `AccountNotFound` once the account is closed.
    pub fn attach(&mut self, tx: Arc<Transaction>) -> Result<(), LedgerError> {
        if self.closed {
            return Err(LedgerError::AccountNotFound(format!(
                "account {} is closed",
                self.id
            )));
        }
        let amount = tx.amount();
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid("attach", "amount must be positive"));
        }
        if !tx.involves(self.id) {
            return Err(LedgerError::invalid(
                "attach",
                format!("transaction {} does not involve account {}", tx.id(), self.id),
            ));
        }

        let balance = match tx.kind() {
            TransactionType::Deposit => self.credit(self.balance, amount)?,
            TransactionType::Withdrawal => {
                self.ensure_funds(amount)?;
                self.balance - amount
            }
            TransactionType::Transfer => {
                let mut balance = self.balance;
                if tx.source() == self.id {
                    self.ensure_funds(amount)?;
                    balance -= amount;
                }
                if tx.destination() == self.id {
                    balance = self.credit(balance, amount)?;
                }
                balance
            }
        };

        self.balance = balance;
        self.history.push(tx);
        Ok(())
    }

    fn credit(&self, balance: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
        balance.checked_add(amount).ok_or_else(|| {
            LedgerError::invalid(
                "attach",
                format!("balance of account {} would overflow", self.id),
            )
        })
    }

    fn ensure_funds(&self, required: Decimal) -> Result<(), LedgerError> {
        if self.balance < required {
            return Err(LedgerError::InsufficientFunds {
                required,
                available: self.balance,
            });
        }
        Ok(())
    }

    /// Removes a transaction from the history without touching the balance.
    pub(crate) fn detach(&mut self, id: TransactionId) -> Option<Arc<Transaction>> {
        let index = self.history.iter().position(|tx| tx.id() == id)?;
        Some(self.history.remove(index))
    }

    /// Marks the account closed. Only an account without history can be closed.
    pub(crate) fn close(&mut self) -> bool {
        if !self.history.is_empty() {
            return false;
        }
        self.closed = true;
        true
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            balance: self.balance,
            history: self.history.clone(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.balance = checkpoint.balance;
        self.history = checkpoint.history;
    }
}
