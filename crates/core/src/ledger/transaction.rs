//! Transaction record.
//!
//! A `Transaction` validates itself at construction and is immutable afterwards.
//! Corrections are made by deleting and compensating, never by editing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashdesk_shared::types::{AccountId, TransactionId};

use super::error::LedgerError;

/// Kind of ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money paid into a single account.
    Deposit,
    /// Money taken out of a single account.
    Withdrawal,
    /// Money moved from one account to another.
    Transfer,
}

impl TransactionType {
    /// All transaction types, in menu order.
    pub const ALL: [Self; 3] = [Self::Deposit, Self::Withdrawal, Self::Transfer];

    /// Returns the upper-case name used in displays and screening keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAWAL" => Ok(Self::Withdrawal),
            "TRANSFER" => Ok(Self::Transfer),
            _ => Err(LedgerError::invalid(
                "creation",
                format!("unknown transaction type '{s}'"),
            )),
        }
    }
}

/// An immutable ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    id: TransactionId,
    kind: TransactionType,
    amount: Decimal,
    created_at: DateTime<Utc>,
    description: String,
    source: AccountId,
    destination: AccountId,
}

impl Transaction {
    /// Validates and seals a new transaction.
    ///
    /// Checks run in a fixed order so that each kind of defect is reported
    /// the same way every time:
    /// 1. amount must be positive
    /// 2. both account references must be present
    /// 3. description must not be blank
    /// 4. a transfer must not target its own source
    ///
    /// The type itself is already one of the three valid variants; unknown
    /// names are rejected when parsing [`TransactionType`].
    ///
    /// Deposits and withdrawals reference the same account on both sides.
    ///
    /// # Errors
    ///
    /// Returns `NegativeAmount`, `AccountNotFound` or `InvalidTransaction`.
    pub fn new(
        kind: TransactionType,
        amount: Decimal,
        description: &str,
        source: Option<AccountId>,
        destination: Option<AccountId>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NegativeAmount(amount));
        }

        let source = source.ok_or_else(|| {
            LedgerError::AccountNotFound("source account cannot be empty".to_string())
        })?;
        let destination = destination.ok_or_else(|| {
            LedgerError::AccountNotFound("destination account cannot be empty".to_string())
        })?;

        let description = description.trim();
        if description.is_empty() {
            return Err(LedgerError::invalid(
                "creation",
                "description cannot be empty",
            ));
        }

        if kind == TransactionType::Transfer && source == destination {
            return Err(LedgerError::invalid(
                "transfer",
                "cannot transfer to the same account",
            ));
        }

        Ok(Self {
            id: TransactionId::new(),
            kind,
            amount,
            created_at,
            description: description.to_string(),
            source,
            destination,
        })
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Transaction type.
    #[must_use]
    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    /// Positive amount moved.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Creation instant.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Trimmed description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Account the money leaves (or the only account, for deposits/withdrawals).
    #[must_use]
    pub fn source(&self) -> AccountId {
        self.source
    }

    /// Account the money reaches (or the only account, for deposits/withdrawals).
    #[must_use]
    pub fn destination(&self) -> AccountId {
        self.destination
    }

    /// Returns true if `account` is the source or the destination.
    #[must_use]
    pub fn involves(&self, account: AccountId) -> bool {
        self.source == account || self.destination == account
    }

    /// Returns true if the money arrives in `account`.
    ///
    /// Deposits are incoming for their account; transfers only for their destination.
    #[must_use]
    pub fn is_incoming_for(&self, account: AccountId) -> bool {
        match self.kind {
            TransactionType::Deposit | TransactionType::Transfer => self.destination == account,
            TransactionType::Withdrawal => false,
        }
    }

    /// Distinct accounts touched, source first.
    #[must_use]
    pub fn accounts(&self) -> Vec<AccountId> {
        if self.source == self.destination {
            vec![self.source]
        } else {
            vec![self.source, self.destination]
        }
    }
}
