//! Compensating transactions.
//!
//! A posted transaction is never edited. Deleting one first applies its mirror
//! image, then removes both from storage.

use chrono::{DateTime, Utc};

use crate::ledger::{LedgerError, Transaction, TransactionType};

/// Stateless builder for compensating transactions.
pub struct ReversalService;

impl ReversalService {
    /// Builds the transaction that cancels `original`.
    ///
    /// | original   | compensating | source               | destination     |
    /// |------------|--------------|----------------------|-----------------|
    /// | DEPOSIT    | WITHDRAWAL   | original source      | original source |
    /// | WITHDRAWAL | DEPOSIT      | original source      | original source |
    /// | TRANSFER   | TRANSFER     | original destination | original source |
    ///
    /// The amount is unchanged.
    pub fn compensating(
        original: &Transaction,
        created_at: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let (kind, source, destination) = match original.kind() {
            TransactionType::Deposit => (
                TransactionType::Withdrawal,
                original.source(),
                original.source(),
            ),
            TransactionType::Withdrawal => (
                TransactionType::Deposit,
                original.source(),
                original.source(),
            ),
            TransactionType::Transfer => (
                TransactionType::Transfer,
                original.destination(),
                original.source(),
            ),
        };

        Transaction::new(
            kind,
            original.amount(),
            &Self::description(original.kind()),
            Some(source),
            Some(destination),
            created_at,
        )
    }

    fn description(kind: TransactionType) -> String {
        format!("Reversal of deleted {}", kind.as_str().to_lowercase())
    }
}
