//! Transaction orchestration.
//!
//! Every operation validates and screens before anything is locked for
//! mutation. Mutations go through the ledger, which holds the account locks.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use cashdesk_shared::types::{AccountId, AmountParseError, CustomerId, TransactionId, parse_amount};

use super::reversal::ReversalService;
use super::types::{AuditReport, BalanceMismatch};
use crate::account::{AccountHandle, LockedAccounts};
use crate::clock::{Clock, SystemClock};
use crate::directory::Directory;
use crate::history::{TransactionFilter, TransactionSort};
use crate::ledger::{Ledger, LedgerError, Transaction, TransactionType};
use crate::reports::{AccountStatement, ReportService};
use crate::screening::ActivityScreener;

/// Deposit, withdraw, transfer, and delete on top of a directory and a ledger.
pub struct TransactionService {
    directory: Arc<Directory>,
    ledger: Arc<Ledger>,
    screener: ActivityScreener,
    clock: Arc<dyn Clock>,
}

impl TransactionService {
    /// Creates a service stamping transactions with wall-clock time.
    #[must_use]
    pub fn new(directory: Arc<Directory>, ledger: Arc<Ledger>, screener: ActivityScreener) -> Self {
        Self {
            directory,
            ledger,
            screener,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the timestamp source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Underlying directory.
    #[must_use]
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Underlying ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Active screener.
    #[must_use]
    pub fn screener(&self) -> &ActivityScreener {
        &self.screener
    }

    /// Parses a raw amount string, e.g. from console input.
    pub fn parse_amount(raw: &str) -> Result<Decimal, AmountParseError> {
        parse_amount(raw)
    }

    /// Pays `amount` into `account`.
    ///
    /// # Errors
    ///
    /// `NegativeAmount`, `AccountNotFound`, `InvalidTransaction` (blank
    /// description), or `SuspiciousActivity`.
    pub fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Arc<Transaction>, LedgerError> {
        ensure_positive(amount)?;
        let handle = self.resolve(account)?;

        let candidate = self.candidate(TransactionType::Deposit, amount, description, &handle, &handle)?;
        self.screen(&handle, &candidate)?;

        let tx = self.ledger.record(candidate, Some(&handle), None)?;
        info!(account_id = %account, transaction_id = %tx.id(), %amount, "deposit posted");
        Ok(tx)
    }

    /// Takes `amount` out of `account`.
    ///
    /// # Errors
    ///
    /// As [`Self::deposit`], plus `InsufficientFunds`.
    pub fn withdraw(
        &self,
        account: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Arc<Transaction>, LedgerError> {
        ensure_positive(amount)?;
        let handle = self.resolve(account)?;
        ensure_funds(&handle, amount)?;

        let candidate =
            self.candidate(TransactionType::Withdrawal, amount, description, &handle, &handle)?;
        self.screen(&handle, &candidate)?;

        let tx = self.ledger.record(candidate, Some(&handle), None)?;
        info!(account_id = %account, transaction_id = %tx.id(), %amount, "withdrawal posted");
        Ok(tx)
    }

    /// Moves `amount` from `source` to `destination`.
    ///
    /// Screening looks at the source's history only.
    ///
    /// # Errors
    ///
    /// `NegativeAmount`, `AccountNotFound`, `InvalidTransaction` (same account
    /// or blank description), `InsufficientFunds`, or `SuspiciousActivity`.
    pub fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<Arc<Transaction>, LedgerError> {
        ensure_positive(amount)?;
        let from = self.resolve(source)?;
        let to = self.resolve(destination)?;
        if source == destination {
            return Err(LedgerError::invalid(
                "transfer",
                "cannot transfer to the same account",
            ));
        }
        ensure_funds(&from, amount)?;

        let candidate = self.candidate(TransactionType::Transfer, amount, description, &from, &to)?;
        self.screen(&from, &candidate)?;

        let tx = self.ledger.record(candidate, Some(&from), Some(&to))?;
        info!(
            source_id = %source,
            destination_id = %destination,
            transaction_id = %tx.id(),
            %amount,
            "transfer posted"
        );
        Ok(tx)
    }

    /// Deletes a transaction from `account`'s history.
    ///
    /// The original's effect is neutralized by a compensating transaction,
    /// then both are removed from the ledger and from every account history,
    /// so balances stay equal to their histories. Returns the deleted
    /// transaction.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if an involved account is gone
    /// - `InvalidTransaction` if the transaction is not in the account's history,
    ///   or if the reversal fails (e.g. the transfer's destination has spent the
    ///   money); nothing changes
    /// - `LedgerInconsistency` if removal fails after compensation; the accounts
    ///   are rolled back before returning
    pub fn delete_transaction(
        &self,
        account: AccountId,
        transaction: TransactionId,
    ) -> Result<Arc<Transaction>, LedgerError> {
        let handle = self.resolve(account)?;
        let original = handle
            .read(|a| a.find(transaction).cloned())?
            .ok_or_else(|| not_in_history(transaction, account))?;

        let mut handles = Vec::with_capacity(2);
        for id in original.accounts() {
            handles.push(if id == account {
                handle.clone()
            } else {
                self.resolve(id)?
            });
        }
        let compensation = Arc::new(ReversalService::compensating(&original, self.clock.now())?);

        let refs: Vec<&AccountHandle> = handles.iter().collect();
        let mut locked = LockedAccounts::acquire(&refs)?;
        if locked
            .get(account)
            .and_then(|a| a.find(transaction))
            .is_none()
        {
            return Err(not_in_history(transaction, account));
        }
        let checkpoint = locked.checkpoint();

        if let Err(err) = Ledger::apply(&mut locked, &compensation) {
            warn!(account_id = %account, transaction_id = %transaction, %err, "reversal failed");
            return Err(LedgerError::invalid(
                "reversal",
                format!("cannot reverse transaction {transaction}: {err}"),
            ));
        }

        let involved = original.accounts();
        let removed = self
            .ledger
            .erase(&mut locked, compensation.id(), &involved)
            .and_then(|_| self.ledger.erase(&mut locked, transaction, &involved));

        let failure = match removed {
            Ok(Some(_)) => involved
                .iter()
                .find(|&&id| locked.get(id).is_some_and(|a| !a.is_consistent()))
                .map(|id| format!("account {id} does not balance after deleting {transaction}")),
            Ok(None) => Some(format!("transaction {transaction} missing from the ledger")),
            Err(err) => Some(err.to_string()),
        };
        if let Some(detail) = failure {
            locked.restore(checkpoint);
            error!(account_id = %account, transaction_id = %transaction, %detail, "deletion rolled back");
            return Err(LedgerError::LedgerInconsistency(detail));
        }

        info!(account_id = %account, transaction_id = %transaction, "transaction deleted");
        Ok(original)
    }

    /// Ordered copy of an account's history.
    pub fn history(&self, account: AccountId) -> Result<Vec<Arc<Transaction>>, LedgerError> {
        self.resolve(account)?.transactions()
    }

    /// Every transaction touching `customer`'s accounts, oldest first.
    ///
    /// A transfer between two of the customer's accounts is listed once.
    pub fn customer_transactions(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<Arc<Transaction>>, LedgerError> {
        self.directory.customer(customer)?;

        let mut seen = HashSet::new();
        let mut transactions = Vec::new();
        for handle in self.directory.accounts_of(customer)? {
            transactions.extend(
                handle
                    .transactions()?
                    .into_iter()
                    .filter(|tx| seen.insert(tx.id())),
            );
        }
        TransactionSort::OldestFirst.apply(&mut transactions);
        Ok(transactions)
    }

    /// Recorded transactions across the whole ledger that pass `filter`.
    ///
    /// Chronological unless a `sort` is given.
    pub fn search(
        &self,
        filter: &TransactionFilter,
        sort: Option<TransactionSort>,
    ) -> Result<Vec<Arc<Transaction>>, LedgerError> {
        let mut found = filter.apply(&self.ledger.all()?);
        if let Some(sort) = sort {
            sort.apply(&mut found);
        }
        Ok(found)
    }

    /// Statistics for one account.
    pub fn account_statement(&self, account: AccountId) -> Result<AccountStatement, LedgerError> {
        let snapshot = self.resolve(account)?.snapshot()?;
        Ok(ReportService::account_statement(&snapshot))
    }

    /// Recomputes every account's balance from its history and compares.
    pub fn audit(&self) -> Result<AuditReport, LedgerError> {
        let accounts = self.directory.accounts()?;
        let mut report = AuditReport {
            accounts_checked: accounts.len(),
            mismatches: Vec::new(),
        };

        for handle in &accounts {
            let (stored, recomputed) = handle.read(|a| (a.balance(), a.recompute_balance()))?;
            if stored != recomputed {
                error!(account_id = %handle.id(), %stored, %recomputed, "balance mismatch");
                report.mismatches.push(BalanceMismatch {
                    account: handle.id(),
                    stored,
                    recomputed,
                });
            }
        }

        Ok(report)
    }

    fn resolve(&self, account: AccountId) -> Result<AccountHandle, LedgerError> {
        self.directory
            .find_account(account)?
            .ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))
    }

    fn candidate(
        &self,
        kind: TransactionType,
        amount: Decimal,
        description: &str,
        source: &AccountHandle,
        destination: &AccountHandle,
    ) -> Result<Transaction, LedgerError> {
        Transaction::new(
            kind,
            amount,
            description,
            Some(source.id()),
            Some(destination.id()),
            self.clock.now(),
        )
    }

    fn screen(&self, account: &AccountHandle, candidate: &Transaction) -> Result<(), LedgerError> {
        let history = account.transactions()?;
        if let Some(flag) = self.screener.detect(&history, candidate) {
            warn!(
                account_id = %account.id(),
                category = %flag.category,
                detail = %flag.detail,
                "transaction blocked by screening"
            );
            return Err(flag.into());
        }
        Ok(())
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NegativeAmount(amount));
    }
    Ok(())
}

fn ensure_funds(account: &AccountHandle, required: Decimal) -> Result<(), LedgerError> {
    let available = account.balance()?;
    if required > available {
        return Err(LedgerError::InsufficientFunds {
            required,
            available,
        });
    }
    Ok(())
}

fn not_in_history(transaction: TransactionId, account: AccountId) -> LedgerError {
    LedgerError::invalid(
        "deletion",
        format!("transaction {transaction} not found in account {account}"),
    )
}
