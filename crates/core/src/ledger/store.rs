//! Global transaction store.
//!
//! Lock order: account locks first (ascending id), then the store lock. Every
//! mutation that touches both follows that order.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use tracing::debug;

use cashdesk_shared::types::{AccountId, TransactionId};

use super::error::LedgerError;
use super::transaction::Transaction;
use crate::account::{AccountHandle, LockedAccounts};

/// Append-only, chronological collection of recorded transactions.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: RwLock<Vec<Arc<Transaction>>>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `tx` to its account(s) and appends it to the store, as one unit.
    ///
    /// For a deposit or withdrawal pass the same handle twice (or `None` as
    /// destination); for a transfer pass both handles. If the destination fails
    /// after the source was applied, the source is rolled back and nothing is
    /// recorded.
    ///
    /// No screening happens here. This is the back-office path for loading
    /// existing data such as the demo seed; customer postings go through
    /// [`crate::service::TransactionService`], which validates and screens first.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if a handle is missing or does not match the transaction
    /// - `NegativeAmount` if the amount is not positive
    /// - whatever [`crate::account::Account::attach`] raises
    /// - `Internal` on a poisoned lock
    pub fn record(
        &self,
        tx: Transaction,
        source: Option<&AccountHandle>,
        destination: Option<&AccountHandle>,
    ) -> Result<Arc<Transaction>, LedgerError> {
        let source = source.ok_or_else(|| {
            LedgerError::AccountNotFound(format!("source account {} is absent", tx.source()))
        })?;
        let destination = match destination {
            Some(handle) => handle,
            None if tx.source() == tx.destination() => source,
            None => {
                return Err(LedgerError::AccountNotFound(format!(
                    "destination account {} is absent",
                    tx.destination()
                )));
            }
        };

        if source.id() != tx.source() || destination.id() != tx.destination() {
            return Err(LedgerError::AccountNotFound(format!(
                "handles {}/{} do not match transaction accounts {}/{}",
                source.id(),
                destination.id(),
                tx.source(),
                tx.destination()
            )));
        }

        if tx.amount() <= Decimal::ZERO {
            return Err(LedgerError::NegativeAmount(tx.amount()));
        }

        let tx = Arc::new(tx);
        let mut locked = LockedAccounts::acquire(&[source, destination])?;
        let checkpoint = locked.checkpoint();

        Self::apply(&mut locked, &tx)?;
        if let Err(err) = self.append(Arc::clone(&tx)) {
            locked.restore(checkpoint);
            return Err(err);
        }

        debug!(transaction_id = %tx.id(), kind = %tx.kind(), amount = %tx.amount(), "recorded");
        Ok(tx)
    }

    /// Attaches `tx` to the source, then to the destination if it differs.
    ///
    /// Accounts already locked by the caller. On failure every locked account is
    /// restored to its state before the call.
    pub(crate) fn apply(
        locked: &mut LockedAccounts<'_>,
        tx: &Arc<Transaction>,
    ) -> Result<(), LedgerError> {
        let checkpoint = locked.checkpoint();
        let result = Self::attach_to(locked, tx.source(), tx).and_then(|()| {
            if tx.destination() == tx.source() {
                Ok(())
            } else {
                Self::attach_to(locked, tx.destination(), tx)
            }
        });

        if result.is_err() {
            locked.restore(checkpoint);
        }
        result
    }

    fn attach_to(
        locked: &mut LockedAccounts<'_>,
        account: AccountId,
        tx: &Arc<Transaction>,
    ) -> Result<(), LedgerError> {
        locked
            .get_mut(account)
            .ok_or_else(|| LedgerError::AccountNotFound(format!("account {account} is not locked")))?
            .attach(Arc::clone(tx))
    }

    fn append(&self, tx: Arc<Transaction>) -> Result<(), LedgerError> {
        self.write()?.push(tx);
        Ok(())
    }

    /// Removes `id` from the histories of `accounts`, then from the store.
    ///
    /// No balance is recalculated. Histories are edited first, so a failure
    /// leaves the store untouched and the caller can restore the accounts from a
    /// checkpoint. Returns the stored entry, or `None` if the id was never in the
    /// store (compensating transactions are not).
    pub(crate) fn erase(
        &self,
        locked: &mut LockedAccounts<'_>,
        id: TransactionId,
        accounts: &[AccountId],
    ) -> Result<Option<Arc<Transaction>>, LedgerError> {
        for &account in accounts {
            let entry = locked.get_mut(account).ok_or_else(|| {
                LedgerError::LedgerInconsistency(format!("account {account} is not locked"))
            })?;
            if entry.detach(id).is_none() {
                return Err(LedgerError::LedgerInconsistency(format!(
                    "transaction {id} missing from history of account {account}"
                )));
            }
        }

        let mut entries = self.write()?;
        let removed = entries
            .iter()
            .position(|tx| tx.id() == id)
            .map(|index| entries.remove(index));
        Ok(removed)
    }

    /// Chronological copy of every recorded transaction.
    pub fn all(&self) -> Result<Vec<Arc<Transaction>>, LedgerError> {
        Ok(self.read()?.clone())
    }

    /// Looks up a recorded transaction.
    pub fn find(&self, id: TransactionId) -> Result<Option<Arc<Transaction>>, LedgerError> {
        Ok(self.read()?.iter().find(|tx| tx.id() == id).cloned())
    }

    /// Recorded transactions touching `account`, in chronological order.
    pub fn for_account(&self, account: AccountId) -> Result<Vec<Arc<Transaction>>, LedgerError> {
        Ok(self
            .read()?
            .iter()
            .filter(|tx| tx.involves(account))
            .cloned()
            .collect())
    }

    /// Number of recorded transactions.
    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Arc<Transaction>>>, LedgerError> {
        self.entries
            .read()
            .map_err(|_| LedgerError::Internal("ledger store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Arc<Transaction>>>, LedgerError> {
        self.entries
            .write()
            .map_err(|_| LedgerError::Internal("ledger store lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountKind};
    use crate::ledger::TransactionType;
    use cashdesk_shared::types::CustomerId;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn handle() -> AccountHandle {
        AccountHandle::new(Account::new(AccountKind::Checking, CustomerId::new(), Utc::now()))
    }

    fn deposit(account: &AccountHandle, amount: Decimal) -> Transaction {
        Transaction::new(
            TransactionType::Deposit,
            amount,
            "deposit",
            Some(account.id()),
            Some(account.id()),
            Utc::now(),
        )
        .unwrap()
    }

    fn transfer(from: &AccountHandle, to: &AccountHandle, amount: Decimal) -> Transaction {
        Transaction::new(
            TransactionType::Transfer,
            amount,
            "transfer",
            Some(from.id()),
            Some(to.id()),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_record_deposit() {
        let ledger = Ledger::new();
        let account = handle();

        let tx = ledger
            .record(deposit(&account, dec!(100)), Some(&account), None)
            .unwrap();

        assert_eq!(account.balance().unwrap(), dec!(100));
        assert_eq!(ledger.len().unwrap(), 1);
        assert_eq!(ledger.find(tx.id()).unwrap(), Some(tx));
    }

    #[test]
    fn test_record_transfer_updates_both() {
        let ledger = Ledger::new();
        let from = handle();
        let to = handle();
        ledger
            .record(deposit(&from, dec!(50)), Some(&from), Some(&from))
            .unwrap();

        ledger
            .record(transfer(&from, &to, dec!(20)), Some(&from), Some(&to))
            .unwrap();

        assert_eq!(from.balance().unwrap(), dec!(30));
        assert_eq!(to.balance().unwrap(), dec!(20));
        assert_eq!(ledger.for_account(to.id()).unwrap().len(), 1);
        assert_eq!(ledger.for_account(from.id()).unwrap().len(), 2);
    }

    #[test]
    fn test_failed_transfer_records_nothing() {
        let ledger = Ledger::new();
        let from = handle();
        let to = handle();

        let err = ledger
            .record(transfer(&from, &to, dec!(20)), Some(&from), Some(&to))
            .unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert!(ledger.is_empty().unwrap());
        assert!(from.transactions().unwrap().is_empty());
        assert!(to.transactions().unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_handle_rejected() {
        let ledger = Ledger::new();
        let account = handle();
        let other = handle();

        let err = ledger
            .record(deposit(&account, dec!(5)), Some(&other), Some(&other))
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));

        let err = ledger
            .record(deposit(&account, dec!(5)), None, None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
        assert_eq!(other.balance().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_missing_transfer_destination_rejected() {
        let ledger = Ledger::new();
        let from = handle();
        let to = handle();
        ledger
            .record(deposit(&from, dec!(50)), Some(&from), None)
            .unwrap();

        let err = ledger
            .record(transfer(&from, &to, dec!(5)), Some(&from), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
        assert_eq!(from.balance().unwrap(), dec!(50));
    }

    #[test]
    fn test_erase_removes_from_store_and_history() {
        let ledger = Ledger::new();
        let account = handle();
        let tx = ledger
            .record(deposit(&account, dec!(5)), Some(&account), None)
            .unwrap();

        let mut locked = LockedAccounts::acquire(&[&account]).unwrap();
        let removed = ledger.erase(&mut locked, tx.id(), &[account.id()]).unwrap();
        drop(locked);

        assert_eq!(removed.map(|t| t.id()), Some(tx.id()));
        assert!(ledger.is_empty().unwrap());
        assert!(account.transactions().unwrap().is_empty());
        // erase never touches balances
        assert_eq!(account.balance().unwrap(), dec!(5));
    }

    #[test]
    fn test_erase_missing_history_entry_is_inconsistency() {
        let ledger = Ledger::new();
        let account = handle();
        let tx = ledger
            .record(deposit(&account, dec!(5)), Some(&account), None)
            .unwrap();
        let stranger = handle();

        let mut locked = LockedAccounts::acquire(&[&account, &stranger]).unwrap();
        let err = ledger
            .erase(&mut locked, tx.id(), &[stranger.id()])
            .unwrap_err();
        drop(locked);

        assert!(err.is_fatal());
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_all_is_a_copy() {
        let ledger = Ledger::new();
        let account = handle();
        ledger
            .record(deposit(&account, dec!(1)), Some(&account), None)
            .unwrap();

        let mut copy = ledger.all().unwrap();
        copy.clear();
        assert_eq!(ledger.len().unwrap(), 1);
    }

    fn poison(ledger: &Arc<Ledger>) {
        let ledger = Arc::clone(ledger);
        let result = std::thread::spawn(move || {
            let _guard = ledger.entries.write().unwrap();
            panic!("writer died holding the store lock");
        })
        .join();
        assert!(result.is_err());
    }

    #[test]
    fn test_record_rolls_back_when_store_is_poisoned() {
        let ledger = Arc::new(Ledger::new());
        let account = handle();
        ledger
            .record(deposit(&account, dec!(50)), Some(&account), None)
            .unwrap();
        poison(&ledger);

        let err = ledger
            .record(deposit(&account, dec!(10)), Some(&account), None)
            .unwrap_err();

        assert!(matches!(err, LedgerError::Internal(_)));
        assert!(err.is_fatal());
        assert_eq!(account.balance().unwrap(), dec!(50));
        assert_eq!(account.transactions().unwrap().len(), 1);
        assert!(account.snapshot().unwrap().is_consistent());
    }

    #[test]
    fn test_delete_rolls_back_when_store_is_poisoned() {
        use crate::directory::Directory;
        use crate::screening::{ActivityScreener, ScreeningConfig};
        use crate::service::TransactionService;

        let directory = Arc::new(Directory::new());
        let customer = directory
            .register_customer("Omar", "Ouyacho", "omar@example.com")
            .unwrap();
        let account = directory
            .open_account(customer.id, AccountKind::Checking)
            .unwrap();
        let ledger = Arc::new(Ledger::new());
        let service = TransactionService::new(
            directory,
            Arc::clone(&ledger),
            ActivityScreener::new(ScreeningConfig::permissive()),
        );
        let tx = service.deposit(account.id(), dec!(50), "Paycheck").unwrap();
        poison(&ledger);

        let err = service
            .delete_transaction(account.id(), tx.id())
            .unwrap_err();

        assert!(matches!(err, LedgerError::LedgerInconsistency(_)));
        assert!(err.is_fatal());
        assert_eq!(account.balance().unwrap(), dec!(50));
        let history = account.transactions().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id(), tx.id());
        assert!(account.snapshot().unwrap().is_consistent());
    }
}
