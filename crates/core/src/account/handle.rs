//! Shared account handles.
//!
//! Accounts live behind `Arc<Mutex<_>>` with the id copied outside the lock so
//! callers can order lock acquisition without locking first. Mutable access is
//! crate-private: outside the crate an account can only be read or copied.

use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;

use cashdesk_shared::types::AccountId;

use super::model::{Account, Checkpoint};
use crate::ledger::{LedgerError, Transaction};

/// Cloneable reference to a shared account.
#[derive(Debug, Clone)]
pub struct AccountHandle {
    id: AccountId,
    inner: Arc<Mutex<Account>>,
}

impl AccountHandle {
    /// Wraps an account for sharing.
    #[must_use]
    pub fn new(account: Account) -> Self {
        Self {
            id: account.id(),
            inner: Arc::new(Mutex::new(account)),
        }
    }

    /// Account id, readable without locking.
    #[must_use]
    pub fn id(&self) -> AccountId {
        self.id
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Account>, LedgerError> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::Internal(format!("account {} lock poisoned", self.id)))
    }

    /// Runs `f` against the account under its lock.
    pub fn read<T>(&self, f: impl FnOnce(&Account) -> T) -> Result<T, LedgerError> {
        let account = self.lock()?;
        Ok(f(&account))
    }

    /// Detached copy of the account.
    pub fn snapshot(&self) -> Result<Account, LedgerError> {
        self.read(Clone::clone)
    }

    /// Current balance.
    pub fn balance(&self) -> Result<Decimal, LedgerError> {
        self.read(Account::balance)
    }

    /// Copy of the ordered history.
    pub fn transactions(&self) -> Result<Vec<Arc<Transaction>>, LedgerError> {
        self.read(Account::transactions)
    }
}

/// Guards over one or more accounts, acquired in ascending id order.
pub(crate) struct LockedAccounts<'a> {
    guards: Vec<MutexGuard<'a, Account>>,
}

impl<'a> LockedAccounts<'a> {
    /// Locks every distinct account in `handles`, lowest id first.
    pub(crate) fn acquire(handles: &[&'a AccountHandle]) -> Result<Self, LedgerError> {
        let mut ordered = handles.to_vec();
        ordered.sort_by_key(|handle| handle.id());
        ordered.dedup_by_key(|handle| handle.id());

        let mut guards = Vec::with_capacity(ordered.len());
        for handle in ordered {
            guards.push(handle.lock()?);
        }
        Ok(Self { guards })
    }

    pub(crate) fn get(&self, id: AccountId) -> Option<&Account> {
        self.guards
            .iter()
            .find(|guard| guard.id() == id)
            .map(|guard| &**guard)
    }

    pub(crate) fn get_mut(&mut self, id: AccountId) -> Option<&mut Account> {
        self.guards
            .iter_mut()
            .find(|guard| guard.id() == id)
            .map(|guard| &mut **guard)
    }

    pub(crate) fn checkpoint(&self) -> Vec<Checkpoint> {
        self.guards.iter().map(|guard| guard.checkpoint()).collect()
    }

    /// Restores checkpoints taken by [`Self::checkpoint`] on the same guards.
    pub(crate) fn restore(&mut self, checkpoints: Vec<Checkpoint>) {
        for (guard, checkpoint) in self.guards.iter_mut().zip(checkpoints) {
            guard.restore(checkpoint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountKind;
    use cashdesk_shared::types::CustomerId;
    use chrono::Utc;

    fn handle() -> AccountHandle {
        AccountHandle::new(Account::new(AccountKind::Savings, CustomerId::new(), Utc::now()))
    }

    #[test]
    fn test_handle_id_matches_account() {
        let handle = handle();
        assert_eq!(handle.snapshot().unwrap().id(), handle.id());
        assert_eq!(handle.balance().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_acquire_dedups_and_orders() {
        let a = handle();
        let b = handle();
        let locked = LockedAccounts::acquire(&[&b, &a, &b]).unwrap();

        assert_eq!(locked.guards.len(), 2);
        assert!(locked.guards[0].id() < locked.guards[1].id());
        assert!(locked.get(a.id()).is_some());
        assert!(locked.get(AccountId::new()).is_none());
    }

    #[test]
    fn test_poisoned_lock_is_internal_error() {
        let handle = handle();
        let clone = handle.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.inner.lock().unwrap();
            panic!("poison");
        })
        .join();

        let err = handle.balance().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
