//! Directory operations.
//!
//! Lock order: customers, then accounts, then an individual account. Handles
//! are cloned out before any account is locked for a posting, so postings never
//! hold a directory lock.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use cashdesk_shared::types::{AccountId, CustomerId};

use super::error::DirectoryError;
use super::types::{Customer, CustomerQuery, CustomerUpdate};
use crate::account::{Account, AccountHandle, AccountKind};
use crate::clock::{Clock, SystemClock};

/// In-memory registry of customers and their accounts, in registration order.
#[derive(Debug)]
pub struct Directory {
    customers: RwLock<Vec<Customer>>,
    accounts: RwLock<Vec<AccountHandle>>,
    clock: Arc<dyn Clock>,
}

impl Default for Directory {
    fn default() -> Self {
        Self {
            customers: RwLock::default(),
            accounts: RwLock::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl Directory {
    /// Creates an empty directory stamping records with wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the source of registration and opening timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Registers a customer. Fields are trimmed and the email is stored in
    /// lower case; it must be unique.
    pub fn register_customer(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Customer, DirectoryError> {
        let first_name = required("First name", first_name)?;
        let last_name = required("Last name", last_name)?;
        let email = required("Email", email)?.to_lowercase();

        let mut customers = write(&self.customers)?;
        let query = CustomerQuery::Email(email.clone());
        if customers.iter().any(|c| query.matches(c)) {
            return Err(DirectoryError::DuplicateEmail(email));
        }

        let customer = Customer {
            id: CustomerId::new(),
            first_name,
            last_name,
            email,
            registered_at: self.clock.now(),
        };
        customers.push(customer.clone());

        info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    /// First customer matching `query`.
    pub fn find_customer(&self, query: &CustomerQuery) -> Result<Option<Customer>, DirectoryError> {
        Ok(read(&self.customers)?
            .iter()
            .find(|c| query.matches(c))
            .cloned())
    }

    /// Every customer matching `query`, in registration order.
    pub fn search_customers(&self, query: &CustomerQuery) -> Result<Vec<Customer>, DirectoryError> {
        Ok(read(&self.customers)?
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect())
    }

    /// Applies `update` to a customer and returns the new record.
    ///
    /// Every provided field is validated before anything changes. A new email
    /// must not belong to another customer.
    pub fn update_customer(
        &self,
        id: CustomerId,
        update: &CustomerUpdate,
    ) -> Result<Customer, DirectoryError> {
        let first_name = update
            .first_name
            .as_deref()
            .map(|v| required("First name", v))
            .transpose()?;
        let last_name = update
            .last_name
            .as_deref()
            .map(|v| required("Last name", v))
            .transpose()?;
        let email = update
            .email
            .as_deref()
            .map(|v| required("Email", v).map(|e| e.to_lowercase()))
            .transpose()?;

        let mut customers = write(&self.customers)?;
        let index = customers
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DirectoryError::CustomerNotFound(id.to_string()))?;

        if let Some(email) = &email {
            let query = CustomerQuery::Email(email.clone());
            if customers.iter().any(|c| c.id != id && query.matches(c)) {
                return Err(DirectoryError::DuplicateEmail(email.clone()));
            }
        }

        let customer = &mut customers[index];
        if let Some(first_name) = first_name {
            customer.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            customer.last_name = last_name;
        }
        if let Some(email) = email {
            customer.email = email;
        }

        info!(customer_id = %id, "customer updated");
        Ok(customer.clone())
    }

    /// Customer by id.
    pub fn customer(&self, id: CustomerId) -> Result<Customer, DirectoryError> {
        self.find_customer(&CustomerQuery::Id(id))?
            .ok_or_else(|| DirectoryError::CustomerNotFound(id.to_string()))
    }

    /// Every customer, in registration order.
    pub fn customers(&self) -> Result<Vec<Customer>, DirectoryError> {
        Ok(read(&self.customers)?.clone())
    }

    /// Opens an empty account of `kind` for `owner`.
    ///
    /// A customer holds at most one account per kind.
    pub fn open_account(
        &self,
        owner: CustomerId,
        kind: AccountKind,
    ) -> Result<AccountHandle, DirectoryError> {
        let customers = read(&self.customers)?;
        if !customers.iter().any(|c| c.id == owner) {
            return Err(DirectoryError::CustomerNotFound(owner.to_string()));
        }

        let mut accounts = write(&self.accounts)?;
        for handle in accounts.iter() {
            let (account_owner, account_kind) = handle.read(|a| (a.owner(), a.kind()))?;
            if account_owner == owner && account_kind == kind {
                return Err(DirectoryError::DuplicateAccountKind {
                    customer: owner,
                    kind,
                });
            }
        }

        let handle = AccountHandle::new(Account::new(kind, owner, self.clock.now()));
        accounts.push(handle.clone());

        info!(customer_id = %owner, account_id = %handle.id(), %kind, "account opened");
        Ok(handle)
    }

    /// Account by id, if present.
    pub fn find_account(&self, id: AccountId) -> Result<Option<AccountHandle>, DirectoryError> {
        Ok(read(&self.accounts)?
            .iter()
            .find(|h| h.id() == id)
            .cloned())
    }

    /// Account by id.
    pub fn account(&self, id: AccountId) -> Result<AccountHandle, DirectoryError> {
        self.find_account(id)?
            .ok_or(DirectoryError::AccountNotFound(id))
    }

    /// Every account, in opening order.
    pub fn accounts(&self) -> Result<Vec<AccountHandle>, DirectoryError> {
        Ok(read(&self.accounts)?.clone())
    }

    /// Accounts owned by `customer`, in opening order.
    pub fn accounts_of(&self, customer: CustomerId) -> Result<Vec<AccountHandle>, DirectoryError> {
        let mut owned = Vec::new();
        for handle in self.accounts()? {
            if handle.read(Account::owner)? == customer {
                owned.push(handle);
            }
        }
        Ok(owned)
    }

    /// Owner of `account`.
    pub fn owner_of(&self, account: AccountId) -> Result<Customer, DirectoryError> {
        let owner = self.account(account)?.read(Account::owner)?;
        self.customer(owner)
    }

    /// Every account except `exclude`, for picking a transfer destination.
    pub fn transfer_targets(&self, exclude: AccountId) -> Result<Vec<AccountHandle>, DirectoryError> {
        Ok(read(&self.accounts)?
            .iter()
            .filter(|h| h.id() != exclude)
            .cloned()
            .collect())
    }

    /// Closes and removes an account that has no transactions.
    pub fn close_account(&self, id: AccountId) -> Result<(), DirectoryError> {
        let mut accounts = write(&self.accounts)?;
        let index = accounts
            .iter()
            .position(|h| h.id() == id)
            .ok_or(DirectoryError::AccountNotFound(id))?;

        if !accounts[index].lock()?.close() {
            return Err(DirectoryError::AccountHasTransactions(id));
        }
        accounts.remove(index);

        info!(account_id = %id, "account closed");
        Ok(())
    }

    /// Removes a customer that holds no accounts.
    pub fn remove_customer(&self, id: CustomerId) -> Result<Customer, DirectoryError> {
        let mut customers = write(&self.customers)?;
        let index = customers
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DirectoryError::CustomerNotFound(id.to_string()))?;

        for handle in read(&self.accounts)?.iter() {
            if handle.read(Account::owner)? == id {
                return Err(DirectoryError::CustomerHasAccounts(id));
            }
        }

        let customer = customers.remove(index);
        info!(customer_id = %id, "customer removed");
        Ok(customer)
    }
}

fn required(field: &str, value: &str) -> Result<String, DirectoryError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DirectoryError::InvalidCustomer(format!(
            "{field} cannot be empty"
        )));
    }
    Ok(value.to_string())
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, DirectoryError> {
    lock.read()
        .map_err(|_| DirectoryError::Internal("directory lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, DirectoryError> {
    lock.write()
        .map_err(|_| DirectoryError::Internal("directory lock poisoned".to_string()))
}
