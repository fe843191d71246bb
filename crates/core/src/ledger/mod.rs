//! Ledger module: transactions and the global chronological store.
//!
//! - `transaction` - the immutable, self-validating `Transaction`
//! - `store` - the `Ledger` that applies transactions to accounts and records them
//! - `error` - the `LedgerError` taxonomy shared by the whole core

pub mod error;
pub mod store;
pub mod transaction;

pub use error::LedgerError;
pub use store::Ledger;
pub use transaction::{Transaction, TransactionType};
