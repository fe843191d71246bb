//! Core business logic for Cashdesk.
//!
//! This crate contains the ledger and screening core with ZERO console or
//! persistence dependencies. Everything lives in memory behind explicit,
//! injected components; there are no global singletons.
//!
//! # Modules
//!
//! - `account` - Balance-holding accounts and shared handles
//! - `ledger` - Transactions, the global store, and the error taxonomy
//! - `screening` - Abuse heuristics run before every posting
//! - `directory` - Customers and account lookup
//! - `service` - Deposit, withdraw, transfer, and delete orchestration
//! - `history` - Filtering and sorting of transaction lists
//! - `reports` - Account, customer, and system statistics
//! - `clock` - Injectable time source

pub mod account;
pub mod clock;
pub mod directory;
pub mod history;
pub mod ledger;
pub mod reports;
pub mod screening;
pub mod service;

pub use account::{Account, AccountHandle, AccountKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use directory::{Customer, CustomerQuery, CustomerUpdate, Directory, DirectoryError};
pub use ledger::{Ledger, LedgerError, Transaction, TransactionType};
pub use screening::{ActivityCategory, ActivityScreener, ScreeningConfig};
pub use service::TransactionService;
