//! Transaction service.
//!
//! Orchestrates deposits, withdrawals, transfers, and deletions: validate,
//! screen, then hand the mutation to the ledger.
//!
//! - `transactions` - the `TransactionService` itself
//! - `reversal` - compensating transactions for the deletion flow
//! - `types` - audit results

pub mod reversal;
pub mod transactions;
pub mod types;

#[cfg(test)]
mod service_props;

pub use reversal::ReversalService;
pub use transactions::TransactionService;
pub use types::{AuditReport, BalanceMismatch};
