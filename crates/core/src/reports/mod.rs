//! Statistics reports.
//!
//! Pure functions over account snapshots and ledger copies:
//! - Account statement
//! - Customer summary (transfers between a customer's own accounts are internal)
//! - System summary

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::ReportService;
pub use types::*;
