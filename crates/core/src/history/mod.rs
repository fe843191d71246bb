//! History filtering, sorting, and per-viewer direction.

pub mod filter;

pub use filter::{Direction, TransactionFilter, TransactionSort, direction_for};
