//! Balance-holding accounts.
//!
//! - `model` - the `Account` entity and its balance invariant
//! - `handle` - shared, lockable handles and deterministic multi-account locking

pub mod handle;
pub mod model;

pub use handle::AccountHandle;
pub use model::{Account, AccountKind};

pub(crate) use handle::LockedAccounts;
