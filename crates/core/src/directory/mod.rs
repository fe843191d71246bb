//! Customer and account directory.
//!
//! The directory owns customer records and the shared account handles. It is
//! the only place accounts are opened or closed; the transaction service
//! resolves handles through it.

pub mod error;
pub mod service;
pub mod types;


pub use error::DirectoryError;
pub use service::Directory;
pub use types::{Customer, CustomerQuery, CustomerUpdate};
