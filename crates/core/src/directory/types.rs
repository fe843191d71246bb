//! Directory domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cashdesk_shared::types::CustomerId;

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    /// Unique identifier.
    pub id: CustomerId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email, stored in lower case and unique.
    pub email: String,
    /// When the customer was registered.
    pub registered_at: DateTime<Utc>,
}

impl Customer {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Changes to a customer record. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerUpdate {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New email.
    pub email: Option<String>,
}

impl CustomerUpdate {
    /// An update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the given name.
    #[must_use]
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Sets the family name.
    #[must_use]
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Typed customer lookup. Text queries compare case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerQuery {
    /// By identifier.
    Id(CustomerId),
    /// By email.
    Email(String),
    /// By first name.
    FirstName(String),
    /// By last name.
    LastName(String),
}

impl CustomerQuery {
    /// Returns true if `customer` satisfies the query.
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        match self {
            Self::Id(id) => customer.id == *id,
            Self::Email(email) => eq_ignore_case(&customer.email, email),
            Self::FirstName(name) => eq_ignore_case(&customer.first_name, name),
            Self::LastName(name) => eq_ignore_case(&customer.last_name, name),
        }
    }
}

fn eq_ignore_case(stored: &str, query: &str) -> bool {
    stored.to_lowercase() == query.trim().to_lowercase()
}
