//! Amount parsing and formatting.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` end to end; raw console input is parsed here
//! so that malformed numbers fail with their own error class before any domain logic runs.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Raw numeric input could not be turned into an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    /// Nothing was entered.
    #[error("Amount is empty")]
    Empty,

    /// Input is not a decimal number.
    #[error("Invalid amount format: '{0}'")]
    Malformed(String),
}

/// Parses a raw amount string such as `"12.50"` or `"1e3"`.
///
/// Sign is preserved: rejecting non-positive amounts is a business rule and
/// belongs to the ledger, not to parsing.
///
/// # Errors
///
/// Returns [`AmountParseError`] if the input is empty or not a decimal number.
pub fn parse_amount(raw: &str) -> Result<Decimal, AmountParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountParseError::Empty);
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AmountParseError::Malformed(trimmed.to_string()))
}

/// Formats an amount with two decimal places and no digit grouping, e.g. `$1000.00`.
#[must_use]
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    let rounded = amount.round_dp(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{symbol}{:.2}", rounded.abs())
    } else {
        format!("{symbol}{:.2}", rounded.abs())
    }
}
