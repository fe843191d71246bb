//! Activity screening.
//!
//! A stateless rule evaluator run before every posting. It looks at an
//! account's history plus the candidate transaction and flags abuse patterns:
//! - high value: a single amount above the configured limit
//! - burst: too many transactions inside a sliding time window
//! - repetitive: too many transactions sharing type, amount, and destination

pub mod config;
pub mod screener;

#[cfg(test)]
mod screener_props;

pub use config::ScreeningConfig;
pub use screener::{ActivityCategory, ActivityScreener, SuspiciousActivity};
