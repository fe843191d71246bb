//! Rule evaluation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use cashdesk_shared::types::AccountId;

use super::config::ScreeningConfig;
use crate::ledger::{LedgerError, Transaction, TransactionType};

/// Which rule flagged a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityCategory {
    /// Single amount above the limit.
    HighValueTransaction,
    /// Too many transactions inside the window.
    RapidTransactions,
    /// Too many transactions with the same type, amount, and destination.
    RepetitivePattern,
}

impl ActivityCategory {
    /// Returns the stable upper-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HighValueTransaction => "HIGH_VALUE_TRANSACTION",
            Self::RapidTransactions => "RAPID_TRANSACTIONS",
            Self::RepetitivePattern => "REPETITIVE_PATTERN",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A screening flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspiciousActivity {
    /// Rule that matched.
    pub category: ActivityCategory,
    /// Human-readable explanation.
    pub detail: String,
}

impl From<SuspiciousActivity> for LedgerError {
    fn from(flag: SuspiciousActivity) -> Self {
        Self::SuspiciousActivity {
            category: flag.category,
            detail: flag.detail,
        }
    }
}

/// Stateless abuse-pattern evaluator.
#[derive(Debug, Clone, Default)]
pub struct ActivityScreener {
    config: ScreeningConfig,
}

impl ActivityScreener {
    /// Creates a screener with the given thresholds.
    #[must_use]
    pub fn new(config: ScreeningConfig) -> Self {
        Self { config }
    }

    /// Active thresholds.
    #[must_use]
    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Rejects `candidate` if any rule matches.
    ///
    /// # Errors
    ///
    /// Returns `SuspiciousActivity` carrying the first matching rule.
    pub fn screen(
        &self,
        history: &[Arc<Transaction>],
        candidate: &Transaction,
    ) -> Result<(), LedgerError> {
        match self.detect(history, candidate) {
            Some(flag) => Err(flag.into()),
            None => Ok(()),
        }
    }

    /// Returns the first matching rule, if any. Rules run high value, burst,
    /// then repetitive.
    #[must_use]
    pub fn detect(
        &self,
        history: &[Arc<Transaction>],
        candidate: &Transaction,
    ) -> Option<SuspiciousActivity> {
        self.check_high_value(candidate)
            .or_else(|| self.check_burst(history, candidate))
            .or_else(|| self.check_repetitive(history, candidate))
    }

    fn check_high_value(&self, candidate: &Transaction) -> Option<SuspiciousActivity> {
        (candidate.amount() > self.config.high_value_limit).then(|| SuspiciousActivity {
            category: ActivityCategory::HighValueTransaction,
            detail: format!(
                "amount {:.2} exceeds the high value limit of {:.2}",
                candidate.amount(),
                self.config.high_value_limit
            ),
        })
    }

    fn check_burst(
        &self,
        history: &[Arc<Transaction>],
        candidate: &Transaction,
    ) -> Option<SuspiciousActivity> {
        let count = self.config.rapid_count;
        if count == 0 || history.len() + 1 < count {
            return None;
        }

        let mut timestamps: Vec<_> = history.iter().map(|tx| tx.created_at()).collect();
        timestamps.push(candidate.created_at());
        timestamps.sort_unstable();

        let burst = timestamps
            .windows(count)
            .any(|run| run[count - 1] - run[0] <= self.config.rapid_window);

        burst.then(|| SuspiciousActivity {
            category: ActivityCategory::RapidTransactions,
            detail: format!(
                "{count} transactions within {} seconds",
                self.config.rapid_window.num_seconds()
            ),
        })
    }

    fn check_repetitive(
        &self,
        history: &[Arc<Transaction>],
        candidate: &Transaction,
    ) -> Option<SuspiciousActivity> {
        let threshold = self.config.repetitive_threshold;
        if threshold == 0 || history.len() + 1 < threshold {
            return None;
        }

        let mut groups: HashMap<(TransactionType, Decimal, AccountId), usize> = HashMap::new();
        for tx in history.iter().map(|tx| &**tx).chain(std::iter::once(candidate)) {
            *groups
                .entry((tx.kind(), tx.amount().normalize(), tx.destination()))
                .or_default() += 1;
        }

        groups
            .values()
            .any(|&size| size >= threshold)
            .then(|| SuspiciousActivity {
                category: ActivityCategory::RepetitivePattern,
                detail: format!("repetitive transaction pattern (threshold: {threshold})"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn deposit(account: AccountId, amount: Decimal, at: DateTime<Utc>) -> Transaction {
        Transaction::new(
            TransactionType::Deposit,
            amount,
            "coffee",
            Some(account),
            Some(account),
            at,
        )
        .unwrap()
    }

    /// `n` deposits of `amount`, `step` apart from `start()`.
    fn series(account: AccountId, n: usize, amount: Decimal, step: TimeDelta) -> Vec<Arc<Transaction>> {
        (0..n)
            .map(|i| {
                let offset = step * i32::try_from(i).unwrap();
                Arc::new(deposit(account, amount, start() + offset))
            })
            .collect()
    }

    #[test]
    fn test_high_value_boundary() {
        let screener = ActivityScreener::default();
        let account = AccountId::new();

        assert!(screener.screen(&[], &deposit(account, dec!(10000), start())).is_ok());

        let flag = screener
            .detect(&[], &deposit(account, dec!(10000.01), start()))
            .unwrap();
        assert_eq!(flag.category, ActivityCategory::HighValueTransaction);
    }

    #[test]
    fn test_burst_on_fifth_within_window() {
        let screener = ActivityScreener::default();
        let account = AccountId::new();
        let history = series(account, 4, dec!(1), TimeDelta::seconds(10));

        let candidate = deposit(account, dec!(1), start() + TimeDelta::seconds(40));
        let err = screener.screen(&history, &candidate).unwrap_err();
        assert_eq!(
            err.activity_category(),
            Some(ActivityCategory::RapidTransactions)
        );
    }

    #[test]
    fn test_burst_window_is_inclusive() {
        let screener = ActivityScreener::default();
        let account = AccountId::new();
        let history = series(account, 4, dec!(1), TimeDelta::seconds(15));

        let edge = deposit(account, dec!(1), start() + TimeDelta::seconds(60));
        assert!(screener.detect(&history, &edge).is_some());

        let late = deposit(account, dec!(1), start() + TimeDelta::milliseconds(60_001));
        assert!(screener.detect(&history, &late).is_none());
    }

    #[test]
    fn test_burst_needs_enough_transactions() {
        let screener = ActivityScreener::default();
        let account = AccountId::new();
        let history = series(account, 3, dec!(1), TimeDelta::seconds(1));

        let candidate = deposit(account, dec!(1), start() + TimeDelta::seconds(3));
        assert!(screener.detect(&history, &candidate).is_none());
    }

    #[test]
    fn test_burst_uses_timestamp_order() {
        let screener = ActivityScreener::default();
        let account = AccountId::new();
        // history out of order, candidate lands between entries
        let mut history = series(account, 4, dec!(1), TimeDelta::seconds(5));
        history.reverse();

        let candidate = deposit(account, dec!(1), start() + TimeDelta::seconds(7));
        assert_eq!(
            screener.detect(&history, &candidate).map(|f| f.category),
            Some(ActivityCategory::RapidTransactions)
        );
    }

    #[test]
    fn test_repetitive_pattern() {
        let screener = ActivityScreener::default();
        let account = AccountId::new();
        let history = series(account, 7, dec!(5), TimeDelta::seconds(20));

        let candidate = deposit(account, dec!(5.00), start() + TimeDelta::seconds(140));
        let flag = screener.detect(&history, &candidate).unwrap();
        assert_eq!(flag.category, ActivityCategory::RepetitivePattern);
        assert!(flag.detail.contains("threshold: 8"));
    }

    #[test]
    fn test_repetitive_groups_by_amount() {
        let screener = ActivityScreener::default();
        let account = AccountId::new();
        let history = series(account, 7, dec!(5), TimeDelta::seconds(20));

        let candidate = deposit(account, dec!(6), start() + TimeDelta::seconds(140));
        assert!(screener.detect(&history, &candidate).is_none());
    }

    #[test]
    fn test_rule_order_high_value_first() {
        let screener = ActivityScreener::default();
        let account = AccountId::new();
        let history = series(account, 7, dec!(20000), TimeDelta::seconds(1));

        let candidate = deposit(account, dec!(20000), start() + TimeDelta::seconds(7));
        assert_eq!(
            screener.detect(&history, &candidate).map(|f| f.category),
            Some(ActivityCategory::HighValueTransaction)
        );
    }

    #[test]
    fn test_permissive_never_flags() {
        let screener = ActivityScreener::new(ScreeningConfig::permissive());
        let account = AccountId::new();
        let history = series(account, 20, dec!(1), TimeDelta::zero());

        let candidate = deposit(account, dec!(1), start());
        assert!(screener.detect(&history, &candidate).is_none());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(
            ActivityCategory::HighValueTransaction.to_string(),
            "HIGH_VALUE_TRANSACTION"
        );
        assert_eq!(ActivityCategory::RepetitivePattern.as_str(), "REPETITIVE_PATTERN");
    }
}
