//! Property-based tests for ActivityScreener.
//!
//! - Rule precedence: any amount above the limit is flagged as high value
//! - `screen` and `detect` agree
//! - Sparse, varied histories are never flagged

use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use cashdesk_shared::types::AccountId;

use super::{ActivityCategory, ActivityScreener};
use crate::ledger::{Transaction, TransactionType};

/// Strategy for amounts from 0.01 to 10,000.00.
fn amount_within_limit() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for amounts from 10,000.01 upwards.
fn amount_above_limit() -> impl Strategy<Value = Decimal> {
    (1_000_001i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a transaction offset in seconds from a fixed start.
fn offset_secs() -> impl Strategy<Value = i64> {
    0i64..3_600
}

fn deposit(account: AccountId, amount: Decimal, offset: i64) -> Arc<Transaction> {
    let start = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
    Arc::new(
        Transaction::new(
            TransactionType::Deposit,
            amount,
            "prop",
            Some(account),
            Some(account),
            start + TimeDelta::seconds(offset),
        )
        .unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_high_value_always_wins(
        amount in amount_above_limit(),
        history in prop::collection::vec((amount_within_limit(), offset_secs()), 0..20),
    ) {
        let account = AccountId::new();
        let history: Vec<_> = history
            .into_iter()
            .map(|(amount, offset)| deposit(account, amount, offset))
            .collect();
        let candidate = deposit(account, amount, 0);

        let flag = ActivityScreener::default().detect(&history, &candidate);
        prop_assert_eq!(flag.map(|f| f.category), Some(ActivityCategory::HighValueTransaction));
    }

    #[test]
    fn prop_screen_agrees_with_detect(
        candidate in (amount_within_limit(), offset_secs()),
        history in prop::collection::vec((1i64..=5i64, offset_secs()), 0..30),
    ) {
        let account = AccountId::new();
        let history: Vec<_> = history
            .into_iter()
            .map(|(units, offset)| deposit(account, Decimal::from(units), offset))
            .collect();
        let candidate = deposit(account, candidate.0, candidate.1);

        let screener = ActivityScreener::default();
        let detected = screener.detect(&history, &candidate);
        let screened = screener.screen(&history, &candidate);

        prop_assert_eq!(detected.is_some(), screened.is_err());
        prop_assert_eq!(
            detected.map(|f| f.category),
            screened.err().and_then(|e| e.activity_category())
        );
    }

    #[test]
    fn prop_sparse_distinct_history_is_clean(
        amounts in prop::collection::hash_set(1i64..=1_000_000i64, 1..30),
    ) {
        let account = AccountId::new();
        // 61 s apart, so no five fall inside one minute
        let mut all: Vec<_> = amounts
            .into_iter()
            .zip(0i64..)
            .map(|(cents, i)| deposit(account, Decimal::new(cents, 2), i * 61))
            .collect();
        let candidate = all.pop().unwrap();

        prop_assert!(ActivityScreener::default().detect(&all, &candidate).is_none());
    }
}
