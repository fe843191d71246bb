//! Unit tests for ReportService.

use chrono::{TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cashdesk_shared::types::CustomerId;

use super::*;
use crate::account::{Account, AccountHandle, AccountKind};
use crate::ledger::{Ledger, Transaction, TransactionType};

struct Fixture {
    ledger: Ledger,
    owner: CustomerId,
    checking: AccountHandle,
    savings: AccountHandle,
    stranger: AccountHandle,
    tick: i64,
}

impl Fixture {
    fn new() -> Self {
        let owner = CustomerId::new();
        Self {
            ledger: Ledger::new(),
            owner,
            checking: AccountHandle::new(Account::new(AccountKind::Checking, owner, Utc::now())),
            savings: AccountHandle::new(Account::new(AccountKind::Savings, owner, Utc::now())),
            stranger: AccountHandle::new(Account::new(AccountKind::Checking, CustomerId::new(), Utc::now())),
            tick: 0,
        }
    }

    fn post(
        &mut self,
        kind: TransactionType,
        amount: Decimal,
        from: &AccountHandle,
        to: &AccountHandle,
    ) {
        self.tick += 1;
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap() + TimeDelta::minutes(self.tick);
        let tx = Transaction::new(kind, amount, "test", Some(from.id()), Some(to.id()), at).unwrap();
        self.ledger.record(tx, Some(from), Some(to)).unwrap();
    }

    /// Seeds: checking +1000, -200, 150 to savings, 50 to stranger; stranger sends 25 back.
    fn seeded() -> Self {
        let mut f = Self::new();
        let (checking, savings, stranger) =
            (f.checking.clone(), f.savings.clone(), f.stranger.clone());
        f.post(TransactionType::Deposit, dec!(1000), &checking, &checking);
        f.post(TransactionType::Withdrawal, dec!(200), &checking, &checking);
        f.post(TransactionType::Transfer, dec!(150), &checking, &savings);
        f.post(TransactionType::Transfer, dec!(50), &checking, &stranger);
        f.post(TransactionType::Transfer, dec!(25), &stranger, &checking);
        f
    }
}

#[test]
fn test_account_statement() {
    let f = Fixture::seeded();
    let statement = ReportService::account_statement(&f.checking.snapshot().unwrap());

    assert_eq!(statement.transaction_count, 5);
    assert_eq!(statement.money_in, dec!(1025));
    assert_eq!(statement.money_out, dec!(400));
    assert_eq!(statement.net_change, dec!(625));
    assert_eq!(statement.balance, dec!(625));
    assert!(statement.first_transaction < statement.last_transaction);
}

#[test]
fn test_empty_account_statement() {
    let f = Fixture::new();
    let statement = ReportService::account_statement(&f.savings.snapshot().unwrap());

    assert_eq!(statement.transaction_count, 0);
    assert_eq!(statement.net_change, Decimal::ZERO);
    assert!(statement.first_transaction.is_none());
}

#[test]
fn test_customer_summary_treats_own_transfers_as_internal() {
    let f = Fixture::seeded();
    let accounts = vec![f.checking.snapshot().unwrap(), f.savings.snapshot().unwrap()];

    let summary = ReportService::customer_summary(f.owner, &accounts);

    assert_eq!(summary.counts.total(), 5);
    assert_eq!(summary.counts.transfers, 3);
    assert_eq!(summary.internal_transfers, 1);
    assert_eq!(summary.money_in, dec!(1025));
    assert_eq!(summary.money_out, dec!(250));
    assert_eq!(summary.net_change, dec!(775));
    assert_eq!(summary.total_balance, dec!(775));
    assert_eq!(summary.largest_amount, Some(dec!(1000)));
    assert_eq!(summary.average_amount, Some(dec!(285)));
    assert_eq!(summary.accounts.len(), 2);
}

#[test]
fn test_customer_summary_without_transactions() {
    let f = Fixture::new();
    let summary = ReportService::customer_summary(f.owner, &[f.checking.snapshot().unwrap()]);

    assert_eq!(summary.counts, TypeCounts::default());
    assert!(summary.average_amount.is_none());
    assert!(summary.largest_amount.is_none());
}

#[test]
fn test_system_summary() {
    let f = Fixture::seeded();
    let summary = ReportService::system_summary(&f.ledger.all().unwrap());

    assert_eq!(summary.counts.deposits, 1);
    assert_eq!(summary.counts.withdrawals, 1);
    assert_eq!(summary.counts.transfers, 3);
    assert_eq!(summary.total_deposits, dec!(1000));
    assert_eq!(summary.total_withdrawals, dec!(200));
    assert_eq!(summary.total_transfers, dec!(225));
    assert_eq!(summary.total_volume, dec!(1425));
    assert_eq!(summary.net_change, dec!(800));
}

#[test]
fn test_totals_saturate_instead_of_overflowing() {
    let mut f = Fixture::new();
    let (checking, savings) = (f.checking.clone(), f.savings.clone());
    f.post(TransactionType::Deposit, Decimal::MAX, &checking, &checking);
    f.post(TransactionType::Deposit, Decimal::MAX, &savings, &savings);

    let accounts = vec![checking.snapshot().unwrap(), savings.snapshot().unwrap()];
    let summary = ReportService::customer_summary(f.owner, &accounts);
    assert_eq!(summary.total_balance, Decimal::MAX);
    assert_eq!(summary.money_in, Decimal::MAX);

    let system = ReportService::system_summary(&f.ledger.all().unwrap());
    assert_eq!(system.total_deposits, Decimal::MAX);
    assert_eq!(system.total_volume, Decimal::MAX);
}
