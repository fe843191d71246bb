//! Property-based tests for TransactionService.
//!
//! - Balance invariant: after every operation each account's balance equals
//!   the sum of its history's effects
//! - Conservation: the total across accounts equals deposits minus withdrawals
//!   of the transactions still on record

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::TransactionService;
use crate::account::AccountKind;
use crate::directory::Directory;
use crate::ledger::{Ledger, TransactionType};
use crate::screening::{ActivityScreener, ScreeningConfig};

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, i64),
    Withdraw(usize, i64),
    Transfer(usize, usize, i64),
    Delete(usize, usize),
}

/// Strategy for amounts from 0.01 to 500.00, as cents.
fn cents() -> impl Strategy<Value = i64> {
    1i64..50_000
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, cents()).prop_map(|(a, c)| Op::Deposit(a, c)),
        (0usize..3, cents()).prop_map(|(a, c)| Op::Withdraw(a, c)),
        (0usize..3, 0usize..3, cents()).prop_map(|(a, b, c)| Op::Transfer(a, b, c)),
        (0usize..3, 0usize..16).prop_map(|(a, i)| Op::Delete(a, i)),
    ]
}

fn setup() -> (TransactionService, Vec<crate::account::AccountHandle>) {
    let directory = Arc::new(Directory::new());
    let mut accounts = Vec::new();
    for (i, kind) in [AccountKind::Checking, AccountKind::Savings, AccountKind::Checking]
        .into_iter()
        .enumerate()
    {
        let customer = directory
            .register_customer("Prop", "Tester", &format!("prop{i}@example.com"))
            .unwrap();
        accounts.push(directory.open_account(customer.id, kind).unwrap());
    }
    let service = TransactionService::new(
        directory,
        Arc::new(Ledger::new()),
        ActivityScreener::new(ScreeningConfig::permissive()),
    );
    (service, accounts)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_balances_match_histories(ops in prop::collection::vec(op(), 1..40)) {
        let (service, accounts) = setup();

        for op in ops {
            // Rejections are expected (overdrafts, self-transfers); they must not mutate.
            let _ = match op {
                Op::Deposit(a, c) => service
                    .deposit(accounts[a].id(), Decimal::new(c, 2), "prop")
                    .map(|_| ()),
                Op::Withdraw(a, c) => service
                    .withdraw(accounts[a].id(), Decimal::new(c, 2), "prop")
                    .map(|_| ()),
                Op::Transfer(a, b, c) => service
                    .transfer(accounts[a].id(), accounts[b].id(), Decimal::new(c, 2), "prop")
                    .map(|_| ()),
                Op::Delete(a, i) => {
                    let history = accounts[a].transactions().unwrap();
                    match history.get(i) {
                        Some(tx) => service.delete_transaction(accounts[a].id(), tx.id()).map(|_| ()),
                        None => Ok(()),
                    }
                }
            };

            for account in &accounts {
                let snapshot = account.snapshot().unwrap();
                prop_assert_eq!(snapshot.balance(), snapshot.recompute_balance());
                prop_assert!(snapshot.balance() >= Decimal::ZERO);
            }
        }

        let recorded = service.ledger().all().unwrap();
        let net: Decimal = recorded
            .iter()
            .map(|tx| match tx.kind() {
                TransactionType::Deposit => tx.amount(),
                TransactionType::Withdrawal => -tx.amount(),
                TransactionType::Transfer => Decimal::ZERO,
            })
            .sum();
        let total: Decimal = accounts.iter().map(|a| a.balance().unwrap()).sum();
        prop_assert_eq!(total, net);
        prop_assert!(service.audit().unwrap().is_clean());
    }
}
