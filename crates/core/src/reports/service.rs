//! Report generation service.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;

use cashdesk_shared::types::{AccountId, CustomerId};

use super::types::{
    AccountBalanceLine, AccountStatement, CustomerSummary, SystemSummary, TypeCounts,
};
use crate::account::Account;
use crate::ledger::{Transaction, TransactionType};

/// Service for generating statistics.
pub struct ReportService;

impl ReportService {
    /// Statement for one account.
    #[must_use]
    pub fn account_statement(account: &Account) -> AccountStatement {
        let id = account.id();
        let history = account.history();

        let (money_in, money_out) =
            history
                .iter()
                .fold((Decimal::ZERO, Decimal::ZERO), |(incoming, outgoing), tx| {
                    if tx.is_incoming_for(id) {
                        (incoming.saturating_add(tx.amount()), outgoing)
                    } else {
                        (incoming, outgoing.saturating_add(tx.amount()))
                    }
                });

        AccountStatement {
            account_id: id,
            kind: account.kind(),
            owner: account.owner(),
            balance: account.balance(),
            transaction_count: history.len(),
            money_in,
            money_out,
            net_change: money_in - money_out,
            first_transaction: history.first().map(|tx| tx.created_at()),
            last_transaction: history.last().map(|tx| tx.created_at()),
        }
    }

    /// Summary across `accounts`, all owned by `customer`.
    ///
    /// A transfer between two of the customer's accounts appears in both
    /// histories; it is counted once and moves no money in or out.
    #[must_use]
    pub fn customer_summary(customer: CustomerId, accounts: &[Account]) -> CustomerSummary {
        let owned: HashSet<AccountId> = accounts.iter().map(Account::id).collect();

        let mut seen = HashSet::new();
        let mut transactions: Vec<&Arc<Transaction>> = accounts
            .iter()
            .flat_map(Account::history)
            .filter(|tx| seen.insert(tx.id()))
            .collect();
        transactions.sort_by_key(|tx| tx.created_at());

        let mut counts = TypeCounts::default();
        let mut internal_transfers = 0;
        let mut money_in = Decimal::ZERO;
        let mut money_out = Decimal::ZERO;

        for tx in &transactions {
            counts.record(tx.kind());
            match tx.kind() {
                TransactionType::Deposit => money_in = money_in.saturating_add(tx.amount()),
                TransactionType::Withdrawal => {
                    money_out = money_out.saturating_add(tx.amount());
                }
                TransactionType::Transfer => {
                    let from_own = owned.contains(&tx.source());
                    let to_own = owned.contains(&tx.destination());
                    match (from_own, to_own) {
                        (true, true) => internal_transfers += 1,
                        (true, false) => money_out = money_out.saturating_add(tx.amount()),
                        (false, true) => money_in = money_in.saturating_add(tx.amount()),
                        (false, false) => {}
                    }
                }
            }
        }

        let total = saturating_sum(transactions.iter().map(|tx| tx.amount()));
        let average_amount = (!transactions.is_empty())
            .then(|| total / Decimal::from(transactions.len()));

        CustomerSummary {
            customer_id: customer,
            accounts: accounts
                .iter()
                .map(|a| AccountBalanceLine {
                    account_id: a.id(),
                    kind: a.kind(),
                    balance: a.balance(),
                })
                .collect(),
            total_balance: saturating_sum(accounts.iter().map(Account::balance)),
            counts,
            internal_transfers,
            money_in,
            money_out,
            net_change: money_in - money_out,
            average_amount,
            largest_amount: transactions.iter().map(|tx| tx.amount()).max(),
            first_transaction: transactions.first().map(|tx| tx.created_at()),
            last_transaction: transactions.last().map(|tx| tx.created_at()),
        }
    }

    /// Summary over every recorded transaction.
    #[must_use]
    pub fn system_summary(transactions: &[Arc<Transaction>]) -> SystemSummary {
        let mut summary = SystemSummary::default();

        for tx in transactions {
            summary.counts.record(tx.kind());
            match tx.kind() {
                TransactionType::Deposit => {
                    summary.total_deposits = summary.total_deposits.saturating_add(tx.amount());
                }
                TransactionType::Withdrawal => {
                    summary.total_withdrawals =
                        summary.total_withdrawals.saturating_add(tx.amount());
                }
                TransactionType::Transfer => {
                    summary.total_transfers = summary.total_transfers.saturating_add(tx.amount());
                }
            }
        }

        summary.total_volume = saturating_sum([
            summary.total_deposits,
            summary.total_withdrawals,
            summary.total_transfers,
        ]);
        summary.net_change = summary.total_deposits - summary.total_withdrawals;
        summary
    }
}

/// Totals pin at `Decimal::MAX` instead of overflowing.
fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}
