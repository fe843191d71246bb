//! Demo data.
//!
//! Written straight to the directory and ledger with back-dated timestamps, so
//! screening windows are not already full when the shell starts.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;

use cashdesk_core::{AccountHandle, AccountKind, Directory, Ledger, Transaction, TransactionType};
use cashdesk_shared::AppResult;

/// Seeds three customers (the first without accounts), four accounts, four
/// deposits, two withdrawals, and two transfers.
pub fn seed_demo_data(directory: &Directory, ledger: &Ledger) -> AppResult<()> {
    directory.register_customer("Marouane", "Amanar", "marouane@gmail.com")?;
    let omar = directory.register_customer("Omar", "Ouyacho", "omar@gmail.com")?;
    let sarah = directory.register_customer("Sarah", "Johnson", "sarah@gmail.com")?;

    let omar_checking = directory.open_account(omar.id, AccountKind::Checking)?;
    let omar_savings = directory.open_account(omar.id, AccountKind::Savings)?;
    let sarah_checking = directory.open_account(sarah.id, AccountKind::Checking)?;
    let sarah_savings = directory.open_account(sarah.id, AccountKind::Savings)?;

    let postings: [(TransactionType, i64, &str, &AccountHandle, &AccountHandle); 8] = [
        (TransactionType::Deposit, 1000, "Initial deposit", &omar_checking, &omar_checking),
        (TransactionType::Deposit, 500, "Savings deposit", &omar_savings, &omar_savings),
        (TransactionType::Deposit, 750, "Paycheck deposit", &sarah_checking, &sarah_checking),
        (TransactionType::Deposit, 300, "Birthday money", &sarah_savings, &sarah_savings),
        (TransactionType::Withdrawal, 200, "ATM withdrawal", &omar_checking, &omar_checking),
        (TransactionType::Withdrawal, 100, "Cash withdrawal", &sarah_checking, &sarah_checking),
        (TransactionType::Transfer, 150, "Transfer to savings", &omar_checking, &omar_savings),
        (TransactionType::Transfer, 50, "Payment to Sarah", &omar_checking, &sarah_checking),
    ];

    let start = Utc::now() - Duration::days(8);
    for (day, (kind, amount, description, source, destination)) in (0i64..).zip(postings) {
        let tx = Transaction::new(
            kind,
            Decimal::from(amount),
            description,
            Some(source.id()),
            Some(destination.id()),
            start + Duration::days(day),
        )?;
        ledger.record(tx, Some(source), Some(destination))?;
    }

    info!(
        customers = directory.customers()?.len(),
        accounts = directory.accounts()?.len(),
        transactions = ledger.len()?,
        "demo data seeded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashdesk_core::CustomerQuery;
    use rust_decimal_macros::dec;

    #[test]
    fn test_seed_balances() {
        let directory = Directory::new();
        let ledger = Ledger::new();
        seed_demo_data(&directory, &ledger).unwrap();

        assert_eq!(directory.customers().unwrap().len(), 3);
        assert_eq!(ledger.len().unwrap(), 8);

        let omar = directory
            .find_customer(&CustomerQuery::Email("omar@gmail.com".into()))
            .unwrap()
            .unwrap();
        let balances: Vec<_> = directory
            .accounts_of(omar.id)
            .unwrap()
            .iter()
            .map(|h| h.balance().unwrap())
            .collect();
        assert_eq!(balances, vec![dec!(600), dec!(650)]);

        let marouane = directory
            .find_customer(&CustomerQuery::FirstName("marouane".into()))
            .unwrap()
            .unwrap();
        assert!(directory.accounts_of(marouane.id).unwrap().is_empty());
    }
}
