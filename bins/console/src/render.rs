//! Text rendering for the console.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use cashdesk_core::history::Direction;
use cashdesk_core::reports::{AccountStatement, CustomerSummary, SystemSummary};
use cashdesk_core::{Account, Customer, Transaction};
use cashdesk_shared::types::format_amount;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats domain values with the configured currency symbol.
#[derive(Debug, Clone)]
pub struct Renderer {
    symbol: String,
}

impl Renderer {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn amount(&self, amount: Decimal) -> String {
        format_amount(amount, &self.symbol)
    }

    pub fn customer_line(customer: &Customer) -> String {
        format!("{} <{}>", customer.full_name(), customer.email)
    }

    pub fn account_line(&self, index: usize, account: &Account) -> String {
        format!(
            "{index}) {:<8} {}  {}",
            account.kind().as_str(),
            account.id().short(),
            self.amount(account.balance())
        )
    }

    pub fn transaction_line(&self, index: usize, tx: &Transaction, direction: Direction) -> String {
        let marker = if direction == Direction::Internal {
            " (internal)"
        } else {
            ""
        };
        format!(
            "{index}) {}  {:<10} {}{}  {}{marker}  [{}]",
            tx.created_at().format(DATE_FORMAT),
            tx.kind().as_str(),
            direction.sign(),
            self.amount(tx.amount()),
            tx.description(),
            tx.id().short()
        )
    }

    /// Ledger-wide line naming the parties instead of a direction.
    pub fn system_transaction_line(&self, index: usize, tx: &Transaction, parties: &str) -> String {
        format!(
            "{index}) {} | {} | {} | {} | {} | ID: {}",
            tx.kind().as_str(),
            self.amount(tx.amount()),
            parties,
            tx.description(),
            tx.created_at().format(DATE_FORMAT),
            tx.id().short()
        )
    }

    pub fn statement(&self, statement: &AccountStatement, owner: &str) -> Vec<String> {
        let mut lines = vec![
            "=== Account Statistics ===".to_string(),
            format!("Account Type: {}", statement.kind),
            format!("Account ID: {}", statement.account_id),
            format!("Current Balance: {}", self.amount(statement.balance)),
            format!("Owner: {owner}"),
            format!("Total Transactions: {}", statement.transaction_count),
        ];
        if statement.transaction_count > 0 {
            lines.extend([
                format!("  Total Money In: +{}", self.amount(statement.money_in)),
                format!("  Total Money Out: -{}", self.amount(statement.money_out)),
                format!("  Net Change: {}", self.amount(statement.net_change)),
                format!("  First Transaction: {}", date(statement.first_transaction)),
                format!("  Last Transaction: {}", date(statement.last_transaction)),
            ]);
        }
        lines
    }

    pub fn customer_summary(&self, summary: &CustomerSummary, name: &str) -> Vec<String> {
        let mut lines = vec![format!("=== Statistics for {name} ===")];
        if summary.accounts.is_empty() {
            lines.push("No accounts found. Open an account to see statistics.".to_string());
            return lines;
        }

        lines.push(format!("Total Accounts: {}", summary.accounts.len()));
        lines.push(format!("Combined Balance: {}", self.amount(summary.total_balance)));
        lines.extend(
            summary
                .accounts
                .iter()
                .map(|line| format!("  {}: {}", line.kind, self.amount(line.balance))),
        );

        let counts = summary.counts;
        lines.extend([
            format!("Total Transactions: {}", counts.total()),
            format!("  Deposits: {}", counts.deposits),
            format!("  Withdrawals: {}", counts.withdrawals),
            format!(
                "  Transfers: {} ({} internal)",
                counts.transfers, summary.internal_transfers
            ),
            format!("Money In: +{}", self.amount(summary.money_in)),
            format!("Money Out: -{}", self.amount(summary.money_out)),
            format!("Net Change: {}", self.amount(summary.net_change)),
        ]);
        if let (Some(average), Some(largest)) = (summary.average_amount, summary.largest_amount) {
            lines.extend([
                format!("Average Transaction: {}", self.amount(average)),
                format!("Largest Transaction: {}", self.amount(largest)),
                format!("First Transaction: {}", date(summary.first_transaction)),
                format!("Most Recent Transaction: {}", date(summary.last_transaction)),
            ]);
        }
        lines
    }

    pub fn system_summary(&self, summary: &SystemSummary) -> Vec<String> {
        let counts = summary.counts;
        vec![
            "=== System Transaction Statistics ===".to_string(),
            format!("Deposits: {} ({})", counts.deposits, self.amount(summary.total_deposits)),
            format!(
                "Withdrawals: {} ({})",
                counts.withdrawals,
                self.amount(summary.total_withdrawals)
            ),
            format!(
                "Transfers: {} ({})",
                counts.transfers,
                self.amount(summary.total_transfers)
            ),
            format!("Total Transactions: {}", counts.total()),
            format!("Total Volume: {}", self.amount(summary.total_volume)),
            format!("Net System Change: {}", self.amount(summary.net_change)),
        ]
    }
}

fn date(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashdesk_core::TransactionType;
    use cashdesk_core::reports::TypeCounts;
    use cashdesk_shared::types::AccountId;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_uses_symbol() {
        let renderer = Renderer::new("€");
        assert_eq!(renderer.amount(dec!(12.5)), "€12.50");
    }

    #[test]
    fn test_system_summary_lines() {
        let renderer = Renderer::new("$");
        let summary = SystemSummary {
            counts: TypeCounts {
                deposits: 2,
                withdrawals: 1,
                transfers: 0,
            },
            total_deposits: dec!(150),
            total_withdrawals: dec!(20),
            total_transfers: Decimal::ZERO,
            total_volume: dec!(170),
            net_change: dec!(130),
        };

        let lines = renderer.system_summary(&summary);
        assert!(lines.contains(&"Deposits: 2 ($150.00)".to_string()));
        assert!(lines.contains(&"Net System Change: $130.00".to_string()));
    }

    #[test]
    fn test_system_transaction_line_names_parties() {
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 8, 30, 0).unwrap();
        let tx = Transaction::new(
            TransactionType::Transfer,
            dec!(50),
            "Payment to Sarah",
            Some(AccountId::new()),
            Some(AccountId::new()),
            at,
        )
        .unwrap();

        let line = Renderer::new("$").system_transaction_line(3, &tx, "Omar Ouyacho -> Sarah Johnson");

        assert!(line.starts_with(
            "3) TRANSFER | $50.00 | Omar Ouyacho -> Sarah Johnson | Payment to Sarah | 2026-05-04 08:30:00 | ID: "
        ));
    }
}
