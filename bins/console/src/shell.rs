//! Line-oriented menu shell.
//!
//! Generic over its input and output so sessions can be scripted in tests.
//! Business rejections are printed and the shell carries on; fatal errors and
//! I/O failures end the session.

use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use cashdesk_core::history::{TransactionFilter, TransactionSort, direction_for};
use cashdesk_core::reports::ReportService;
use cashdesk_core::{
    Account, AccountKind, Customer, CustomerQuery, CustomerUpdate, Directory, Transaction,
    TransactionService, TransactionType,
};
use cashdesk_shared::AppError;
use cashdesk_shared::types::{AccountId, CustomerId, parse_amount};

use crate::render::Renderer;

/// Converts core errors into the console's error type.
trait IntoApp<T> {
    fn app(self) -> Result<T, AppError>;
}

impl<T, E: Into<AppError>> IntoApp<T> for Result<T, E> {
    fn app(self) -> Result<T, AppError> {
        self.map_err(Into::into)
    }
}

pub struct Shell<R, W> {
    service: TransactionService,
    renderer: Renderer,
    input: R,
    out: W,
    eof: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(service: TransactionService, renderer: Renderer, input: R, out: W) -> Self {
        Self {
            service,
            renderer,
            input,
            out,
            eof: false,
        }
    }

    /// Runs until the user exits or input ends.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.say("Welcome to Cashdesk.")?;
        loop {
            self.menu(
                "Main Menu",
                &[
                    "1) Select customer by email",
                    "2) Register customer",
                    "3) List customers",
                    "4) System statistics",
                    "5) Audit balances",
                    "6) Search customers",
                    "7) System transactions",
                    "0) Exit",
                ],
            )?;
            let choice = self.ask("Enter your choice: ")?;
            if self.eof {
                return Ok(());
            }
            match choice.as_str() {
                "1" => {
                    let result = self.select_customer();
                    self.report("Customer selection", result)?;
                }
                "2" => {
                    let result = self.register_customer();
                    self.report("Registration", result)?;
                }
                "3" => {
                    let result = self.list_customers();
                    self.report("Listing", result)?;
                }
                "4" => {
                    let result = self.system_statistics();
                    self.report("Statistics", result)?;
                }
                "5" => {
                    let result = self.audit();
                    self.report("Audit", result)?;
                }
                "6" => {
                    let result = self.search_customers();
                    self.report("Search", result)?;
                }
                "7" => {
                    let result = self.system_transactions();
                    self.report("Listing", result)?;
                }
                "0" => {
                    self.say("Goodbye!")?;
                    return Ok(());
                }
                _ => self.say("Invalid choice.")?,
            }
        }
    }

    // ========== Customer level ==========

    fn select_customer(&mut self) -> anyhow::Result<()> {
        let email = self.ask("Email: ")?;
        let customer = self
            .service
            .directory()
            .find_customer(&CustomerQuery::Email(email.clone()))
            .app()?
            .ok_or_else(|| AppError::NotFound(format!("no customer with email '{email}'")))?;
        self.customer_menu(&customer)
    }

    fn register_customer(&mut self) -> anyhow::Result<()> {
        let first = self.ask("First name: ")?;
        let last = self.ask("Last name: ")?;
        let email = self.ask("Email: ")?;
        let customer = self
            .service
            .directory()
            .register_customer(&first, &last, &email)
            .app()?;
        self.say(&format!("Registered {}.", Renderer::customer_line(&customer)))
    }

    fn search_customers(&mut self) -> anyhow::Result<()> {
        self.say_all(&[
            "Search by:".to_string(),
            "1) First name".to_string(),
            "2) Last name".to_string(),
            "3) Email".to_string(),
        ])?;
        let Some(field) = self.pick("Enter your choice: ", 3)? else {
            return Ok(());
        };
        let term = self.ask("Search for: ")?;
        let query = match field {
            0 => CustomerQuery::FirstName(term),
            1 => CustomerQuery::LastName(term),
            _ => CustomerQuery::Email(term),
        };

        let found = self.service.directory().search_customers(&query).app()?;
        if found.is_empty() {
            return self.say("No matching customers.");
        }
        for (i, customer) in found.iter().enumerate() {
            self.say(&format!("{}) {}", i + 1, Renderer::customer_line(customer)))?;
        }
        let Some(index) = self.pick("Select customer: ", found.len())? else {
            return Ok(());
        };
        self.customer_menu(&found[index])
    }

    fn system_transactions(&mut self) -> anyhow::Result<()> {
        self.say_all(&[
            "1) All transactions".to_string(),
            "2) Filtered transactions".to_string(),
            "3) Transactions by customer".to_string(),
        ])?;
        match self.ask("Enter your choice: ")?.as_str() {
            "1" => {
                let all = self.service.search(&TransactionFilter::new(), None).app()?;
                self.print_system_transactions(&all)
            }
            "2" => {
                let Some(filter) = self.ask_filter()? else {
                    return Ok(());
                };
                let sort = self.ask_sort()?;
                let found = self.service.search(&filter, sort).app()?;
                self.print_system_transactions(&found)
            }
            "3" => {
                let customers = self.service.directory().customers().app()?;
                if customers.is_empty() {
                    return self.say("No customers registered.");
                }
                for (i, customer) in customers.iter().enumerate() {
                    self.say(&format!("{}) {}", i + 1, Renderer::customer_line(customer)))?;
                }
                let Some(index) = self.pick("Select customer: ", customers.len())? else {
                    return Ok(());
                };
                self.customer_transactions(customers[index].id)
            }
            _ => self.say("Invalid choice."),
        }
    }

    fn list_customers(&mut self) -> anyhow::Result<()> {
        let customers = self.service.directory().customers().app()?;
        if customers.is_empty() {
            return self.say("No customers registered.");
        }
        for (i, customer) in customers.iter().enumerate() {
            self.say(&format!("{}) {}", i + 1, Renderer::customer_line(customer)))?;
        }
        Ok(())
    }

    fn system_statistics(&mut self) -> anyhow::Result<()> {
        let transactions = self.service.ledger().all().app()?;
        let lines = self
            .renderer
            .system_summary(&ReportService::system_summary(&transactions));
        self.say_all(&lines)
    }

    fn audit(&mut self) -> anyhow::Result<()> {
        let report = self.service.audit().app()?;
        if report.is_clean() {
            return self.say(&format!(
                "All {} accounts balance with their histories.",
                report.accounts_checked
            ));
        }
        for mismatch in &report.mismatches {
            let line = format!(
                "Account {}: stored {}, recomputed {}",
                mismatch.account.short(),
                self.renderer.amount(mismatch.stored),
                self.renderer.amount(mismatch.recomputed)
            );
            self.say(&line)?;
        }
        Ok(())
    }

    fn customer_menu(&mut self, customer: &Customer) -> anyhow::Result<()> {
        let mut customer = customer.clone();
        self.say(&format!("Welcome, {}!", customer.full_name()))?;
        loop {
            self.menu(
                &format!("Customer: {}", customer.full_name()),
                &[
                    "1) List accounts",
                    "2) Open account",
                    "3) Select account",
                    "4) Customer statistics",
                    "5) All my transactions",
                    "6) Remove customer",
                    "7) Update details",
                    "0) Back",
                ],
            )?;
            let choice = self.ask("Enter your choice: ")?;
            if self.eof {
                return Ok(());
            }
            match choice.as_str() {
                "1" => {
                    let result = self.list_accounts(customer.id);
                    self.report("Listing", result)?;
                }
                "2" => {
                    let result = self.open_account(customer.id);
                    self.report("Account opening", result)?;
                }
                "3" => {
                    let result = self.select_account(&customer);
                    self.report("Account selection", result)?;
                }
                "4" => {
                    let result = self.customer_statistics(&customer);
                    self.report("Statistics", result)?;
                }
                "5" => {
                    let result = self.customer_transactions(customer.id);
                    self.report("Listing", result)?;
                }
                "6" => {
                    let result = self.remove_customer(customer.id);
                    match result {
                        Ok(true) => return Ok(()),
                        other => self.report("Customer removal", other.map(|_| ()))?,
                    }
                }
                "7" => match self.update_customer(customer.id) {
                    Ok(Some(updated)) => customer = updated,
                    other => self.report("Update", other.map(|_| ()))?,
                },
                "0" => return Ok(()),
                _ => self.say("Invalid choice.")?,
            }
        }
    }

    fn owned_accounts(&self, customer: CustomerId) -> Result<Vec<Account>, AppError> {
        self.service
            .directory()
            .accounts_of(customer)
            .app()?
            .iter()
            .map(|handle| handle.snapshot().app())
            .collect()
    }

    fn list_accounts(&mut self, customer: CustomerId) -> anyhow::Result<()> {
        let accounts = self.owned_accounts(customer)?;
        if accounts.is_empty() {
            return self.say("No accounts yet.");
        }
        for (i, account) in accounts.iter().enumerate() {
            let line = self.renderer.account_line(i + 1, account);
            self.say(&line)?;
        }
        Ok(())
    }

    fn open_account(&mut self, customer: CustomerId) -> anyhow::Result<()> {
        for (i, kind) in AccountKind::ALL.iter().enumerate() {
            self.say(&format!("{}) {kind}", i + 1))?;
        }
        let Some(index) = self.pick("Account type: ", AccountKind::ALL.len())? else {
            return Ok(());
        };
        let kind = AccountKind::ALL[index];
        let handle = self
            .service
            .directory()
            .open_account(customer, kind)
            .app()?;
        self.say(&format!("Opened {kind} account {}.", handle.id().short()))
    }

    fn select_account(&mut self, customer: &Customer) -> anyhow::Result<()> {
        let accounts = self.owned_accounts(customer.id)?;
        if accounts.is_empty() {
            return self.say("No accounts yet.");
        }
        for (i, account) in accounts.iter().enumerate() {
            let line = self.renderer.account_line(i + 1, account);
            self.say(&line)?;
        }
        let Some(index) = self.pick("Select account: ", accounts.len())? else {
            return Ok(());
        };
        self.account_menu(customer, accounts[index].id())
    }

    fn customer_statistics(&mut self, customer: &Customer) -> anyhow::Result<()> {
        let accounts = self.owned_accounts(customer.id)?;
        let summary = ReportService::customer_summary(customer.id, &accounts);
        let lines = self.renderer.customer_summary(&summary, &customer.full_name());
        self.say_all(&lines)
    }

    fn customer_transactions(&mut self, customer: CustomerId) -> anyhow::Result<()> {
        let owned: HashSet<AccountId> = self
            .service
            .directory()
            .accounts_of(customer)
            .app()?
            .iter()
            .map(|handle| handle.id())
            .collect();
        let transactions = self.service.customer_transactions(customer).app()?;
        self.print_transactions(&transactions, &owned)
    }

    /// Returns the new record, or `None` when nothing was changed.
    fn update_customer(&mut self, customer: CustomerId) -> anyhow::Result<Option<Customer>> {
        self.say_all(&[
            "Update:".to_string(),
            "1) First name".to_string(),
            "2) Last name".to_string(),
            "3) Email".to_string(),
        ])?;
        let Some(field) = self.pick("Enter your choice: ", 3)? else {
            return Ok(None);
        };
        let value = self.ask("New value: ")?;
        let update = match field {
            0 => CustomerUpdate::new().with_first_name(value),
            1 => CustomerUpdate::new().with_last_name(value),
            _ => CustomerUpdate::new().with_email(value),
        };

        let updated = self
            .service
            .directory()
            .update_customer(customer, &update)
            .app()?;
        self.say(&format!("Updated {}.", Renderer::customer_line(&updated)))?;
        Ok(Some(updated))
    }

    /// Returns `Ok(true)` once the customer is gone.
    fn remove_customer(&mut self, customer: CustomerId) -> anyhow::Result<bool> {
        if !self.confirm("Remove this customer? (y/n): ")? {
            return Ok(false);
        }
        let removed = self.service.directory().remove_customer(customer).app()?;
        self.say(&format!("Removed {}.", removed.full_name()))?;
        Ok(true)
    }

    // ========== Account level ==========

    fn account_menu(&mut self, customer: &Customer, account: AccountId) -> anyhow::Result<()> {
        loop {
            let balance = self.service.directory().account(account).app()?.balance().app()?;
            let header = format!(
                "Account {} | Balance: {}",
                account.short(),
                self.renderer.amount(balance)
            );
            self.menu(
                &header,
                &[
                    "1) Deposit",
                    "2) Withdraw",
                    "3) Transfer",
                    "4) View history",
                    "5) Filter/sort history",
                    "6) Delete transaction",
                    "7) Account statistics",
                    "8) Close account",
                    "0) Back",
                ],
            )?;
            let choice = self.ask("Enter your choice: ")?;
            if self.eof {
                return Ok(());
            }
            match choice.as_str() {
                "1" => {
                    let result = self.deposit(account);
                    self.report("Deposit", result)?;
                }
                "2" => {
                    let result = self.withdraw(account);
                    self.report("Withdrawal", result)?;
                }
                "3" => {
                    let result = self.transfer(account);
                    self.report("Transfer", result)?;
                }
                "4" => {
                    let result = self.view_history(account);
                    self.report("History", result)?;
                }
                "5" => {
                    let result = self.filter_history(account);
                    self.report("Filter", result)?;
                }
                "6" => {
                    let result = self.delete_transaction(account);
                    self.report("Deletion", result)?;
                }
                "7" => {
                    let result = self.account_statistics(customer, account);
                    self.report("Statistics", result)?;
                }
                "8" => match self.close_account(account) {
                    Ok(true) => return Ok(()),
                    other => self.report("Account closing", other.map(|_| ()))?,
                },
                "0" => return Ok(()),
                _ => self.say("Invalid choice.")?,
            }
        }
    }

    fn deposit(&mut self, account: AccountId) -> anyhow::Result<()> {
        let amount = self.ask_amount()?;
        let description = self.ask_description("Deposit")?;
        self.service.deposit(account, amount, &description).app()?;
        self.print_balance("Deposit successful.", account)
    }

    fn withdraw(&mut self, account: AccountId) -> anyhow::Result<()> {
        let amount = self.ask_amount()?;
        let description = self.ask_description("Withdrawal")?;
        self.service.withdraw(account, amount, &description).app()?;
        self.print_balance("Withdrawal successful.", account)
    }

    fn transfer(&mut self, account: AccountId) -> anyhow::Result<()> {
        let directory = Arc::clone(self.service.directory());
        let targets = directory.transfer_targets(account).app()?;
        if targets.is_empty() {
            return self.say("No other accounts available.");
        }
        for (i, target) in targets.iter().enumerate() {
            let owner = directory.owner_of(target.id()).app()?;
            let kind = target.read(Account::kind).app()?;
            self.say(&format!(
                "{}) {} - {kind} {}",
                i + 1,
                owner.full_name(),
                target.id().short()
            ))?;
        }
        let Some(index) = self.pick("Destination: ", targets.len())? else {
            return Ok(());
        };

        let amount = self.ask_amount()?;
        let description = self.ask_description("Transfer")?;
        self.service
            .transfer(account, targets[index].id(), amount, &description)
            .app()?;
        self.print_balance("Transfer successful.", account)
    }

    fn view_history(&mut self, account: AccountId) -> anyhow::Result<()> {
        let history = self.service.history(account).app()?;
        self.print_transactions(&history, &HashSet::from([account]))
    }

    fn filter_history(&mut self, account: AccountId) -> anyhow::Result<()> {
        let history = self.service.history(account).app()?;
        let Some(filter) = self.ask_filter()? else {
            return Ok(());
        };
        let mut history = filter.apply(&history);
        if let Some(sort) = self.ask_sort()? {
            sort.apply(&mut history);
        }
        self.print_transactions(&history, &HashSet::from([account]))
    }

    /// `None` when the user backs out of a type selection.
    fn ask_filter(&mut self) -> anyhow::Result<Option<TransactionFilter>> {
        self.say_all(&[
            "Filter by:".to_string(),
            "1) Transaction type".to_string(),
            "2) Description keyword".to_string(),
            "3) Date range".to_string(),
            "4) Amount range".to_string(),
            "0) No filter".to_string(),
        ])?;
        let filter = match self.ask("Enter your choice: ")?.as_str() {
            "1" => {
                for (i, kind) in TransactionType::ALL.iter().enumerate() {
                    self.say(&format!("{}) {kind}", i + 1))?;
                }
                match self.pick("Transaction type: ", TransactionType::ALL.len())? {
                    Some(index) => TransactionFilter::new().with_kind(TransactionType::ALL[index]),
                    None => return Ok(None),
                }
            }
            "2" => TransactionFilter::new().with_keyword(&self.ask("Keyword: ")?),
            "3" => {
                let from = self.ask_date("Start date (yyyy-MM-dd, Enter for none): ")?;
                let to = self.ask_date("End date (yyyy-MM-dd, Enter for none): ")?;
                TransactionFilter::new().with_dates(from, to)
            }
            "4" => {
                let min = self.ask_optional_amount("Minimum amount (Enter for none): ")?;
                let max = self.ask_optional_amount("Maximum amount (Enter for none): ")?;
                TransactionFilter::new().with_amounts(min, max)
            }
            _ => TransactionFilter::new(),
        };
        Ok(Some(filter))
    }

    fn ask_sort(&mut self) -> anyhow::Result<Option<TransactionSort>> {
        self.say("Sort by:")?;
        for (i, sort) in TransactionSort::ALL.iter().enumerate() {
            self.say(&format!("{}) {}", i + 1, sort.label()))?;
        }
        self.say("0) Keep order")?;
        let raw = self.ask("Enter your choice: ")?;
        Ok(raw
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| TransactionSort::ALL.get(i))
            .copied())
    }

    fn delete_transaction(&mut self, account: AccountId) -> anyhow::Result<()> {
        let history = self.service.history(account).app()?;
        if history.is_empty() {
            return self.say("No transactions to delete.");
        }
        self.print_transactions(&history, &HashSet::from([account]))?;
        let Some(index) = self.pick("Transaction to delete: ", history.len())? else {
            return Ok(());
        };
        if !self.confirm("Delete this transaction? (y/n): ")? {
            return self.say("Deletion cancelled.");
        }
        self.service
            .delete_transaction(account, history[index].id())
            .app()?;
        self.print_balance("Transaction deleted.", account)
    }

    fn account_statistics(&mut self, customer: &Customer, account: AccountId) -> anyhow::Result<()> {
        let statement = self.service.account_statement(account).app()?;
        let lines = self.renderer.statement(&statement, &customer.full_name());
        self.say_all(&lines)
    }

    /// Returns `Ok(true)` once the account is gone.
    fn close_account(&mut self, account: AccountId) -> anyhow::Result<bool> {
        if !self.confirm("Close this account? (y/n): ")? {
            return Ok(false);
        }
        self.service.directory().close_account(account).app()?;
        self.say("Account closed.")?;
        Ok(true)
    }

    // ========== Helpers ==========

    fn print_transactions(
        &mut self,
        transactions: &[Arc<Transaction>],
        viewer: &HashSet<AccountId>,
    ) -> anyhow::Result<()> {
        if transactions.is_empty() {
            return self.say("No transactions found.");
        }
        for (i, tx) in transactions.iter().enumerate() {
            let line = self
                .renderer
                .transaction_line(i + 1, tx, direction_for(tx, viewer));
            self.say(&line)?;
        }
        Ok(())
    }

    fn print_system_transactions(&mut self, transactions: &[Arc<Transaction>]) -> anyhow::Result<()> {
        if transactions.is_empty() {
            return self.say("No transactions found.");
        }
        self.say(&format!("System transactions ({} total):", transactions.len()))?;
        let directory = Arc::clone(self.service.directory());
        for (i, tx) in transactions.iter().enumerate() {
            let source = party(&directory, tx.source());
            let parties = if tx.kind() == TransactionType::Transfer {
                let destination = party(&directory, tx.destination());
                if destination == source {
                    source
                } else {
                    format!("{source} -> {destination}")
                }
            } else {
                source
            };
            let line = self.renderer.system_transaction_line(i + 1, tx, &parties);
            self.say(&line)?;
        }
        Ok(())
    }

    fn print_balance(&mut self, message: &str, account: AccountId) -> anyhow::Result<()> {
        let balance = self.service.directory().account(account).app()?.balance().app()?;
        let line = format!("{message} New balance: {}", self.renderer.amount(balance));
        self.say(&line)
    }

    fn ask_amount(&mut self) -> anyhow::Result<Decimal> {
        let raw = self.ask("Amount: ")?;
        Ok(parse_amount(&raw).app()?)
    }

    fn ask_optional_amount(&mut self, prompt: &str) -> anyhow::Result<Option<Decimal>> {
        let raw = self.ask(prompt)?;
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(parse_amount(&raw).app()?))
    }

    fn ask_date(&mut self, prompt: &str) -> anyhow::Result<Option<NaiveDate>> {
        let raw = self.ask(prompt)?;
        if raw.is_empty() {
            return Ok(None);
        }
        let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
            AppError::Validation(format!("invalid date '{raw}', expected yyyy-MM-dd"))
        })?;
        Ok(Some(date))
    }

    /// Blank input falls back to `default`.
    fn ask_description(&mut self, default: &str) -> anyhow::Result<String> {
        let raw = self.ask("Description (Enter for default): ")?;
        Ok(if raw.is_empty() {
            default.to_string()
        } else {
            raw
        })
    }

    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool> {
        Ok(self.ask(prompt)?.eq_ignore_ascii_case("y"))
    }

    /// 1-based selection from `len` items; anything else prints a notice.
    fn pick(&mut self, prompt: &str, len: usize) -> anyhow::Result<Option<usize>> {
        let raw = self.ask(prompt)?;
        match raw.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => Ok(Some(n - 1)),
            _ => {
                self.say("Invalid selection.")?;
                Ok(None)
            }
        }
    }

    /// Prints a business rejection and carries on; anything else propagates.
    fn report(&mut self, operation: &str, result: anyhow::Result<()>) -> anyhow::Result<()> {
        let Err(err) = result else {
            return Ok(());
        };
        match err.downcast::<AppError>() {
            Ok(app) if app.is_fatal() => {
                Err(anyhow::Error::new(app).context(format!("{operation} failed")))
            }
            Ok(AppError::Blocked(message)) => self.say(&format!("{operation} blocked: {message}")),
            Ok(app) => self.say(&format!("{operation} failed: {app}")),
            Err(other) => Err(other),
        }
    }

    fn menu(&mut self, title: &str, options: &[&str]) -> anyhow::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== {title} ===")?;
        for option in options {
            writeln!(self.out, "{option}")?;
        }
        Ok(())
    }

    fn say(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{line}").context("failed to write output")
    }

    fn say_all(&mut self, lines: &[String]) -> anyhow::Result<()> {
        for line in lines {
            self.say(line)?;
        }
        Ok(())
    }

    /// Reads one trimmed line. At end of input returns an empty string and sets `eof`.
    fn ask(&mut self, prompt: &str) -> anyhow::Result<String> {
        if self.eof {
            return Ok(String::new());
        }
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).context("failed to read input")? == 0 {
            self.eof = true;
        }
        Ok(line.trim().to_string())
    }
}

/// Owner name for an account, or its short id once the owner is gone.
fn party(directory: &Directory, account: AccountId) -> String {
    directory
        .owner_of(account)
        .map_or_else(|_| account.short(), |owner| owner.full_name())
}
