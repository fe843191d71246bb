//! Cashdesk console
//!
//! Interactive banking simulator on top of the Cashdesk ledger core.

mod render;
mod seed;
mod shell;

use std::io;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cashdesk_core::{ActivityScreener, Directory, Ledger, ScreeningConfig, TransactionService};
use cashdesk_shared::AppConfig;

use crate::render::Renderer;
use crate::shell::Shell;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Logs go to stderr so they do not interleave with menus
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.filter))?,
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let directory = Arc::new(Directory::new());
    let ledger = Arc::new(Ledger::new());
    if config.console.seed_demo_data {
        seed::seed_demo_data(&directory, &ledger)?;
    }

    let screening = ScreeningConfig::from(&config.screening);
    info!(
        high_value_limit = %screening.high_value_limit,
        rapid_count = screening.rapid_count,
        repetitive_threshold = screening.repetitive_threshold,
        "screening configured"
    );
    let service = TransactionService::new(directory, ledger, ActivityScreener::new(screening));

    let stdin = io::stdin();
    let mut shell = Shell::new(
        service,
        Renderer::new(config.console.currency_symbol.clone()),
        stdin.lock(),
        io::stdout(),
    );
    shell.run()
}
