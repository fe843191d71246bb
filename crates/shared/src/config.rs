//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Activity screening thresholds.
    #[serde(default)]
    pub screening: ScreeningSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Console shell configuration.
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Thresholds for the activity screener.
#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningSettings {
    /// Amounts strictly above this are flagged as high value.
    #[serde(default = "default_high_value_limit")]
    pub high_value_limit: Decimal,
    /// Number of transactions that form a burst.
    #[serde(default = "default_rapid_count")]
    pub rapid_count: usize,
    /// Maximum span of a burst in milliseconds.
    #[serde(default = "default_rapid_window_ms")]
    pub rapid_window_ms: u64,
    /// Group size at which identical transactions count as repetitive.
    #[serde(default = "default_repetitive_threshold")]
    pub repetitive_threshold: usize,
}

fn default_high_value_limit() -> Decimal {
    Decimal::from(10_000)
}

fn default_rapid_count() -> usize {
    5
}

fn default_rapid_window_ms() -> u64 {
    60_000 // 1 minute
}

fn default_repetitive_threshold() -> usize {
    8
}

impl Default for ScreeningSettings {
    fn default() -> Self {
        Self {
            high_value_limit: default_high_value_limit(),
            rapid_count: default_rapid_count(),
            rapid_window_ms: default_rapid_window_ms(),
            repetitive_threshold: default_repetitive_threshold(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "cashdesk=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Console shell configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Load the demo customers, accounts, and transactions at startup.
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
    /// Symbol printed in front of amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_seed_demo_data() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: default_seed_demo_data(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`, then
    /// `CASHDESK__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("CASHDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
