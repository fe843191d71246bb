//! Screening thresholds.

use chrono::TimeDelta;
use rust_decimal::Decimal;

use cashdesk_shared::config::ScreeningSettings;

/// Thresholds used by [`super::ActivityScreener`].
///
/// A `rapid_count` or `repetitive_threshold` of zero disables that rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningConfig {
    /// Amounts strictly above this are flagged.
    pub high_value_limit: Decimal,
    /// Number of transactions that form a burst.
    pub rapid_count: usize,
    /// Maximum first-to-last span of a burst (inclusive).
    pub rapid_window: TimeDelta,
    /// Group size at which identical transactions are flagged.
    pub repetitive_threshold: usize,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self::from(&ScreeningSettings::default())
    }
}

impl From<&ScreeningSettings> for ScreeningConfig {
    fn from(settings: &ScreeningSettings) -> Self {
        let window_ms = i64::try_from(settings.rapid_window_ms).unwrap_or(i64::MAX);
        Self {
            high_value_limit: settings.high_value_limit,
            rapid_count: settings.rapid_count,
            rapid_window: TimeDelta::try_milliseconds(window_ms).unwrap_or(TimeDelta::MAX),
            repetitive_threshold: settings.repetitive_threshold,
        }
    }
}

impl ScreeningConfig {
    /// Overrides the high-value limit.
    #[must_use]
    pub fn with_high_value_limit(mut self, limit: Decimal) -> Self {
        self.high_value_limit = limit;
        self
    }

    /// Overrides the burst rule.
    #[must_use]
    pub fn with_rapid(mut self, count: usize, window: TimeDelta) -> Self {
        self.rapid_count = count;
        self.rapid_window = window;
        self
    }

    /// Overrides the repetitive-pattern threshold.
    #[must_use]
    pub fn with_repetitive_threshold(mut self, threshold: usize) -> Self {
        self.repetitive_threshold = threshold;
        self
    }

    /// A configuration that never flags anything.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            high_value_limit: Decimal::MAX,
            rapid_count: 0,
            rapid_window: TimeDelta::zero(),
            repetitive_threshold: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = ScreeningConfig::default();
        assert_eq!(config.high_value_limit, dec!(10000));
        assert_eq!(config.rapid_count, 5);
        assert_eq!(config.rapid_window, TimeDelta::seconds(60));
        assert_eq!(config.repetitive_threshold, 8);
    }

    #[test]
    fn test_from_settings() {
        let settings = ScreeningSettings {
            high_value_limit: dec!(500),
            rapid_count: 3,
            rapid_window_ms: 1_500,
            repetitive_threshold: 4,
        };
        let config = ScreeningConfig::from(&settings);
        assert_eq!(config.high_value_limit, dec!(500));
        assert_eq!(config.rapid_window, TimeDelta::milliseconds(1_500));
        assert_eq!(config.repetitive_threshold, 4);
    }

    #[test]
    fn test_huge_window_saturates() {
        let settings = ScreeningSettings {
            rapid_window_ms: u64::MAX,
            ..ScreeningSettings::default()
        };
        assert_eq!(ScreeningConfig::from(&settings).rapid_window, TimeDelta::MAX);
    }
}
