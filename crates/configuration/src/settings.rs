use crate::catalog::FundCatalog;
use crate::error::ConfigError;
use core_types::FundProduct;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Fund product definitions. Turned into an immutable [`FundCatalog`] at startup.
    pub funds: Vec<FundProduct>,
    #[serde(default)]
    pub reconciliation: ReconciliationSettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Gap-percentage thresholds for risk classification.
///
/// Each threshold is the inclusive lower bound of its level: a gap of exactly
/// `critical_threshold_pct` is CRITICAL.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReconciliationSettings {
    pub medium_threshold_pct: Decimal,
    pub high_threshold_pct: Decimal,
    pub critical_threshold_pct: Decimal,
}

/// Parameters for the trading analytics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyticsSettings {
    /// Length of the trade analysis window. Used to annualize returns for Calmar.
    pub window_days: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When present, logs are also written to a daily-rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---
// These allow a user to omit the optional sections from their toml
// and still have it work with sensible defaults.

impl Default for ReconciliationSettings {
    fn default() -> Self {
        Self {
            medium_threshold_pct: dec!(10),
            high_threshold_pct: dec!(25),
            critical_threshold_pct: dec!(50),
        }
    }
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self { window_days: 30 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ReconciliationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.medium_threshold_pct <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "medium_threshold_pct must be greater than 0".to_string(),
            ));
        }
        if self.medium_threshold_pct >= self.high_threshold_pct
            || self.high_threshold_pct >= self.critical_threshold_pct
        {
            return Err(ConfigError::ValidationError(format!(
                "risk thresholds must be strictly increasing, got {} / {} / {}",
                self.medium_threshold_pct, self.high_threshold_pct, self.critical_threshold_pct
            )));
        }
        Ok(())
    }
}

impl Settings {
    /// Validates every section and builds the fund catalog.
    pub fn validate(&self) -> Result<FundCatalog, ConfigError> {
        self.reconciliation.validate()?;
        if self.analytics.window_days == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.window_days must be greater than 0".to_string(),
            ));
        }
        FundCatalog::new(self.funds.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_valid() {
        assert!(ReconciliationSettings::default().validate().is_ok());
    }

    #[test]
    fn overlapping_thresholds_are_rejected() {
        let settings = ReconciliationSettings {
            medium_threshold_pct: dec!(10),
            high_threshold_pct: dec!(60),
            critical_threshold_pct: dec!(50),
        };
        assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn zero_window_is_rejected() {
        let settings = Settings {
            funds: Vec::new(),
            reconciliation: ReconciliationSettings::default(),
            analytics: AnalyticsSettings { window_days: 0 },
            logging: LoggingSettings::default(),
        };
        assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));
    }
}
