use std::path::Path;

// Declare the modules that make up this crate.
pub mod catalog;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use catalog::FundCatalog;
pub use error::ConfigError;
pub use settings::{AnalyticsSettings, LoggingSettings, ReconciliationSettings, Settings};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// deserializes it into our strongly-typed `Settings` struct, and returns it.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the configuration from an explicit path.
///
/// Values can be overridden with `KEYSTONE__<SECTION>__<KEY>` environment variables,
/// e.g. `KEYSTONE__ANALYTICS__WINDOW_DAYS=90`.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("KEYSTONE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::FundCode;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = r#"
[[funds]]
code = "CORE"
name = "Core Fund"
monthly_rate_pct = 1.5
minimum_investment = 10000
incubation_months = 2
hold_months = 12
redemption_frequency_months = 1

[[funds]]
code = "UNLIMITED"
name = "Unlimited Fund"
monthly_rate_pct = 0
minimum_investment = 250000
incubation_months = 2
hold_months = 12
redemption_frequency_months = 3
invitation_only = true

[reconciliation]
medium_threshold_pct = 10
high_threshold_pct = 25
critical_threshold_pct = 50
"#;

    #[test]
    fn loads_catalog_and_falls_back_to_section_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let settings = load_config_from(file.path()).unwrap();
        let catalog = settings.validate().unwrap();

        let core = catalog.get(FundCode::Core).unwrap();
        assert_eq!(core.monthly_rate_pct, dec!(1.5));
        assert_eq!(core.incubation_months, 2);
        assert!(!core.guaranteed);
        assert!(catalog.get(FundCode::Unlimited).unwrap().invitation_only);

        assert_eq!(settings.reconciliation.critical_threshold_pct, dec!(50));
        assert_eq!(settings.analytics.window_days, 30);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = load_config_from(Path::new("/definitely/not/here/config.toml"));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
