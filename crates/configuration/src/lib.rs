use config::{Environment, File, FileFormat};

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    AgeBands, ChurnRule, CohortSettings, CohortWindow, CustomerSettings, InventorySettings,
    RecencyBands, SalesSettings, Settings, SpendingPreset, SpendingThresholds,
};

/// Environment variables with this prefix override file values,
/// e.g. `RETAIL_INVENTORY__TOP_SELLERS_LIMIT=10`.
pub const ENV_PREFIX: &str = "RETAIL";

/// Loads the analytics configuration from a TOML file plus environment overrides.
///
/// The file is optional: every section has defaults, so a missing file yields
/// `Settings::default()` (after environment overrides). The result is validated
/// before it is returned.
pub fn load_config(path: &str) -> Result<Settings, ConfigError> {
    load_layered(path, environment())
}

/// `RETAIL_` prefix, `__` between nested keys.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_layered(path: &str, environment: Environment) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(environment)
        .build()?;

    finish(builder)
}

/// Same as [`load_config`] but reads the TOML document from memory and ignores the environment.
pub fn load_config_from_str(toml: &str) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(?settings, "Configuration loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(vars: &[(&str, &str)]) -> config::Map<String, String> {
        vars.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_overrides_nested_keys() {
        let env = environment().source(Some(overrides(&[
            ("RETAIL_INVENTORY__TOP_SELLERS_LIMIT", "12"),
            ("RETAIL_CUSTOMERS__RECENCY__ACTIVE_MAX_DAYS", "14"),
            ("OTHER_INVENTORY__TOP_SELLERS_LIMIT", "99"),
        ])));
        let settings = load_layered("does-not-exist", env).unwrap();

        assert_eq!(settings.inventory.top_sellers_limit, 12);
        assert_eq!(settings.customers.recency.active_max_days, 14);
        assert_eq!(settings.inventory.at_risk_max_stock, 200);
    }

    #[test]
    fn test_environment_overrides_are_validated() {
        let env = environment().source(Some(overrides(&[(
            "RETAIL_INVENTORY__TOP_SELLERS_LIMIT",
            "0",
        )])));
        assert!(matches!(
            load_layered("does-not-exist", env),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
