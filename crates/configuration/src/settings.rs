use crate::error::ConfigError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the analytics run.
///
/// Every section is optional in the TOML file and falls back to its `Default`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub inventory: InventorySettings,
    #[serde(default)]
    pub sales: SalesSettings,
    #[serde(default)]
    pub customers: CustomerSettings,
    #[serde(default)]
    pub cohort: CohortSettings,
}

/// Parameters for the inventory reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    /// Upper bound (inclusive) of the `At_Risk` stock band.
    pub at_risk_max_stock: u32,
    /// Upper bound (inclusive) of the `Normal` stock band. Anything above is overstocked.
    pub normal_max_stock: u32,
    /// How many rows the top-sellers report returns.
    pub top_sellers_limit: usize,
}

/// Parameters for the sales and product reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SalesSettings {
    /// Cumulative share of total sales covered by the Pareto report (0.8 = 80%).
    pub pareto_share: Decimal,
    /// How many (gender, marital status, category) groups the demographic ranking returns.
    pub demographic_limit: usize,
}

/// Parameters for customer segmentation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CustomerSettings {
    pub spending: SpendingThresholds,
    pub recency: RecencyBands,
    pub age: AgeBands,
    /// A customer whose last purchase is older than this many days counts as lapsed.
    pub lapse_after_days: i64,
}

/// Spend thresholds for the High / Medium / Low segmentation.
///
/// Either a named preset (`spending = "premium"`) or explicit bounds
/// (`spending = { high_min = 7500, medium_min = 2500 }`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "SpendingSpec")]
pub struct SpendingThresholds {
    /// Total spend at or above this is `High`.
    pub high_min: Decimal,
    /// Total spend at or above this (and below `high_min`) is `Medium`.
    pub medium_min: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingPreset {
    Standard,
    Premium,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpendingSpec {
    Preset(SpendingPreset),
    Explicit { high_min: Decimal, medium_min: Decimal },
}

impl From<SpendingSpec> for SpendingThresholds {
    fn from(spec: SpendingSpec) -> Self {
        match spec {
            SpendingSpec::Preset(preset) => Self::preset(preset),
            SpendingSpec::Explicit {
                high_min,
                medium_min,
            } => Self {
                high_min,
                medium_min,
            },
        }
    }
}

impl SpendingThresholds {
    pub fn preset(preset: SpendingPreset) -> Self {
        match preset {
            SpendingPreset::Standard => Self {
                high_min: dec!(5000),
                medium_min: dec!(1000),
            },
            SpendingPreset::Premium => Self {
                high_min: dec!(10000),
                medium_min: dec!(5000),
            },
        }
    }
}

/// Day boundaries for the recency segmentation (all inclusive upper bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecencyBands {
    pub active_max_days: i64,
    pub recent_max_days: i64,
    pub lapsed_max_days: i64,
}

/// Age boundaries: younger than `young_below` is one group, older than `senior_above` another,
/// everything in between (inclusive) the middle group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgeBands {
    pub young_below: u32,
    pub senior_above: u32,
}

/// Parameters for the cohort churn report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CohortSettings {
    pub churn: ChurnRule,
    /// Join-date window of the cohort. When absent the churn report is skipped by the runner.
    pub window: Option<CohortWindow>,
}

/// How a cohort member is judged to have churned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ChurnRule {
    /// Churned unless a purchase falls strictly after the first purchase plus `grace_months`.
    NoRepeatAfterFirstPurchase {
        #[serde(default = "default_grace_months")]
        grace_months: u32,
    },
    /// Churned if there is no purchase in the last `days` days before the reference date.
    InactiveSince { days: i64 },
}

fn default_grace_months() -> u32 {
    1
}

/// An inclusive range of join dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CohortWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CohortWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.start > self.end {
            return Err(ConfigError::ValidationError(format!(
                "cohort window start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

// --- Default Implementations ---

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            at_risk_max_stock: 200,
            normal_max_stock: 500,
            top_sellers_limit: 5,
        }
    }
}

impl Default for SalesSettings {
    fn default() -> Self {
        Self {
            pareto_share: dec!(0.8),
            demographic_limit: 5,
        }
    }
}

impl Default for CustomerSettings {
    fn default() -> Self {
        Self {
            spending: SpendingThresholds::default(),
            recency: RecencyBands::default(),
            age: AgeBands::default(),
            lapse_after_days: 90,
        }
    }
}

impl Default for SpendingThresholds {
    fn default() -> Self {
        Self::preset(SpendingPreset::Standard)
    }
}

impl Default for RecencyBands {
    fn default() -> Self {
        Self {
            active_max_days: 30,
            recent_max_days: 60,
            lapsed_max_days: 90,
        }
    }
}

impl Default for AgeBands {
    fn default() -> Self {
        Self {
            young_below: 30,
            senior_above: 50,
        }
    }
}

impl Default for ChurnRule {
    fn default() -> Self {
        ChurnRule::NoRepeatAfterFirstPurchase {
            grace_months: default_grace_months(),
        }
    }
}

// --- Validation ---

impl Settings {
    /// Rejects settings whose thresholds would make the reports meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let inv = &self.inventory;
        if inv.normal_max_stock < inv.at_risk_max_stock {
            return Err(invalid(format!(
                "inventory.normal_max_stock ({}) must not be below at_risk_max_stock ({})",
                inv.normal_max_stock, inv.at_risk_max_stock
            )));
        }
        if inv.top_sellers_limit == 0 {
            return Err(invalid("inventory.top_sellers_limit must be positive"));
        }

        let sales = &self.sales;
        if sales.pareto_share <= Decimal::ZERO || sales.pareto_share > Decimal::ONE {
            return Err(invalid(format!(
                "sales.pareto_share must be in (0, 1], got {}",
                sales.pareto_share
            )));
        }
        if sales.demographic_limit == 0 {
            return Err(invalid("sales.demographic_limit must be positive"));
        }

        let customers = &self.customers;
        let spending = &customers.spending;
        if spending.medium_min > spending.high_min {
            return Err(invalid(format!(
                "customers.spending.medium_min ({}) must not exceed high_min ({})",
                spending.medium_min, spending.high_min
            )));
        }
        let recency = &customers.recency;
        if !(0 <= recency.active_max_days
            && recency.active_max_days < recency.recent_max_days
            && recency.recent_max_days < recency.lapsed_max_days)
        {
            return Err(invalid(
                "customers.recency bands must be strictly increasing and non-negative",
            ));
        }
        if customers.age.young_below > customers.age.senior_above {
            return Err(invalid("customers.age.young_below must not exceed senior_above"));
        }
        if customers.lapse_after_days < 0 {
            return Err(invalid("customers.lapse_after_days must not be negative"));
        }

        match self.cohort.churn {
            ChurnRule::InactiveSince { days } if days < 0 => {
                return Err(invalid("cohort.churn.days must not be negative"));
            }
            _ => {}
        }
        if let Some(window) = &self.cohort.window {
            window.validate()?;
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_config_from_str;

    #[test]
    fn test_empty_document_yields_defaults() {
        let settings = load_config_from_str("").unwrap();
        assert_eq!(settings.inventory.at_risk_max_stock, 200);
        assert_eq!(settings.inventory.normal_max_stock, 500);
        assert_eq!(settings.sales.pareto_share, dec!(0.8));
        assert_eq!(
            settings.customers.spending,
            SpendingThresholds::preset(SpendingPreset::Standard)
        );
        assert_eq!(settings.customers.lapse_after_days, 90);
        assert!(settings.cohort.window.is_none());
    }

    #[test]
    fn test_spending_preset_by_name() {
        let settings = load_config_from_str(
            r#"
            [customers]
            spending = "premium"
            "#,
        )
        .unwrap();
        assert_eq!(settings.customers.spending.high_min, dec!(10000));
        assert_eq!(settings.customers.spending.medium_min, dec!(5000));
    }

    #[test]
    fn test_explicit_spending_thresholds() {
        let settings = load_config_from_str(
            r#"
            [customers.spending]
            high_min = 7500
            medium_min = 2500
            "#,
        )
        .unwrap();
        assert_eq!(settings.customers.spending.high_min, dec!(7500));
        assert_eq!(settings.customers.spending.medium_min, dec!(2500));
    }

    #[test]
    fn test_churn_rule_and_window() {
        let settings = load_config_from_str(
            r#"
            [cohort]
            churn = { rule = "inactive_since", days = 60 }
            window = { start = "2024-01-01", end = "2024-03-31" }
            "#,
        )
        .unwrap();
        assert_eq!(settings.cohort.churn, ChurnRule::InactiveSince { days: 60 });
        let window = settings.cohort.window.unwrap();
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn test_inverted_stock_bands_rejected() {
        let err = load_config_from_str(
            r#"
            [inventory]
            at_risk_max_stock = 600
            normal_max_stock = 500
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_pareto_share_out_of_range_rejected() {
        let err = load_config_from_str("[sales]\npareto_share = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert!(CohortWindow::new(start, end).is_err());
    }
}
