//! Result rows produced by the `AnalyticsEngine`.
//!
//! Every report returns an ordered `Vec` of one of these row types. Monetary fields are
//! rounded to two places, shares and margins to four; `Option` marks a value that is
//! undefined for the row (a division by zero in the underlying metric).

use chrono::NaiveDate;
use core_types::{CustomerId, Gender, MaritalStatus, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==============================================================================
// Inventory
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StockSegment {
    #[serde(rename = "Out_Of_Stock")]
    OutOfStock,
    #[serde(rename = "At_Risk")]
    AtRisk,
    Normal,
    Overstocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSegmentRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    pub stock: u32,
    pub segment: StockSegment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSegmentCount {
    pub segment: StockSegment,
    pub products: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStockValue {
    pub category: String,
    pub stock_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockToSalesRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub stock: u32,
    pub total_sold: u64,
    pub stock_to_sales_ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepletionForecastRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub stock: u32,
    pub total_sold: u64,
    pub first_sale: NaiveDate,
    pub last_sale: NaiveDate,
    pub average_daily_quantity: Decimal,
    pub days_until_depletion: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSellerRow {
    pub rank: usize,
    pub product_id: ProductId,
    pub product_name: String,
    pub total_quantity: u64,
}

// ==============================================================================
// Sales and profitability
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOrderValue {
    pub category: String,
    pub order_count: usize,
    pub average_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoRow {
    pub rank: usize,
    pub product_id: ProductId,
    pub product_name: String,
    pub sales_amount: Decimal,
    pub cumulative_amount: Decimal,
    pub cumulative_share: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfitability {
    pub category: String,
    pub sales_amount: Decimal,
    pub quantity_sold: u64,
    pub cost_amount: Decimal,
    pub profit: Decimal,
    pub profit_margin: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProfitability {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    pub sales_amount: Decimal,
    pub quantity_sold: u64,
    pub cost_amount: Decimal,
    pub profit: Decimal,
    pub profit_margin: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRevenueRow {
    pub country: String,
    pub order_count: usize,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenueRow {
    /// Calendar month as `YYYY-MM`.
    pub month: String,
    pub revenue: Decimal,
    pub growth_rate_pct: Option<Decimal>,
}

// ==============================================================================
// Customers
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InactiveCustomerRow {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub email: String,
    pub country: String,
    pub join_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatPurchaserRow {
    pub customer_id: CustomerId,
    pub full_name: String,
    /// Distinct products this customer bought in two or more separate sales.
    pub repeated_products: usize,
    pub total_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpenderRankRow {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub total_spend: Decimal,
    /// 1-based NTILE bucket, 1 holding the highest spenders.
    pub bucket: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseIntervalRow {
    pub customer_id: CustomerId,
    pub purchase_count: usize,
    pub average_interval_days: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageSaleRow {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub order_count: usize,
    pub average_sale_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapsedCountryRow {
    pub country: String,
    pub lapsed_customers: usize,
    pub total_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionRow {
    pub country: String,
    pub customers: usize,
    pub acquisition_rate_pct: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpendingSegment {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSegmentRow {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub total_spend: Decimal,
    pub segment: SpendingSegment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSegmentSummary {
    pub segment: SpendingSegment,
    pub customers: usize,
    pub average_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaritalStatusSpendRow {
    pub marital_status: MaritalStatus,
    pub customers: usize,
    pub average_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicFrequencyRow {
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub category: String,
    pub order_count: usize,
    pub distinct_customers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    /// Younger than `customers.age.young_below` (30 by default).
    Young,
    /// Between the two bounds, inclusive.
    Middle,
    /// Older than `customers.age.senior_above` (50 by default).
    Senior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroupRow {
    pub age_group: AgeGroup,
    pub category: String,
    pub purchase_count: usize,
    pub average_purchase_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnReport {
    pub cohort_start: NaiveDate,
    pub cohort_end: NaiveDate,
    pub cohort_size: usize,
    pub churned: usize,
    /// `None` for an empty cohort.
    pub churn_rate_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecencySegment {
    Active,
    Recent,
    Lapsed,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyRow {
    pub customer_id: CustomerId,
    pub full_name: String,
    pub last_purchase: Option<NaiveDate>,
    pub days_since_last_purchase: Option<i64>,
    pub segment: RecencySegment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencySegmentCount {
    pub segment: RecencySegment,
    pub customers: usize,
}
