//! The serializable result of one full report run.

use analytics::report::*;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBundle {
    /// Reference date of the time-dependent reports.
    pub as_of: NaiveDate,
    pub inventory: InventoryReports,
    pub sales: SalesReports,
    pub customers: CustomerReports,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReports {
    pub stock_segmentation: Vec<StockSegmentRow>,
    pub stock_segment_summary: Vec<StockSegmentCount>,
    pub stock_value_by_category: Vec<CategoryStockValue>,
    pub stock_to_sales_ratio: Vec<StockToSalesRow>,
    pub depletion_forecast: Vec<DepletionForecastRow>,
    pub top_sellers: Vec<TopSellerRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReports {
    pub average_order_value_by_category: Vec<CategoryOrderValue>,
    pub pareto_products: Vec<ParetoRow>,
    pub category_profitability: Vec<CategoryProfitability>,
    pub product_profit_margins: Vec<ProductProfitability>,
    pub revenue_by_country: Vec<CountryRevenueRow>,
    pub revenue_by_month: Vec<MonthlyRevenueRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerReports {
    pub inactive_customers: Vec<InactiveCustomerRow>,
    pub repeat_purchasers: Vec<RepeatPurchaserRow>,
    pub top_decile_spenders: Vec<SpenderRankRow>,
    pub average_purchase_interval: Vec<PurchaseIntervalRow>,
    pub average_sale_amount_per_customer: Vec<AverageSaleRow>,
    pub lapsed_countries: Vec<LapsedCountryRow>,
    pub acquisition_rate_by_country: Vec<AcquisitionRow>,
    pub spending_segments: Vec<SpendingSegmentRow>,
    pub spending_segment_summary: Vec<SpendingSegmentSummary>,
    pub top_quartile_marital_status: Vec<MaritalStatusSpendRow>,
    pub demographic_order_frequency: Vec<DemographicFrequencyRow>,
    pub age_group_behavior: Vec<AgeGroupRow>,
    /// Only present when `cohort.window` is configured.
    pub churn: Option<ChurnReport>,
    pub recency_segments: Vec<RecencyRow>,
    pub recency_segment_summary: Vec<RecencySegmentCount>,
}
