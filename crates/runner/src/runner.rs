use crate::bundle::{CustomerReports, InventoryReports, ReportBundle, SalesReports};
use crate::error::RunnerError;
use crate::store::SnapshotStore;
use analytics::{AnalyticsEngine, Snapshot};
use chrono::NaiveDate;
use configuration::Settings;
use futures::future::join_all;
use std::sync::Arc;

/// Runs the whole report suite against the store's current snapshot.
///
/// The three report groups are CPU-bound, so each one runs on tokio's blocking pool.
/// All groups of one run share the same `Arc<Snapshot>`.
#[derive(Debug, Clone)]
pub struct ReportRunner {
    engine: Arc<AnalyticsEngine>,
    store: Arc<SnapshotStore>,
}

impl ReportRunner {
    pub fn new(settings: Settings, store: Arc<SnapshotStore>) -> Result<Self, RunnerError> {
        let engine = AnalyticsEngine::new(settings)?;
        Ok(Self {
            engine: Arc::new(engine),
            store,
        })
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub async fn run_all(&self, as_of: NaiveDate) -> Result<ReportBundle, RunnerError> {
        let snapshot = self.store.current().await;
        tracing::info!(%as_of, sales = snapshot.sales().len(), "Running report suite");

        let tasks: Vec<_> = ReportGroup::ALL
            .into_iter()
            .map(|group| {
                let engine = Arc::clone(&self.engine);
                let snapshot = Arc::clone(&snapshot);
                tokio::task::spawn_blocking(move || group.run(&engine, &snapshot, as_of))
            })
            .collect();

        let mut inventory = None;
        let mut sales = None;
        let mut customers = None;
        for result in join_all(tasks).await {
            match result? {
                GroupReports::Inventory(reports) => inventory = Some(reports),
                GroupReports::Sales(reports) => sales = Some(reports),
                GroupReports::Customers(reports) => customers = Some(reports),
            }
        }

        tracing::info!(%as_of, "Report suite complete");
        Ok(ReportBundle {
            as_of,
            inventory: inventory.ok_or(RunnerError::MissingGroup("inventory"))?,
            sales: sales.ok_or(RunnerError::MissingGroup("sales"))?,
            customers: customers.ok_or(RunnerError::MissingGroup("customers"))?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum ReportGroup {
    Inventory,
    Sales,
    Customers,
}

enum GroupReports {
    Inventory(InventoryReports),
    Sales(SalesReports),
    Customers(CustomerReports),
}

impl ReportGroup {
    const ALL: [ReportGroup; 3] = [Self::Inventory, Self::Sales, Self::Customers];

    fn run(self, engine: &AnalyticsEngine, snapshot: &Snapshot, as_of: NaiveDate) -> GroupReports {
        match self {
            Self::Inventory => GroupReports::Inventory(InventoryReports {
                stock_segmentation: rows("stock_segmentation", engine.stock_segmentation(snapshot)),
                stock_segment_summary: rows(
                    "stock_segment_summary",
                    engine.stock_segment_summary(snapshot),
                ),
                stock_value_by_category: rows(
                    "stock_value_by_category",
                    engine.stock_value_by_category(snapshot),
                ),
                stock_to_sales_ratio: rows(
                    "stock_to_sales_ratio",
                    engine.stock_to_sales_ratio(snapshot),
                ),
                depletion_forecast: rows("depletion_forecast", engine.depletion_forecast(snapshot)),
                top_sellers: rows("top_sellers", engine.top_sellers(snapshot)),
            }),
            Self::Sales => GroupReports::Sales(SalesReports {
                average_order_value_by_category: rows(
                    "average_order_value_by_category",
                    engine.average_order_value_by_category(snapshot),
                ),
                pareto_products: rows("pareto_products", engine.pareto_products(snapshot)),
                category_profitability: rows(
                    "category_profitability",
                    engine.category_profitability(snapshot),
                ),
                product_profit_margins: rows(
                    "product_profit_margins",
                    engine.product_profit_margins(snapshot),
                ),
                revenue_by_country: rows("revenue_by_country", engine.revenue_by_country(snapshot)),
                revenue_by_month: rows("revenue_by_month", engine.revenue_by_month(snapshot)),
            }),
            Self::Customers => {
                let churn = match engine.settings().cohort.window {
                    Some(window) => Some(engine.churn_rate(snapshot, &window, as_of)),
                    None => {
                        tracing::debug!("No cohort window configured, skipping churn");
                        None
                    }
                };
                GroupReports::Customers(CustomerReports {
                    inactive_customers: rows(
                        "inactive_customers",
                        engine.inactive_customers(snapshot),
                    ),
                    repeat_purchasers: rows(
                        "repeat_purchasers",
                        engine.repeat_purchasers(snapshot),
                    ),
                    top_decile_spenders: rows(
                        "top_decile_spenders",
                        engine.top_decile_spenders(snapshot),
                    ),
                    average_purchase_interval: rows(
                        "average_purchase_interval",
                        engine.average_purchase_interval(snapshot),
                    ),
                    average_sale_amount_per_customer: rows(
                        "average_sale_amount_per_customer",
                        engine.average_sale_amount_per_customer(snapshot),
                    ),
                    lapsed_countries: rows(
                        "lapsed_countries",
                        engine.lapsed_countries(snapshot, as_of),
                    ),
                    acquisition_rate_by_country: rows(
                        "acquisition_rate_by_country",
                        engine.acquisition_rate_by_country(snapshot),
                    ),
                    spending_segments: rows(
                        "spending_segments",
                        engine.spending_segments(snapshot),
                    ),
                    spending_segment_summary: rows(
                        "spending_segment_summary",
                        engine.spending_segment_summary(snapshot),
                    ),
                    top_quartile_marital_status: rows(
                        "top_quartile_marital_status",
                        engine.top_quartile_marital_status(snapshot),
                    ),
                    demographic_order_frequency: rows(
                        "demographic_order_frequency",
                        engine.demographic_order_frequency(snapshot),
                    ),
                    age_group_behavior: rows(
                        "age_group_behavior",
                        engine.age_group_behavior(snapshot, as_of),
                    ),
                    churn,
                    recency_segments: rows(
                        "recency_segments",
                        engine.recency_segments(snapshot, as_of),
                    ),
                    recency_segment_summary: rows(
                        "recency_segment_summary",
                        engine.recency_segment_summary(snapshot, as_of),
                    ),
                })
            }
        }
    }
}

fn rows<T>(report: &'static str, rows: Vec<T>) -> Vec<T> {
    tracing::debug!(report, rows = rows.len(), "Report computed");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::CohortWindow;
    use core_types::{Customer, CustomerId, Gender, MaritalStatus, Product, ProductId, Sale, SaleId};
    use rust_decimal_macros::dec;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn snapshot(extra_sales: u32) -> Snapshot {
        let customers = (1..=3)
            .map(|id| Customer {
                id: CustomerId(id),
                first_name: format!("First{id}"),
                last_name: format!("Last{id}"),
                gender: Gender::Female,
                marital_status: MaritalStatus::Single,
                email: format!("c{id}@example.com"),
                country: "DE".to_string(),
                join_date: d(2024, 1, id),
                birth_date: d(1990, 1, 1),
            })
            .collect();
        let products = vec![
            Product {
                id: ProductId(1),
                name: "Hammer".to_string(),
                category: "Tools".to_string(),
                price: dec!(20),
                cost: dec!(12),
                stock: 150,
            },
            Product {
                id: ProductId(2),
                name: "Novel".to_string(),
                category: "Books".to_string(),
                price: dec!(8),
                cost: dec!(3),
                stock: 800,
            },
        ];
        let sales = (1..=2 + extra_sales)
            .map(|id| Sale {
                id: SaleId(id),
                customer_id: CustomerId(1 + id % 3),
                product_id: ProductId(1 + id % 2),
                order_date: d(2024, 2, id),
                quantity: 1,
                amount: None,
            })
            .collect();
        Snapshot::new(customers, products, sales).unwrap()
    }

    #[tokio::test]
    async fn test_run_all_fills_every_group() {
        let store = Arc::new(SnapshotStore::new(snapshot(0)));
        let runner = ReportRunner::new(Settings::default(), store).unwrap();
        let bundle = runner.run_all(d(2024, 3, 1)).await.unwrap();

        assert_eq!(bundle.inventory.stock_segmentation.len(), 2);
        assert_eq!(bundle.inventory.stock_segment_summary.len(), 4);
        assert_eq!(bundle.sales.revenue_by_month.len(), 1);
        assert_eq!(bundle.customers.inactive_customers.len(), 1);
        assert_eq!(bundle.customers.recency_segments.len(), 3);
        assert!(bundle.customers.churn.is_none());
    }

    #[tokio::test]
    async fn test_run_all_is_idempotent() {
        let store = Arc::new(SnapshotStore::new(snapshot(4)));
        let runner = ReportRunner::new(Settings::default(), store).unwrap();
        let first = runner.run_all(d(2024, 3, 1)).await.unwrap();
        let second = runner.run_all(d(2024, 3, 1)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_churn_runs_when_window_is_configured() {
        let mut settings = Settings::default();
        settings.cohort.window = Some(CohortWindow::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap());
        let store = Arc::new(SnapshotStore::new(snapshot(0)));
        let runner = ReportRunner::new(settings, store).unwrap();

        let churn = runner.run_all(d(2024, 6, 1)).await.unwrap().customers.churn.unwrap();
        assert_eq!(churn.cohort_size, 3);
        // Both buyers bought once, the first customer never did.
        assert_eq!(churn.churned, 3);
    }

    #[tokio::test]
    async fn test_replaced_snapshot_is_used_by_next_run() {
        let store = Arc::new(SnapshotStore::new(snapshot(0)));
        let runner = ReportRunner::new(Settings::default(), Arc::clone(&store)).unwrap();
        let held = store.current().await;

        let previous = store.replace(snapshot(4)).await;
        assert!(Arc::ptr_eq(&held, &previous));
        assert_eq!(held.sales().len(), 2);

        let bundle = runner.run_all(d(2024, 3, 1)).await.unwrap();
        assert_eq!(bundle.customers.inactive_customers.len(), 0);
        assert_eq!(runner.store().current().await.sales().len(), 6);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.sales.pareto_share = dec!(1.5);
        let store = Arc::new(SnapshotStore::new(snapshot(0)));
        assert!(matches!(
            ReportRunner::new(settings, store),
            Err(RunnerError::Analytics(_))
        ));
    }
}
