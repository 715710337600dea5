use crate::engine::AnalyticsEngine;
use crate::money::{checked_ratio, round_money, round_whole};
use crate::report::{
    CategoryStockValue, DepletionForecastRow, StockSegment, StockSegmentCount, StockSegmentRow,
    StockToSalesRow, TopSellerRow,
};
use crate::snapshot::Snapshot;
use configuration::InventorySettings;
use rust_decimal::prelude::*;
use std::collections::BTreeMap;

impl AnalyticsEngine {
    /// Assigns every product to exactly one stock band, in product-id order.
    pub fn stock_segmentation(&self, snapshot: &Snapshot) -> Vec<StockSegmentRow> {
        snapshot
            .products()
            .iter()
            .map(|product| StockSegmentRow {
                product_id: product.id,
                product_name: product.name.clone(),
                category: product.category.clone(),
                stock: product.stock,
                segment: classify_stock(product.stock, &self.settings.inventory),
            })
            .collect()
    }

    /// Number of products per stock band. All four bands are listed, in band order.
    pub fn stock_segment_summary(&self, snapshot: &Snapshot) -> Vec<StockSegmentCount> {
        let mut counts: BTreeMap<StockSegment, usize> = [
            StockSegment::OutOfStock,
            StockSegment::AtRisk,
            StockSegment::Normal,
            StockSegment::Overstocked,
        ]
        .into_iter()
        .map(|segment| (segment, 0))
        .collect();

        for product in snapshot.products() {
            *counts
                .entry(classify_stock(product.stock, &self.settings.inventory))
                .or_default() += 1;
        }

        counts
            .into_iter()
            .map(|(segment, products)| StockSegmentCount { segment, products })
            .collect()
    }

    /// Value of stock on hand (price x stock) per category, highest first.
    pub fn stock_value_by_category(&self, snapshot: &Snapshot) -> Vec<CategoryStockValue> {
        let mut by_category: BTreeMap<&str, Decimal> = BTreeMap::new();
        for product in snapshot.products() {
            *by_category.entry(product.category.as_str()).or_default() += product.stock_value();
        }

        let mut rows: Vec<CategoryStockValue> = by_category
            .into_iter()
            .map(|(category, value)| CategoryStockValue {
                category: category.to_string(),
                stock_value: round_money(value),
            })
            .collect();
        // The map is already in category order, so a stable sort keeps ties alphabetical.
        rows.sort_by(|a, b| b.stock_value.cmp(&a.stock_value));
        rows
    }

    /// Stock on hand divided by units sold, for products that have sold at least one unit.
    pub fn stock_to_sales_ratio(&self, snapshot: &Snapshot) -> Vec<StockToSalesRow> {
        let mut rows: Vec<(Decimal, StockToSalesRow)> = snapshot
            .products()
            .iter()
            .filter_map(|product| {
                let total_sold = units_sold(snapshot, product.id);
                let ratio = checked_ratio(Decimal::from(product.stock), Decimal::from(total_sold))?;
                Some((
                    ratio,
                    StockToSalesRow {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        stock: product.stock,
                        total_sold,
                        stock_to_sales_ratio: round_money(ratio),
                    },
                ))
            })
            .collect();

        rows.sort_by(|(ra, a), (rb, b)| rb.cmp(ra).then_with(|| a.product_id.cmp(&b.product_id)));
        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Days until the current stock runs out at the historical average daily sales rate.
    ///
    /// The rate is units sold divided by the inclusive day span between the first and last
    /// sale. Products without sales or without remaining stock are not forecast.
    pub fn depletion_forecast(&self, snapshot: &Snapshot) -> Vec<DepletionForecastRow> {
        let mut rows = Vec::new();
        for product in snapshot.products() {
            if product.stock == 0 {
                continue;
            }
            let mut sales = snapshot.sales_of_product(product.id);
            let Some(first) = sales.next() else {
                continue;
            };
            let mut last_sale = first.order_date;
            let mut total_sold = u64::from(first.quantity);
            for sale in sales {
                last_sale = sale.order_date;
                total_sold += u64::from(sale.quantity);
            }

            let span_days = (last_sale - first.order_date).num_days() + 1;
            let Some(daily) = checked_ratio(Decimal::from(total_sold), Decimal::from(span_days))
            else {
                continue;
            };
            if daily <= Decimal::ZERO {
                continue;
            }
            let Some(days) = checked_ratio(Decimal::from(product.stock), daily) else {
                continue;
            };

            rows.push(DepletionForecastRow {
                product_id: product.id,
                product_name: product.name.clone(),
                stock: product.stock,
                total_sold,
                first_sale: first.order_date,
                last_sale,
                average_daily_quantity: round_money(daily),
                days_until_depletion: round_whole(days).to_i64().unwrap_or(i64::MAX),
            });
        }

        rows.sort_by(|a, b| {
            b.days_until_depletion
                .cmp(&a.days_until_depletion)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        tracing::debug!(rows = rows.len(), "Depletion forecast computed");
        rows
    }

    /// Best-selling products by units sold, limited to `inventory.top_sellers_limit`.
    pub fn top_sellers(&self, snapshot: &Snapshot) -> Vec<TopSellerRow> {
        let mut totals: Vec<_> = snapshot
            .products()
            .iter()
            .map(|product| (product, units_sold(snapshot, product.id)))
            .filter(|(_, total)| *total > 0)
            .collect();
        totals.sort_by(|(pa, a), (pb, b)| b.cmp(a).then_with(|| pa.id.cmp(&pb.id)));

        totals
            .into_iter()
            .take(self.settings.inventory.top_sellers_limit)
            .enumerate()
            .map(|(idx, (product, total_quantity))| TopSellerRow {
                rank: idx + 1,
                product_id: product.id,
                product_name: product.name.clone(),
                total_quantity,
            })
            .collect()
    }
}

/// Ordered band rules, first match wins. `stock == 0` also falls inside the at-risk
/// range (`0..=at_risk_max_stock`), so the out-of-stock rule has to be checked first.
fn classify_stock(stock: u32, inventory: &InventorySettings) -> StockSegment {
    let rules: [(StockSegment, &dyn Fn(u32) -> bool); 3] = [
        (StockSegment::OutOfStock, &|s: u32| s == 0),
        (StockSegment::AtRisk, &|s: u32| s <= inventory.at_risk_max_stock),
        (StockSegment::Normal, &|s: u32| s <= inventory.normal_max_stock),
    ];

    rules
        .iter()
        .find(|(_, matches)| matches(stock))
        .map(|(segment, _)| *segment)
        .unwrap_or(StockSegment::Overstocked)
}

fn units_sold(snapshot: &Snapshot, product_id: core_types::ProductId) -> u64 {
    snapshot
        .sales_of_product(product_id)
        .map(|sale| u64::from(sale.quantity))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{customer, d, product, sale};
    use core_types::ProductId;
    use rust_decimal_macros::dec;

    fn engine() -> AnalyticsEngine {
        AnalyticsEngine::default()
    }

    #[test]
    fn test_stock_bands_first_match_wins() {
        let snapshot = Snapshot::new(
            vec![],
            vec![
                product(1, "A", dec!(1), 0),
                product(2, "A", dec!(1), 150),
                product(3, "A", dec!(1), 300),
                product(4, "A", dec!(1), 600),
            ],
            vec![],
        )
        .unwrap();

        let segments: Vec<StockSegment> = engine()
            .stock_segmentation(&snapshot)
            .iter()
            .map(|r| r.segment)
            .collect();
        assert_eq!(
            segments,
            vec![
                StockSegment::OutOfStock,
                StockSegment::AtRisk,
                StockSegment::Normal,
                StockSegment::Overstocked
            ]
        );
    }

    #[test]
    fn test_stock_band_boundaries() {
        let inv = InventorySettings::default();
        assert_eq!(classify_stock(0, &inv), StockSegment::OutOfStock);
        assert_eq!(classify_stock(1, &inv), StockSegment::AtRisk);
        assert_eq!(classify_stock(200, &inv), StockSegment::AtRisk);
        assert_eq!(classify_stock(201, &inv), StockSegment::Normal);
        assert_eq!(classify_stock(500, &inv), StockSegment::Normal);
        assert_eq!(classify_stock(501, &inv), StockSegment::Overstocked);
    }

    #[test]
    fn test_segment_summary_lists_every_band() {
        let snapshot = Snapshot::new(
            vec![],
            vec![product(1, "A", dec!(1), 0), product(2, "A", dec!(1), 0)],
            vec![],
        )
        .unwrap();
        let summary = engine().stock_segment_summary(&snapshot);
        assert_eq!(summary.len(), 4);
        assert_eq!(summary[0].segment, StockSegment::OutOfStock);
        assert_eq!(summary[0].products, 2);
        assert!(summary[1..].iter().all(|c| c.products == 0));
    }

    #[test]
    fn test_stock_value_by_category() {
        let snapshot = Snapshot::new(
            vec![],
            vec![
                product(1, "Garden", dec!(2.50), 10),
                product(2, "Tools", dec!(10), 4),
                product(3, "Garden", dec!(1.25), 4),
                product(4, "Books", dec!(30), 1),
            ],
            vec![],
        )
        .unwrap();
        let rows = engine().stock_value_by_category(&snapshot);
        let flat: Vec<(&str, Decimal)> =
            rows.iter().map(|r| (r.category.as_str(), r.stock_value)).collect();
        assert_eq!(
            flat,
            vec![("Tools", dec!(40)), ("Books", dec!(30)), ("Garden", dec!(30))]
        );
    }

    #[test]
    fn test_stock_to_sales_ratio_skips_unsold_products() {
        let snapshot = Snapshot::new(
            vec![customer(1, "DE", d(2024, 1, 1))],
            vec![
                product(1, "A", dec!(1), 100),
                product(2, "A", dec!(1), 10),
                product(3, "A", dec!(1), 50),
            ],
            vec![
                sale(1, 1, 1, d(2024, 1, 1), 3),
                sale(2, 1, 2, d(2024, 1, 2), 4),
            ],
        )
        .unwrap();
        let rows = engine().stock_to_sales_ratio(&snapshot);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, ProductId(1));
        assert_eq!(rows[0].total_sold, 3);
        assert_eq!(rows[0].stock_to_sales_ratio, dec!(33.33));
        assert_eq!(rows[1].stock_to_sales_ratio, dec!(2.50));
    }

    #[test]
    fn test_depletion_forecast_uses_inclusive_span() {
        let snapshot = Snapshot::new(
            vec![customer(1, "DE", d(2024, 1, 1))],
            vec![
                product(1, "A", dec!(1), 100),
                product(2, "A", dec!(1), 0),
                product(3, "A", dec!(1), 9),
            ],
            vec![
                // 20 units over 1..=10 January: 2 per day, 100 / 2 = 50 days.
                sale(1, 1, 1, d(2024, 1, 1), 5),
                sale(2, 1, 1, d(2024, 1, 10), 15),
                sale(3, 1, 2, d(2024, 1, 1), 5),
                // Single-day span: 4 per day, 9 / 4 = 2.25 rounds to 2.
                sale(4, 1, 3, d(2024, 1, 5), 4),
            ],
        )
        .unwrap();
        let rows = engine().depletion_forecast(&snapshot);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, ProductId(1));
        assert_eq!(rows[0].average_daily_quantity, dec!(2));
        assert_eq!(rows[0].days_until_depletion, 50);
        assert_eq!(rows[1].product_id, ProductId(3));
        assert_eq!(rows[1].days_until_depletion, 2);
    }

    #[test]
    fn test_top_sellers_limited_and_ranked() {
        let products: Vec<_> = (1..=7).map(|id| product(id, "A", dec!(1), 10)).collect();
        let sales: Vec<_> = (1..=7)
            .map(|id| sale(id, 1, id, d(2024, 1, 1), id))
            .collect();
        let snapshot =
            Snapshot::new(vec![customer(1, "DE", d(2024, 1, 1))], products, sales).unwrap();

        let rows = engine().top_sellers(&snapshot);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].product_id, ProductId(7));
        assert_eq!(rows[4].product_id, ProductId(3));
    }
}
