use crate::engine::AnalyticsEngine;
use crate::money::{checked_ratio, mean, round_money, round_ratio};
use crate::report::{
    CategoryOrderValue, CategoryProfitability, CountryRevenueRow, MonthlyRevenueRow, ParetoRow,
    ProductProfitability,
};
use crate::snapshot::Snapshot;
use crate::window::{cumulative_shares, growth_rates};
use chrono::Datelike;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Running sums behind the profitability reports.
#[derive(Debug, Default, Clone, Copy)]
struct Margins {
    sales: Decimal,
    cost: Decimal,
    quantity: u64,
}

impl Margins {
    fn add(&mut self, revenue: Decimal, cost: Decimal, quantity: u32) {
        self.sales += revenue;
        self.cost += cost;
        self.quantity += u64::from(quantity);
    }

    fn profit(&self) -> Decimal {
        self.sales - self.cost
    }

    /// Profit over sales; undefined when nothing was sold for money.
    fn margin(&self) -> Option<Decimal> {
        checked_ratio(self.profit(), self.sales)
    }
}

impl AnalyticsEngine {
    /// Mean line revenue (price x quantity) of the sales in each category.
    pub fn average_order_value_by_category(&self, snapshot: &Snapshot) -> Vec<CategoryOrderValue> {
        let mut by_category: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
        for (sale, product) in snapshot.sales_with_product() {
            let entry = by_category.entry(product.category.as_str()).or_default();
            entry.0 += product.revenue_for(sale.quantity);
            entry.1 += 1;
        }

        let mut rows: Vec<CategoryOrderValue> = by_category
            .into_iter()
            .filter_map(|(category, (total, count))| {
                Some(CategoryOrderValue {
                    category: category.to_string(),
                    order_count: count,
                    average_order_value: round_money(mean(total, count)?),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.average_order_value.cmp(&a.average_order_value));
        rows
    }

    /// The leading products that together make up at most `sales.pareto_share` of all sales.
    ///
    /// Products are ranked by sales amount (ties by product id) and consumed while their
    /// cumulative share of the grand total stays within the threshold.
    pub fn pareto_products(&self, snapshot: &Snapshot) -> Vec<ParetoRow> {
        let mut ranked: Vec<_> = snapshot
            .products()
            .iter()
            .filter_map(|product| {
                let mut sales = snapshot.sales_of_product(product.id).peekable();
                sales.peek()?;
                let amount: Decimal = sales.map(|s| product.revenue_for(s.quantity)).sum();
                Some((product, amount))
            })
            .collect();
        ranked.sort_by(|(pa, a), (pb, b)| b.cmp(a).then_with(|| pa.id.cmp(&pb.id)));

        let amounts: Vec<Decimal> = ranked.iter().map(|(_, amount)| *amount).collect();
        let threshold = self.settings.sales.pareto_share;

        ranked
            .into_iter()
            .zip(cumulative_shares(&amounts))
            .map_while(|((product, amount), point)| {
                let share = point.share.filter(|share| *share <= threshold)?;
                Some((product, amount, point.running_total, share))
            })
            .enumerate()
            .map(|(idx, (product, amount, running, share))| ParetoRow {
                rank: idx + 1,
                product_id: product.id,
                product_name: product.name.clone(),
                sales_amount: round_money(amount),
                cumulative_amount: round_money(running),
                cumulative_share: round_ratio(share),
            })
            .collect()
    }

    /// Sales, cost, profit and margin per category, most profitable first.
    pub fn category_profitability(&self, snapshot: &Snapshot) -> Vec<CategoryProfitability> {
        let mut by_category: BTreeMap<&str, Margins> = BTreeMap::new();
        for (sale, product) in snapshot.sales_with_product() {
            by_category.entry(product.category.as_str()).or_default().add(
                product.revenue_for(sale.quantity),
                product.cost_for(sale.quantity),
                sale.quantity,
            );
        }

        let mut rows: Vec<CategoryProfitability> = by_category
            .into_iter()
            .map(|(category, m)| CategoryProfitability {
                category: category.to_string(),
                sales_amount: round_money(m.sales),
                quantity_sold: m.quantity,
                cost_amount: round_money(m.cost),
                profit: round_money(m.profit()),
                profit_margin: m.margin().map(round_ratio),
            })
            .collect();
        rows.sort_by(|a, b| b.profit.cmp(&a.profit));
        rows
    }

    /// Per-product profitability, highest margin first. Products whose margin is undefined
    /// (zero sales amount) are listed last.
    pub fn product_profit_margins(&self, snapshot: &Snapshot) -> Vec<ProductProfitability> {
        let mut rows: Vec<(Option<Decimal>, ProductProfitability)> = Vec::new();
        for product in snapshot.products() {
            let mut m = Margins::default();
            for sale in snapshot.sales_of_product(product.id) {
                m.add(
                    product.revenue_for(sale.quantity),
                    product.cost_for(sale.quantity),
                    sale.quantity,
                );
            }
            if m.quantity == 0 {
                continue;
            }
            let margin = m.margin();
            rows.push((
                margin,
                ProductProfitability {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    category: product.category.clone(),
                    sales_amount: round_money(m.sales),
                    quantity_sold: m.quantity,
                    cost_amount: round_money(m.cost),
                    profit: round_money(m.profit()),
                    profit_margin: margin.map(round_ratio),
                },
            ));
        }

        rows.sort_by(|(ma, a), (mb, b)| {
            descending_nulls_last(ma, mb).then_with(|| a.product_id.cmp(&b.product_id))
        });
        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Revenue and order count per customer country, highest revenue first.
    pub fn revenue_by_country(&self, snapshot: &Snapshot) -> Vec<CountryRevenueRow> {
        let mut by_country: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
        for (sale, customer, product) in snapshot.joined_sales() {
            let entry = by_country.entry(customer.country.as_str()).or_default();
            entry.0 += product.revenue_for(sale.quantity);
            entry.1 += 1;
        }

        let mut rows: Vec<CountryRevenueRow> = by_country
            .into_iter()
            .map(|(country, (revenue, orders))| CountryRevenueRow {
                country: country.to_string(),
                order_count: orders,
                revenue: round_money(revenue),
            })
            .collect();
        rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        rows
    }

    /// Monthly revenue in calendar order with month-over-month growth.
    ///
    /// Only months that have sales appear; growth compares against the previous listed
    /// month and is `None` for the first one.
    pub fn revenue_by_month(&self, snapshot: &Snapshot) -> Vec<MonthlyRevenueRow> {
        let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
        for (sale, product) in snapshot.sales_with_product() {
            let key = (sale.order_date.year(), sale.order_date.month());
            *by_month.entry(key).or_default() += product.revenue_for(sale.quantity);
        }

        let revenues: Vec<Decimal> = by_month.values().copied().map(round_money).collect();
        let growth = growth_rates(&revenues);

        by_month
            .keys()
            .zip(revenues)
            .zip(growth)
            .map(|((&(year, month), revenue), growth)| MonthlyRevenueRow {
                month: format!("{year:04}-{month:02}"),
                revenue,
                growth_rate_pct: growth.map(round_money),
            })
            .collect()
    }
}

/// Descending order for optional values with `None` sorted after every `Some`.
fn descending_nulls_last(a: &Option<Decimal>, b: &Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
