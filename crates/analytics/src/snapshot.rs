use core_types::{Customer, CustomerId, CoreError, Product, ProductId, Sale};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// An immutable, indexed copy of the three input tables.
///
/// Built once per analysis run. All lookups the reports need (identifier to record,
/// customer to sales, product to sales) are resolved here instead of per report.
/// Sales referencing an unknown customer or product are kept but drop out of any
/// report that needs the missing side, the same way a join would skip them.
#[derive(Debug, Clone)]
pub struct Snapshot {
    customers: Vec<Customer>,
    products: Vec<Product>,
    sales: Vec<Sale>,
    customer_index: HashMap<CustomerId, usize>,
    product_index: HashMap<ProductId, usize>,
    sales_by_customer: HashMap<CustomerId, Vec<usize>>,
    sales_by_product: HashMap<ProductId, Vec<usize>>,
}

impl Snapshot {
    /// Validates and indexes the input records.
    ///
    /// Customers and products are stored in identifier order, sales in
    /// `(order_date, id)` order, so iteration order never depends on input order.
    pub fn new(
        mut customers: Vec<Customer>,
        mut products: Vec<Product>,
        mut sales: Vec<Sale>,
    ) -> Result<Self, CoreError> {
        customers.sort_by_key(|c| c.id);
        products.sort_by_key(|p| p.id);
        sales.sort_by_key(|s| (s.order_date, s.id));

        let mut customer_index = HashMap::with_capacity(customers.len());
        for (idx, customer) in customers.iter().enumerate() {
            if customer_index.insert(customer.id, idx).is_some() {
                return Err(CoreError::DuplicateId {
                    entity: "customer",
                    id: customer.id.0,
                });
            }
        }

        let mut product_index = HashMap::with_capacity(products.len());
        for (idx, product) in products.iter().enumerate() {
            product.validate()?;
            if product_index.insert(product.id, idx).is_some() {
                return Err(CoreError::DuplicateId {
                    entity: "product",
                    id: product.id.0,
                });
            }
        }

        let mut seen_sales = HashSet::with_capacity(sales.len());
        let mut sales_by_customer: HashMap<CustomerId, Vec<usize>> = HashMap::new();
        let mut sales_by_product: HashMap<ProductId, Vec<usize>> = HashMap::new();
        let mut unresolved = 0usize;
        for (idx, sale) in sales.iter().enumerate() {
            sale.validate()?;
            if !seen_sales.insert(sale.id) {
                return Err(CoreError::DuplicateId {
                    entity: "sale",
                    id: sale.id.0,
                });
            }
            if !customer_index.contains_key(&sale.customer_id)
                || !product_index.contains_key(&sale.product_id)
            {
                unresolved += 1;
            }
            sales_by_customer.entry(sale.customer_id).or_default().push(idx);
            sales_by_product.entry(sale.product_id).or_default().push(idx);
        }

        check_money_range(&products, &sales, &product_index)?;

        if unresolved > 0 {
            tracing::warn!(
                unresolved,
                "Sales with unresolved references are skipped by joined reports"
            );
        }
        tracing::info!(
            customers = customers.len(),
            products = products.len(),
            sales = sales.len(),
            "Snapshot indexed"
        );

        Ok(Self {
            customers,
            products,
            sales,
            customer_index,
            product_index,
            sales_by_customer,
            sales_by_product,
        })
    }

    /// All customers, ordered by identifier.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// All products, ordered by identifier.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All sales, ordered by `(order_date, id)`.
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customer_index.get(&id).map(|&idx| &self.customers[idx])
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.product_index.get(&id).map(|&idx| &self.products[idx])
    }

    /// Sales of one customer in chronological order.
    pub fn sales_of_customer(&self, id: CustomerId) -> impl Iterator<Item = &Sale> + '_ {
        self.sales_by_customer
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.sales[idx])
    }

    /// Sales of one product in chronological order.
    pub fn sales_of_product(&self, id: ProductId) -> impl Iterator<Item = &Sale> + '_ {
        self.sales_by_product
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.sales[idx])
    }

    pub fn has_sales(&self, id: CustomerId) -> bool {
        self.sales_by_customer.contains_key(&id)
    }

    /// Sales whose product resolves, paired with that product.
    pub fn sales_with_product(&self) -> impl Iterator<Item = (&Sale, &Product)> + '_ {
        self.sales
            .iter()
            .filter_map(|sale| self.product(sale.product_id).map(|product| (sale, product)))
    }

    /// Sales whose customer resolves, paired with that customer.
    pub fn sales_with_customer(&self) -> impl Iterator<Item = (&Sale, &Customer)> + '_ {
        self.sales
            .iter()
            .filter_map(|sale| self.customer(sale.customer_id).map(|customer| (sale, customer)))
    }

    /// Sales whose customer and product both resolve.
    pub fn joined_sales(&self) -> impl Iterator<Item = (&Sale, &Customer, &Product)> + '_ {
        self.sales.iter().filter_map(|sale| {
            let customer = self.customer(sale.customer_id)?;
            let product = self.product(sale.product_id)?;
            Some((sale, customer, product))
        })
    }

    /// Price times quantity. `None` when the product does not resolve.
    pub fn line_revenue(&self, sale: &Sale) -> Option<Decimal> {
        self.product(sale.product_id)
            .map(|product| product.revenue_for(sale.quantity))
    }

    /// The recorded amount of the sale, falling back to its line revenue.
    pub fn sale_value(&self, sale: &Sale) -> Option<Decimal> {
        sale.amount.or_else(|| self.line_revenue(sale))
    }
}

/// Rejects snapshots whose money values or grand totals do not fit a `Decimal`.
///
/// Every report sums a subset of these non-negative totals, so once they fit no report
/// aggregate can overflow.
fn check_money_range(
    products: &[Product],
    sales: &[Sale],
    product_index: &HashMap<ProductId, usize>,
) -> Result<(), CoreError> {
    fn add(
        total: Decimal,
        value: Option<Decimal>,
        what: impl FnOnce() -> String,
    ) -> Result<Decimal, CoreError> {
        value
            .and_then(|value| total.checked_add(value))
            .ok_or_else(|| CoreError::OutOfRange(what()))
    }

    let mut stock_total = Decimal::ZERO;
    for product in products {
        stock_total = add(stock_total, product.checked_stock_value(), || {
            format!("stock value of product {}", product.id)
        })?;
    }

    let mut revenue_total = Decimal::ZERO;
    let mut cost_total = Decimal::ZERO;
    let mut spend_total = Decimal::ZERO;
    for sale in sales {
        let line = match product_index.get(&sale.product_id) {
            Some(&idx) => {
                let product = &products[idx];
                let revenue = product.checked_revenue_for(sale.quantity);
                revenue_total =
                    add(revenue_total, revenue, || format!("revenue of sale {}", sale.id))?;
                cost_total = add(cost_total, product.checked_cost_for(sale.quantity), || {
                    format!("cost of sale {}", sale.id)
                })?;
                revenue
            }
            None => None,
        };
        if let Some(value) = sale.amount.or(line) {
            spend_total = add(spend_total, Some(value), || format!("value of sale {}", sale.id))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{customer, d, product, sale};
    use core_types::SaleId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rejects_duplicate_customer_ids() {
        let err = Snapshot::new(
            vec![customer(1, "DE", d(2024, 1, 1)), customer(1, "FR", d(2024, 1, 1))],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, CoreError::DuplicateId { entity: "customer", id: 1 });
    }

    #[test]
    fn test_rejects_negative_cost() {
        let mut bad = product(1, "Tools", dec!(10), 5);
        bad.cost = dec!(-1);
        assert!(Snapshot::new(vec![], vec![bad], vec![]).is_err());
    }

    #[test]
    fn test_rejects_stock_value_outside_decimal_range() {
        let mut huge = product(1, "Tools", Decimal::MAX, 2);
        huge.cost = Decimal::ZERO;
        let err = Snapshot::new(vec![], vec![huge], vec![]).unwrap_err();
        assert!(matches!(err, CoreError::OutOfRange(what) if what == "stock value of product 1"));
    }

    #[test]
    fn test_rejects_sale_totals_outside_decimal_range() {
        let err = Snapshot::new(
            vec![customer(1, "DE", d(2024, 1, 1))],
            vec![product(1, "Tools", Decimal::MAX, 1)],
            vec![sale(1, 1, 1, d(2024, 1, 1), 1), sale(2, 1, 1, d(2024, 1, 2), 1)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OutOfRange(what) if what == "revenue of sale 2"));
    }

    #[test]
    fn test_sales_are_indexed_chronologically() {
        let snapshot = Snapshot::new(
            vec![customer(1, "DE", d(2024, 1, 1))],
            vec![product(1, "Tools", dec!(10), 5)],
            vec![
                sale(3, 1, 1, d(2024, 3, 1), 1),
                sale(1, 1, 1, d(2024, 1, 1), 1),
                sale(2, 1, 1, d(2024, 2, 1), 1),
            ],
        )
        .unwrap();

        let ids: Vec<SaleId> = snapshot.sales_of_customer(CustomerId(1)).map(|s| s.id).collect();
        assert_eq!(ids, vec![SaleId(1), SaleId(2), SaleId(3)]);
        assert_eq!(snapshot.sales_of_product(ProductId(1)).count(), 3);
        assert_eq!(snapshot.sales_of_customer(CustomerId(9)).count(), 0);
    }

    #[test]
    fn test_unresolved_references_drop_out_of_joins() {
        let snapshot = Snapshot::new(
            vec![customer(1, "DE", d(2024, 1, 1))],
            vec![product(1, "Tools", dec!(10), 5)],
            vec![
                sale(1, 1, 1, d(2024, 1, 1), 2),
                sale(2, 1, 99, d(2024, 1, 2), 1),
                sale(3, 42, 1, d(2024, 1, 3), 1),
            ],
        )
        .unwrap();

        assert_eq!(snapshot.joined_sales().count(), 1);
        assert_eq!(snapshot.sales_with_product().count(), 2);
        assert_eq!(snapshot.sales_with_customer().count(), 2);
        assert_eq!(snapshot.line_revenue(&snapshot.sales()[0]), Some(dec!(20)));
        assert_eq!(snapshot.line_revenue(&snapshot.sales()[1]), None);
    }

    #[test]
    fn test_sale_value_prefers_recorded_amount() {
        let mut recorded = sale(1, 1, 1, d(2024, 1, 1), 2);
        recorded.amount = Some(dec!(17.5));
        let mut orphan = sale(2, 1, 99, d(2024, 1, 2), 1);
        orphan.amount = Some(dec!(4));
        let snapshot = Snapshot::new(
            vec![customer(1, "DE", d(2024, 1, 1))],
            vec![product(1, "Tools", dec!(10), 5)],
            vec![recorded, orphan],
        )
        .unwrap();

        assert_eq!(snapshot.sale_value(&snapshot.sales()[0]), Some(dec!(17.5)));
        assert_eq!(snapshot.sale_value(&snapshot.sales()[1]), Some(dec!(4)));
    }
}
