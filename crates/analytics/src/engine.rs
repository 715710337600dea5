use crate::error::AnalyticsError;
use crate::snapshot::Snapshot;
use configuration::Settings;
use core_types::Customer;
use rust_decimal::Decimal;

/// A stateless calculator for the retail reports.
///
/// The engine only holds its validated `Settings`; every report is a pure function of
/// the `Snapshot` it is handed (and of an explicit `as_of` date for the time-dependent
/// ones), so the same engine can serve any number of snapshots concurrently.
///
/// The report methods are spread over the `inventory`, `sales` and `customers` modules.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    pub(crate) settings: Settings,
}

impl AnalyticsEngine {
    /// Creates an engine after validating the settings.
    pub fn new(settings: Settings) -> Result<Self, AnalyticsError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Total spend of one customer over the snapshot.
#[derive(Debug, Clone)]
pub(crate) struct CustomerSpend<'a> {
    pub customer: &'a Customer,
    pub total: Decimal,
    pub orders: usize,
}

/// Spend of every customer, in customer-id order. Customers without sales get a zero total.
///
/// A sale without a recorded amount whose product does not resolve has no value and is
/// not counted as an order.
pub(crate) fn customer_spend(snapshot: &Snapshot) -> Vec<CustomerSpend<'_>> {
    snapshot
        .customers()
        .iter()
        .map(|customer| {
            let mut total = Decimal::ZERO;
            let mut orders = 0;
            for value in snapshot
                .sales_of_customer(customer.id)
                .filter_map(|sale| snapshot.sale_value(sale))
            {
                orders += 1;
                total += value;
            }
            CustomerSpend {
                customer,
                total,
                orders,
            }
        })
        .collect()
}

/// Customers with at least one sale, highest spend first, customer id breaking ties.
pub(crate) fn ranked_spenders(snapshot: &Snapshot) -> Vec<CustomerSpend<'_>> {
    let mut spenders: Vec<_> = customer_spend(snapshot)
        .into_iter()
        .filter(|spend| spend.orders > 0)
        .collect();
    spenders.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.customer.id.cmp(&b.customer.id))
    });
    spenders
}
