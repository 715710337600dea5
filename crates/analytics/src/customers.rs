use crate::engine::{customer_spend, ranked_spenders, AnalyticsEngine};
use crate::money::{mean, percentage, round_money};
use crate::report::{
    AcquisitionRow, AgeGroup, AgeGroupRow, AverageSaleRow, ChurnReport, DemographicFrequencyRow,
    InactiveCustomerRow, LapsedCountryRow, MaritalStatusSpendRow, PurchaseIntervalRow,
    RecencyRow, RecencySegment, RecencySegmentCount, RepeatPurchaserRow, SpenderRankRow,
    SpendingSegment, SpendingSegmentRow, SpendingSegmentSummary,
};
use crate::snapshot::Snapshot;
use crate::window::{day_gaps, ntile};
use chrono::{Days, Months, NaiveDate};
use configuration::{AgeBands, ChurnRule, CohortWindow, RecencyBands, SpendingThresholds};
use core_types::{CustomerId, Gender, MaritalStatus, ProductId};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

const DECILES: usize = 10;
const QUARTILES: usize = 4;

impl AnalyticsEngine {
    /// Customers without a single sale, in customer-id order.
    pub fn inactive_customers(&self, snapshot: &Snapshot) -> Vec<InactiveCustomerRow> {
        snapshot
            .customers()
            .iter()
            .filter(|customer| !snapshot.has_sales(customer.id))
            .map(|customer| InactiveCustomerRow {
                customer_id: customer.id,
                full_name: customer.full_name(),
                email: customer.email.clone(),
                country: customer.country.clone(),
                join_date: customer.join_date,
            })
            .collect()
    }

    /// Customers who bought more than one product repeatedly.
    ///
    /// A product counts as repeated for a customer when it appears in at least two of
    /// that customer's sales. Only customers with two or more such products are listed.
    /// Sales of products missing from the snapshot are ignored.
    pub fn repeat_purchasers(&self, snapshot: &Snapshot) -> Vec<RepeatPurchaserRow> {
        let mut rows: Vec<RepeatPurchaserRow> = customer_spend(snapshot)
            .into_iter()
            .filter_map(|spend| {
                let mut per_product: BTreeMap<ProductId, usize> = BTreeMap::new();
                for sale in snapshot
                    .sales_of_customer(spend.customer.id)
                    .filter(|sale| snapshot.product(sale.product_id).is_some())
                {
                    *per_product.entry(sale.product_id).or_default() += 1;
                }
                let repeated = per_product.values().filter(|&&count| count >= 2).count();
                (repeated > 1).then(|| RepeatPurchaserRow {
                    customer_id: spend.customer.id,
                    full_name: spend.customer.full_name(),
                    repeated_products: repeated,
                    total_spend: round_money(spend.total),
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.repeated_products
                .cmp(&a.repeated_products)
                .then_with(|| b.total_spend.cmp(&a.total_spend))
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });
        rows
    }

    /// Ranks buying customers by total spend and splits them into `buckets` NTILE groups.
    pub fn spender_ntile(&self, snapshot: &Snapshot, buckets: usize) -> Vec<SpenderRankRow> {
        let ranked = ranked_spenders(snapshot);
        let assignment = ntile(ranked.len(), buckets);
        ranked
            .into_iter()
            .zip(assignment)
            .map(|(spend, bucket)| SpenderRankRow {
                customer_id: spend.customer.id,
                full_name: spend.customer.full_name(),
                total_spend: round_money(spend.total),
                bucket,
            })
            .collect()
    }

    /// The first spend decile: the top tenth of buying customers.
    pub fn top_decile_spenders(&self, snapshot: &Snapshot) -> Vec<SpenderRankRow> {
        self.spender_ntile(snapshot, DECILES)
            .into_iter()
            .filter(|row| row.bucket == 1)
            .collect()
    }

    /// Average number of days between consecutive purchases, for customers with at least
    /// two purchases.
    pub fn average_purchase_interval(&self, snapshot: &Snapshot) -> Vec<PurchaseIntervalRow> {
        snapshot
            .customers()
            .iter()
            .filter_map(|customer| {
                let dates: Vec<NaiveDate> = snapshot
                    .sales_of_customer(customer.id)
                    .map(|sale| sale.order_date)
                    .collect();
                let gaps = day_gaps(&dates);
                let total: i64 = gaps.iter().sum();
                let average = mean(Decimal::from(total), gaps.len())?;
                Some(PurchaseIntervalRow {
                    customer_id: customer.id,
                    purchase_count: dates.len(),
                    average_interval_days: round_money(average),
                })
            })
            .collect()
    }

    /// Mean monetary amount per sale for each buying customer, highest first.
    pub fn average_sale_amount_per_customer(&self, snapshot: &Snapshot) -> Vec<AverageSaleRow> {
        let mut rows: Vec<(Decimal, AverageSaleRow)> = snapshot
            .customers()
            .iter()
            .filter_map(|customer| {
                let values: Vec<Decimal> = snapshot
                    .sales_of_customer(customer.id)
                    .filter_map(|sale| snapshot.sale_value(sale))
                    .collect();
                let average = mean(values.iter().sum(), values.len())?;
                Some((
                    average,
                    AverageSaleRow {
                        customer_id: customer.id,
                        full_name: customer.full_name(),
                        order_count: values.len(),
                        average_sale_amount: round_money(average),
                    },
                ))
            })
            .collect();

        rows.sort_by(|(va, a), (vb, b)| {
            vb.cmp(va)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });
        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Countries with at least one lapsed customer as of `as_of`.
    ///
    /// A customer is lapsed when they never bought anything or their most recent purchase
    /// is older than `customers.lapse_after_days` days.
    pub fn lapsed_countries(
        &self,
        snapshot: &Snapshot,
        as_of: NaiveDate,
    ) -> Vec<LapsedCountryRow> {
        let cutoff = days_before(as_of, self.settings.customers.lapse_after_days);

        let mut by_country: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for customer in snapshot.customers() {
            let last = last_purchase(snapshot, customer.id);
            let lapsed = last.is_none_or(|date| date < cutoff);
            let entry = by_country.entry(customer.country.as_str()).or_default();
            entry.0 += usize::from(lapsed);
            entry.1 += 1;
        }

        by_country
            .into_iter()
            .filter(|(_, (lapsed, _))| *lapsed > 0)
            .map(|(country, (lapsed, total))| LapsedCountryRow {
                country: country.to_string(),
                lapsed_customers: lapsed,
                total_customers: total,
            })
            .collect()
    }

    /// Share of all customers that each country accounts for, in percent.
    pub fn acquisition_rate_by_country(&self, snapshot: &Snapshot) -> Vec<AcquisitionRow> {
        let total = Decimal::from(snapshot.customers().len());
        let mut by_country: BTreeMap<&str, usize> = BTreeMap::new();
        for customer in snapshot.customers() {
            *by_country.entry(customer.country.as_str()).or_default() += 1;
        }

        let mut rows: Vec<AcquisitionRow> = by_country
            .into_iter()
            .filter_map(|(country, customers)| {
                Some(AcquisitionRow {
                    country: country.to_string(),
                    customers,
                    acquisition_rate_pct: percentage(Decimal::from(customers), total)?,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.customers.cmp(&a.customers));
        rows
    }

    /// High / Medium / Low spend segment of every customer, highest spend first.
    /// Customers without purchases have zero spend.
    pub fn spending_segments(&self, snapshot: &Snapshot) -> Vec<SpendingSegmentRow> {
        let thresholds = &self.settings.customers.spending;
        let mut spends = customer_spend(snapshot);
        spends.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.customer.id.cmp(&b.customer.id))
        });

        spends
            .into_iter()
            .map(|spend| SpendingSegmentRow {
                customer_id: spend.customer.id,
                full_name: spend.customer.full_name(),
                total_spend: round_money(spend.total),
                segment: classify_spend(spend.total, thresholds),
            })
            .collect()
    }

    /// Customer count and average spend per non-empty spend segment.
    pub fn spending_segment_summary(&self, snapshot: &Snapshot) -> Vec<SpendingSegmentSummary> {
        let thresholds = &self.settings.customers.spending;
        let mut by_segment: BTreeMap<SpendingSegment, (Decimal, usize)> = BTreeMap::new();
        for spend in customer_spend(snapshot) {
            let entry = by_segment
                .entry(classify_spend(spend.total, thresholds))
                .or_default();
            entry.0 += spend.total;
            entry.1 += 1;
        }

        by_segment
            .into_iter()
            .filter_map(|(segment, (total, customers))| {
                Some(SpendingSegmentSummary {
                    segment,
                    customers,
                    average_spend: round_money(mean(total, customers)?),
                })
            })
            .collect()
    }

    /// Marital-status mix of the top spend quartile, largest group first.
    pub fn top_quartile_marital_status(&self, snapshot: &Snapshot) -> Vec<MaritalStatusSpendRow> {
        let ranked = ranked_spenders(snapshot);
        let assignment = ntile(ranked.len(), QUARTILES);

        let mut by_status: BTreeMap<MaritalStatus, (Decimal, usize)> = BTreeMap::new();
        for (spend, _) in ranked
            .iter()
            .zip(assignment)
            .filter(|(_, quartile)| *quartile == 1)
        {
            let entry = by_status.entry(spend.customer.marital_status).or_default();
            entry.0 += spend.total;
            entry.1 += 1;
        }

        let mut rows: Vec<MaritalStatusSpendRow> = by_status
            .into_iter()
            .filter_map(|(marital_status, (total, customers))| {
                Some(MaritalStatusSpendRow {
                    marital_status,
                    customers,
                    average_spend: round_money(mean(total, customers)?),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.customers.cmp(&a.customers));
        rows
    }

    /// Most frequent (gender, marital status, category) combinations by order count,
    /// limited to `sales.demographic_limit`.
    pub fn demographic_order_frequency(&self, snapshot: &Snapshot) -> Vec<DemographicFrequencyRow> {
        let mut groups: BTreeMap<(Gender, MaritalStatus, &str), (usize, HashSet<CustomerId>)> =
            BTreeMap::new();
        for (sale, customer, product) in snapshot.joined_sales() {
            let key = (customer.gender, customer.marital_status, product.category.as_str());
            let entry = groups.entry(key).or_default();
            entry.0 += 1;
            entry.1.insert(sale.customer_id);
        }

        let mut rows: Vec<DemographicFrequencyRow> = groups
            .into_iter()
            .map(|((gender, marital_status, category), (orders, customers))| {
                DemographicFrequencyRow {
                    gender,
                    marital_status,
                    category: category.to_string(),
                    order_count: orders,
                    distinct_customers: customers.len(),
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            b.order_count
                .cmp(&a.order_count)
                .then_with(|| b.distinct_customers.cmp(&a.distinct_customers))
        });
        rows.truncate(self.settings.sales.demographic_limit);
        rows
    }

    /// Purchase count and mean purchase value per (age group, category), ages taken on `as_of`.
    pub fn age_group_behavior(&self, snapshot: &Snapshot, as_of: NaiveDate) -> Vec<AgeGroupRow> {
        let bands = &self.settings.customers.age;
        let mut groups: BTreeMap<(AgeGroup, &str), (Decimal, usize)> = BTreeMap::new();
        for (sale, customer, product) in snapshot.joined_sales() {
            let group = classify_age(customer.age_on(as_of), bands);
            let entry = groups.entry((group, product.category.as_str())).or_default();
            entry.0 += product.revenue_for(sale.quantity);
            entry.1 += 1;
        }

        groups
            .into_iter()
            .filter_map(|((age_group, category), (total, purchases))| {
                Some(AgeGroupRow {
                    age_group,
                    category: category.to_string(),
                    purchase_count: purchases,
                    average_purchase_value: round_money(mean(total, purchases)?),
                })
            })
            .collect()
    }

    /// Churn among customers who joined inside `window`, judged with `cohort.churn`.
    pub fn churn_rate(
        &self,
        snapshot: &Snapshot,
        window: &CohortWindow,
        as_of: NaiveDate,
    ) -> ChurnReport {
        let rule = self.settings.cohort.churn;
        let mut cohort_size = 0;
        let mut churned = 0;

        for customer in snapshot
            .customers()
            .iter()
            .filter(|customer| window.contains(customer.join_date))
        {
            cohort_size += 1;
            let dates: Vec<NaiveDate> = snapshot
                .sales_of_customer(customer.id)
                .map(|sale| sale.order_date)
                .collect();
            if is_churned(&dates, rule, as_of) {
                churned += 1;
            }
        }

        tracing::debug!(cohort_size, churned, ?rule, "Churn computed");
        ChurnReport {
            cohort_start: window.start,
            cohort_end: window.end,
            cohort_size,
            churned,
            churn_rate_pct: percentage(Decimal::from(churned), Decimal::from(cohort_size)),
        }
    }

    /// Recency segment of every customer as of `as_of`, in customer-id order.
    pub fn recency_segments(&self, snapshot: &Snapshot, as_of: NaiveDate) -> Vec<RecencyRow> {
        let bands = &self.settings.customers.recency;
        snapshot
            .customers()
            .iter()
            .map(|customer| {
                let last = last_purchase(snapshot, customer.id);
                let days = last.map(|date| (as_of - date).num_days());
                RecencyRow {
                    customer_id: customer.id,
                    full_name: customer.full_name(),
                    last_purchase: last,
                    days_since_last_purchase: days,
                    segment: classify_recency(days, bands),
                }
            })
            .collect()
    }

    /// Customers per recency segment. All four segments are listed.
    pub fn recency_segment_summary(
        &self,
        snapshot: &Snapshot,
        as_of: NaiveDate,
    ) -> Vec<RecencySegmentCount> {
        let mut counts: BTreeMap<RecencySegment, usize> = [
            RecencySegment::Active,
            RecencySegment::Recent,
            RecencySegment::Lapsed,
            RecencySegment::Inactive,
        ]
        .into_iter()
        .map(|segment| (segment, 0))
        .collect();

        for row in self.recency_segments(snapshot, as_of) {
            *counts.entry(row.segment).or_default() += 1;
        }

        counts
            .into_iter()
            .map(|(segment, customers)| RecencySegmentCount { segment, customers })
            .collect()
    }
}

fn last_purchase(snapshot: &Snapshot, id: CustomerId) -> Option<NaiveDate> {
    snapshot.sales_of_customer(id).last().map(|sale| sale.order_date)
}

fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_sub_days(Days::new(days.unsigned_abs()))
        .unwrap_or(NaiveDate::MIN)
}

fn classify_spend(total: Decimal, thresholds: &SpendingThresholds) -> SpendingSegment {
    if total >= thresholds.high_min {
        SpendingSegment::High
    } else if total >= thresholds.medium_min {
        SpendingSegment::Medium
    } else {
        SpendingSegment::Low
    }
}

fn classify_age(age: u32, bands: &AgeBands) -> AgeGroup {
    if age < bands.young_below {
        AgeGroup::Young
    } else if age <= bands.senior_above {
        AgeGroup::Middle
    } else {
        AgeGroup::Senior
    }
}

/// No purchase at all is the oldest possible recency.
fn classify_recency(days_since: Option<i64>, bands: &RecencyBands) -> RecencySegment {
    match days_since {
        Some(days) if days <= bands.active_max_days => RecencySegment::Active,
        Some(days) if days <= bands.recent_max_days => RecencySegment::Recent,
        Some(days) if days <= bands.lapsed_max_days => RecencySegment::Lapsed,
        _ => RecencySegment::Inactive,
    }
}

/// `dates` must be chronological.
fn is_churned(dates: &[NaiveDate], rule: ChurnRule, as_of: NaiveDate) -> bool {
    match rule {
        ChurnRule::NoRepeatAfterFirstPurchase { grace_months } => {
            let Some(&first) = dates.first() else {
                return true;
            };
            match first.checked_add_months(Months::new(grace_months)) {
                Some(deadline) => !dates.iter().any(|&date| date > deadline),
                None => true,
            }
        }
        ChurnRule::InactiveSince { days } => {
            let since = days_before(as_of, days);
            !dates.iter().any(|&date| date >= since)
        }
    }
}
