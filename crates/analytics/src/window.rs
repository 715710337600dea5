//! Sorted-sequence equivalents of the SQL window functions used by the reports
//! (`NTILE`, running `SUM() OVER`, `LAG`).
//!
//! Callers sort their rows first, including a deterministic tie-breaker, and then
//! feed the ordered values through these helpers in a single pass.

use crate::money::checked_ratio;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Bucket number (1-based) for each of `len` ordered rows, with `NTILE(buckets)` sizing:
/// bucket sizes differ by at most one and the larger buckets come first.
pub fn ntile(len: usize, buckets: usize) -> Vec<usize> {
    let buckets = buckets.max(1);
    let base = len / buckets;
    let remainder = len % buckets;

    let mut assignment = Vec::with_capacity(len);
    for bucket in 1..=buckets {
        let size = base + usize::from(bucket <= remainder);
        assignment.extend(std::iter::repeat_n(bucket, size));
    }
    assignment
}

/// A point of a running total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cumulative {
    pub running_total: Decimal,
    /// Running total divided by the grand total; `None` when the grand total is zero.
    pub share: Option<Decimal>,
}

/// Running totals and running shares of the grand total, in input order.
pub fn cumulative_shares(values: &[Decimal]) -> Vec<Cumulative> {
    let total: Decimal = values.iter().sum();
    let mut running_total = Decimal::ZERO;
    values
        .iter()
        .map(|value| {
            running_total += *value;
            Cumulative {
                running_total,
                share: checked_ratio(running_total, total),
            }
        })
        .collect()
}

/// Period-over-period growth in percent: `(current - previous) / previous * 100`.
///
/// The first element has no predecessor and yields `None`, as does any period whose
/// predecessor is zero or whose rate leaves the decimal range.
pub fn growth_rates(values: &[Decimal]) -> Vec<Option<Decimal>> {
    let mut rates = Vec::with_capacity(values.len());
    let mut previous: Option<Decimal> = None;
    for current in values {
        let rate = previous.and_then(|prev| {
            checked_ratio(*current - prev, prev).and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        });
        rates.push(rate);
        previous = Some(*current);
    }
    rates
}

/// Day gaps between consecutive dates of an already chronological sequence.
pub fn day_gaps(dates: &[NaiveDate]) -> Vec<i64> {
    dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect()
}
