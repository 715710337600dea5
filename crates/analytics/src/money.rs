//! Rounding and safe-division helpers shared by every report.
//!
//! Rounding follows SQL `ROUND`: midpoints go away from zero, not to even.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for monetary values and percentages.
pub const MONEY_DP: u32 = 2;
/// Decimal places kept for shares and margins expressed as fractions.
pub const RATIO_DP: u32 = 4;

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATIO_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to a whole number, midpoints away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn checked_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}

/// Arithmetic mean of `count` values summing to `total`.
pub fn mean(total: Decimal, count: usize) -> Option<Decimal> {
    checked_ratio(total, Decimal::from(count))
}

/// `part / whole * 100`, rounded to two places. `None` when undefined or out of range.
pub fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    checked_ratio(part, whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_money)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_uses_half_away_from_zero() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));
        assert_eq!(round_money(dec!(2.335)), dec!(2.34));
        assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn test_checked_ratio_guards_zero() {
        assert_eq!(checked_ratio(dec!(1), Decimal::ZERO), None);
        assert_eq!(checked_ratio(dec!(3), dec!(4)), Some(dec!(0.75)));
        assert_eq!(mean(dec!(10), 0), None);
    }

    #[test]
    fn test_percentage_of_total() {
        assert_eq!(percentage(dec!(3), dec!(10)), Some(dec!(30.00)));
        assert_eq!(percentage(dec!(1), dec!(3)), Some(dec!(33.33)));
    }
}
