//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Amounts are integer minor units; rates are `Decimal`
//! - Use banker's rounding (round half to even)
//! - Store both original and converted amounts

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Converts a minor-unit amount into the reporting currency using the
/// given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative
/// errors, and saturates on the (absurd) overflow edge rather than wrap.
#[must_use]
pub fn convert_minor(amount: i64, rate: Decimal) -> i64 {
    let converted = Decimal::from(amount) * rate;
    converted
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// The date an exchange rate should be looked up for: the first working
/// day strictly before `date`.
///
/// Daily FX feeds publish closing rates per working day; weekend dates
/// fall back to Friday.
#[must_use]
pub fn rate_lookup_date(date: NaiveDate) -> NaiveDate {
    let mut day = date - Days::new(1);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day = day - Days::new(1);
    }
    day
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_at_par() {
        assert_eq!(convert_minor(5000, dec!(1)), 5000);
    }

    #[test]
    fn test_convert_with_rate() {
        // 2000 fen * 0.11 = 220 pence
        assert_eq!(convert_minor(2000, dec!(0.11)), 220);
    }

    #[test]
    fn test_convert_negative_amount() {
        // Reversal deltas convert the same magnitude.
        assert_eq!(convert_minor(-2000, dec!(0.11)), -220);
    }

    #[test]
    fn test_bankers_rounding() {
        // Round half to even: 2.5 -> 2, 3.5 -> 4.
        assert_eq!(convert_minor(25, dec!(0.1)), 2);
        assert_eq!(convert_minor(35, dec!(0.1)), 4);
    }

    #[test]
    fn test_rate_lookup_date_weekday() {
        // Thursday 2023-09-21 -> Wednesday 2023-09-20.
        let thursday = NaiveDate::from_ymd_opt(2023, 9, 21).unwrap();
        assert_eq!(
            rate_lookup_date(thursday),
            NaiveDate::from_ymd_opt(2023, 9, 20).unwrap()
        );
    }

    #[test]
    fn test_rate_lookup_date_skips_weekend() {
        // Monday 2023-09-25 -> Friday 2023-09-22.
        let monday = NaiveDate::from_ymd_opt(2023, 9, 25).unwrap();
        assert_eq!(
            rate_lookup_date(monday),
            NaiveDate::from_ymd_opt(2023, 9, 22).unwrap()
        );
        // Sunday 2023-09-24 -> Friday as well.
        let sunday = NaiveDate::from_ymd_opt(2023, 9, 24).unwrap();
        assert_eq!(
            rate_lookup_date(sunday),
            NaiveDate::from_ymd_opt(2023, 9, 22).unwrap()
        );
    }
}
