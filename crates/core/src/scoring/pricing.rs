use crate::domain::attraction::Attraction;
use crate::domain::recommendation::{PricingInfo, ScoreBreakdown};
use crate::time::calendar;
use chrono::NaiveDate;

// Named pricing policies. No real discount feed exists, so the quote is a
// synthetic function of weekday and crowd load only.
const WEEKEND_PREMIUM_MULTIPLIER: f64 = 1.2;
const WEEKDAY_DISCOUNT_MULTIPLIER: f64 = 0.9;
const DISCOUNT_CROWD_THRESHOLD_PCT: u8 = 40;

pub(crate) const WEEKDAY_DISCOUNT_POINTS: u8 = ScoreBreakdown::PRICE_MAX;
pub(crate) const STANDARD_POINTS: u8 = 10;
pub(crate) const WEEKEND_PREMIUM_POINTS: u8 = 5;

/// Quote the synthetic dynamic price for a date and return the price score
/// component alongside it.
pub(crate) fn quote(
    attraction: &Attraction,
    date: NaiveDate,
    capacity_percentage: u8,
) -> (PricingInfo, u8) {
    if calendar::is_weekend(date) {
        return (
            PricingInfo {
                dynamic_price: apply(attraction.base_price, WEEKEND_PREMIUM_MULTIPLIER),
                reason: "Weekend premium".to_string(),
            },
            WEEKEND_PREMIUM_POINTS,
        );
    }

    if capacity_percentage < DISCOUNT_CROWD_THRESHOLD_PCT {
        return (
            PricingInfo {
                dynamic_price: apply(attraction.base_price, WEEKDAY_DISCOUNT_MULTIPLIER),
                reason: "Weekday discount".to_string(),
            },
            WEEKDAY_DISCOUNT_POINTS,
        );
    }

    (
        PricingInfo {
            dynamic_price: attraction.base_price,
            reason: "Standard pricing".to_string(),
        },
        STANDARD_POINTS,
    )
}

fn apply(base_price: i64, multiplier: f64) -> i64 {
    (base_price as f64 * multiplier).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attraction::builtin_catalog;

    fn dufan() -> Attraction {
        builtin_catalog().remove(0)
    }

    #[test]
    fn weekday_low_crowd_gets_the_discount() {
        // 2026-01-20 is a Tuesday.
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let (pricing, points) = quote(&dufan(), date, 30);
        assert_eq!(pricing.dynamic_price, 180_000);
        assert_eq!(pricing.reason, "Weekday discount");
        assert_eq!(points, WEEKDAY_DISCOUNT_POINTS);
    }

    #[test]
    fn busy_weekday_stays_at_standard_pricing() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let (pricing, points) = quote(&dufan(), date, 55);
        assert_eq!(pricing.dynamic_price, 200_000);
        assert_eq!(pricing.reason, "Standard pricing");
        assert_eq!(points, STANDARD_POINTS);
    }

    #[test]
    fn weekend_carries_the_premium_regardless_of_crowd() {
        // 2026-01-24 is a Saturday.
        let date = NaiveDate::from_ymd_opt(2026, 1, 24).unwrap();
        let (pricing, points) = quote(&dufan(), date, 10);
        assert_eq!(pricing.dynamic_price, 240_000);
        assert_eq!(pricing.reason, "Weekend premium");
        assert_eq!(points, WEEKEND_PREMIUM_POINTS);
    }
}
