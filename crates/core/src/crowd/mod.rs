mod holidays;

use crate::domain::attraction::Attraction;
use crate::domain::forecast::{CrowdDay, CrowdLevel};
use crate::error::RecommendError;
use crate::time::calendar;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;

const BASELINE_LOAD: f64 = 0.5;
const WEEKEND_MULTIPLIER: f64 = 1.5;
const FRIDAY_MULTIPLIER: f64 = 1.3;
const MONDAY_MULTIPLIER: f64 = 0.85;
const HOLIDAY_MULTIPLIER: f64 = 1.8;
const SCHOOL_HOLIDAY_MULTIPLIER: f64 = 1.4;

// Multiplicative jitter drawn uniformly from [0.85, 1.15].
const JITTER_MIN: f64 = 0.85;
const JITTER_SPAN: f64 = 0.30;

/// Predict daily crowd load for `days` consecutive dates starting at
/// `start`. Deterministic apart from the jitter term, which is drawn from
/// the injected `rng`; seed it per (attraction, start date) for stable
/// production output.
///
/// `days` of zero yields an empty series.
pub fn generate_crowd_predictions<R: Rng + ?Sized>(
    attraction: &Attraction,
    days: u32,
    start: NaiveDate,
    rng: &mut R,
) -> anyhow::Result<Vec<CrowdDay>> {
    if attraction.capacity == 0 {
        return Err(RecommendError::InvalidArgument(format!(
            "attraction {} has zero capacity",
            attraction.id
        ))
        .into());
    }

    Ok(calendar::date_range(start, days)
        .into_iter()
        .map(|date| {
            let jitter = JITTER_MIN + rng.gen::<f64>() * JITTER_SPAN;
            predict_day(attraction.capacity, date, jitter)
        })
        .collect())
}

/// Single-day prediction with an explicit jitter factor. The weekday,
/// holiday and school-holiday multipliers stack in that order on top of
/// the half-capacity baseline.
pub(crate) fn predict_day(capacity: u32, date: NaiveDate, jitter: f64) -> CrowdDay {
    let mut expected = f64::from(capacity) * BASELINE_LOAD;
    let mut factors = Vec::new();

    match date.weekday() {
        Weekday::Sat | Weekday::Sun => {
            expected *= WEEKEND_MULTIPLIER;
            factors.push("Weekend peak".to_string());
        }
        Weekday::Fri => {
            expected *= FRIDAY_MULTIPLIER;
            factors.push("Friday pre-weekend demand".to_string());
        }
        Weekday::Mon => {
            expected *= MONDAY_MULTIPLIER;
            factors.push("Quiet Monday start".to_string());
        }
        _ => {
            factors.push("Typical weekday traffic".to_string());
        }
    }

    if let Some(name) = holidays::public_holiday(date) {
        expected *= HOLIDAY_MULTIPLIER;
        factors.push(format!("Public holiday: {name}"));
    }

    if holidays::is_school_holiday(date) {
        expected *= SCHOOL_HOLIDAY_MULTIPLIER;
        factors.push("School holiday season".to_string());
    }

    let expected_visitors = (expected * jitter).round() as u32;
    let capacity_percentage = capacity_percentage(expected_visitors, capacity);

    CrowdDay {
        date,
        level: CrowdLevel::from_capacity_percentage(capacity_percentage),
        expected_visitors,
        capacity_percentage,
        factors,
    }
}

fn capacity_percentage(visitors: u32, capacity: u32) -> u8 {
    let pct = (f64::from(visitors) / f64::from(capacity) * 100.0).round();
    pct.min(100.0) as u8
}
