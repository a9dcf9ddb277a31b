mod insights;
pub(crate) mod pricing;

use crate::domain::attraction::Attraction;
use crate::domain::forecast::{CrowdDay, CrowdLevel, WeatherCondition, WeatherDay};
use crate::domain::recommendation::{
    Preferences, PricingInfo, RecommendationSet, RecommendedDate, ScoreBreakdown,
};
use crate::error::RecommendError;
use crate::time::calendar;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

// Weather component: 25 temperature points, 10 precipitation points and a
// 5 point condition bonus add up to the 40 point maximum.
const IDEAL_TEMP_MIN: f64 = 26.0;
const IDEAL_TEMP_MAX: f64 = 30.0;
const TEMP_MAX_POINTS: u8 = 25;
const TEMP_PENALTY_PER_DEGREE: f64 = 3.0;

const BEST_WEATHER_BADGE_THRESHOLD: u8 = 35;
const GOOD_CROWD_BADGE_THRESHOLD: u8 = 25;
const EVENT_BADGE_THRESHOLD: u8 = 8;

/// Extension point for a future event feed. Scores are clamped to the
/// events component maximum; without a feed the component stays zero.
pub trait EventSignal: Send + Sync {
    fn score(&self, date: NaiveDate) -> u8;
}

/// Deterministic date scorer. Stateless apart from the optional event
/// signal, so a single instance can serve every request.
#[derive(Clone, Default)]
pub struct DateScorer {
    events: Option<Arc<dyn EventSignal>>,
}

impl DateScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Arc<dyn EventSignal>) -> Self {
        Self {
            events: Some(events),
        }
    }

    /// Score every forecast day and return the ranked recommendation set.
    ///
    /// The weather and crowd series must cover exactly the same dates;
    /// an unmatched date is a `DataMismatch`, never silently dropped.
    pub fn score_dates(
        &self,
        attraction: &Attraction,
        weather_days: &[WeatherDay],
        crowd_days: &[CrowdDay],
        _preferences: &Preferences,
    ) -> anyhow::Result<RecommendationSet> {
        if attraction.capacity == 0 {
            return Err(RecommendError::InvalidArgument(format!(
                "attraction {} has zero capacity",
                attraction.id
            ))
            .into());
        }
        if weather_days.is_empty() {
            return Err(RecommendError::InvalidArgument(
                "weather series is empty".to_string(),
            )
            .into());
        }

        let crowd_by_date = index_crowd_days(crowd_days)?;
        if weather_days.len() != crowd_days.len() {
            return Err(RecommendError::DataMismatch(format!(
                "weather covers {} days but crowd covers {}",
                weather_days.len(),
                crowd_days.len()
            ))
            .into());
        }

        let mut dates = Vec::with_capacity(weather_days.len());
        let mut seen_weather_dates = std::collections::BTreeSet::new();
        for weather in weather_days {
            if !seen_weather_dates.insert(weather.date) {
                return Err(RecommendError::DataMismatch(format!(
                    "duplicate weather forecast for {}",
                    weather.date
                ))
                .into());
            }
            let Some(crowd) = crowd_by_date.get(&weather.date) else {
                return Err(RecommendError::DataMismatch(format!(
                    "no crowd forecast for {}",
                    weather.date
                ))
                .into());
            };
            dates.push(self.score_date(attraction, weather, crowd));
        }

        let mut set = RecommendationSet {
            recommended_dates: dates,
            insights: Vec::new(),
        };
        set.sort_ranked();
        set.insights = insights::derive_insights(&set.recommended_dates);
        Ok(set)
    }

    fn score_date(
        &self,
        attraction: &Attraction,
        weather: &WeatherDay,
        crowd: &CrowdDay,
    ) -> RecommendedDate {
        let weather_pts = weather_score(weather);
        let crowd_pts = crowd_score(crowd.capacity_percentage);
        let (pricing, price_pts) = pricing::quote(attraction, weather.date, crowd.capacity_percentage);
        let event_pts = self
            .events
            .as_ref()
            .map(|signal| signal.score(weather.date).min(ScoreBreakdown::EVENTS_MAX))
            .unwrap_or(0);

        let score_breakdown = ScoreBreakdown {
            weather: weather_pts,
            crowd: crowd_pts,
            price: price_pts,
            events: event_pts,
        };

        RecommendedDate {
            date: weather.date,
            day_of_week: calendar::day_of_week_label(weather.date),
            score: score_breakdown.total(),
            score_breakdown,
            weather: weather.clone(),
            crowd: crowd.clone(),
            reasons: reasons(weather, crowd, &pricing, &score_breakdown),
            badges: badges(&score_breakdown),
            pricing,
        }
    }
}

fn index_crowd_days(crowd_days: &[CrowdDay]) -> anyhow::Result<BTreeMap<NaiveDate, &CrowdDay>> {
    let mut by_date = BTreeMap::new();
    for crowd in crowd_days {
        if by_date.insert(crowd.date, crowd).is_some() {
            return Err(RecommendError::DataMismatch(format!(
                "duplicate crowd forecast for {}",
                crowd.date
            ))
            .into());
        }
    }
    Ok(by_date)
}

/// Weather component, bounded by `ScoreBreakdown::WEATHER_MAX`.
pub(crate) fn weather_score(day: &WeatherDay) -> u8 {
    temperature_points(day.temperature)
        + precipitation_points(day.precipitation)
        + condition_bonus(day.condition)
}

fn temperature_points(temperature: f64) -> u8 {
    let deviation = if temperature < IDEAL_TEMP_MIN {
        IDEAL_TEMP_MIN - temperature
    } else if temperature > IDEAL_TEMP_MAX {
        temperature - IDEAL_TEMP_MAX
    } else {
        0.0
    };
    (f64::from(TEMP_MAX_POINTS) - TEMP_PENALTY_PER_DEGREE * deviation)
        .max(0.0)
        .round() as u8
}

fn precipitation_points(precipitation: u8) -> u8 {
    match precipitation {
        0..=19 => 10,
        20..=49 => 6,
        50..=79 => 3,
        _ => 0,
    }
}

fn condition_bonus(condition: WeatherCondition) -> u8 {
    match condition {
        WeatherCondition::Clear => 5,
        WeatherCondition::PartlyCloudy => 3,
        WeatherCondition::Cloudy => 1,
        WeatherCondition::Rain | WeatherCondition::Thunderstorm => 0,
    }
}

/// Crowd component, monotonically non-increasing in capacity percentage.
pub(crate) fn crowd_score(capacity_percentage: u8) -> u8 {
    match capacity_percentage {
        0..=39 => 35,
        40..=60 => 25,
        _ => 10,
    }
}

fn badges(breakdown: &ScoreBreakdown) -> Vec<String> {
    let mut out = Vec::new();
    if breakdown.weather >= BEST_WEATHER_BADGE_THRESHOLD {
        out.push("Best Weather".to_string());
    }
    if breakdown.crowd >= GOOD_CROWD_BADGE_THRESHOLD {
        out.push("Good Crowd".to_string());
    }
    if breakdown.price == ScoreBreakdown::PRICE_MAX {
        out.push("Great Value".to_string());
    }
    if breakdown.events >= EVENT_BADGE_THRESHOLD {
        out.push("Event Day".to_string());
    }
    out
}

/// Template sentences for the top contributing components, best first.
fn reasons(
    weather: &WeatherDay,
    crowd: &CrowdDay,
    pricing: &PricingInfo,
    breakdown: &ScoreBreakdown,
) -> Vec<String> {
    let weather_sentence = if breakdown.weather >= BEST_WEATHER_BADGE_THRESHOLD {
        format!(
            "Excellent weather: {} around {:.0}\u{b0}C with only a {}% chance of rain",
            weather.condition.label(),
            weather.temperature,
            weather.precipitation
        )
    } else if breakdown.weather >= 25 {
        format!(
            "Comfortable conditions at {:.0}\u{b0}C with a {}% chance of rain",
            weather.temperature, weather.precipitation
        )
    } else {
        format!(
            "Mixed weather: {} with a {}% chance of rain",
            weather.condition.label(),
            weather.precipitation
        )
    };

    let crowd_sentence = match crowd.level {
        CrowdLevel::Low => format!(
            "Light crowds expected at {}% of capacity",
            crowd.capacity_percentage
        ),
        CrowdLevel::Moderate => format!(
            "Manageable crowds around {}% of capacity",
            crowd.capacity_percentage
        ),
        CrowdLevel::High | CrowdLevel::VeryHigh => format!(
            "Busy day expected at {}% of capacity",
            crowd.capacity_percentage
        ),
    };

    let price_sentence = format!(
        "{} applies at {} per ticket",
        pricing.reason, pricing.dynamic_price
    );

    // Rank by how full each component is; component order breaks ties.
    let mut candidates = [
        (ratio(breakdown.weather, ScoreBreakdown::WEATHER_MAX), weather_sentence),
        (ratio(breakdown.crowd, ScoreBreakdown::CROWD_MAX), crowd_sentence),
        (ratio(breakdown.price, ScoreBreakdown::PRICE_MAX), price_sentence),
    ];
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    candidates
        .into_iter()
        .take(3)
        .map(|(_, sentence)| sentence)
        .collect()
}

fn ratio(value: u8, max: u8) -> f64 {
    f64::from(value) / f64::from(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attraction::builtin_catalog;
    use crate::crowd::predict_day;

    fn dufan_with_capacity(capacity: u32) -> Attraction {
        let mut a = builtin_catalog().remove(0);
        a.capacity = capacity;
        a
    }

    fn weather_day(date: NaiveDate, temperature: f64, condition: WeatherCondition, precipitation: u8) -> WeatherDay {
        WeatherDay {
            date,
            temperature,
            condition,
            precipitation,
        }
    }

    fn aligned_series(
        capacity: u32,
        start: NaiveDate,
        days: u32,
    ) -> (Vec<WeatherDay>, Vec<CrowdDay>) {
        let dates = calendar::date_range(start, days);
        let weather = dates
            .iter()
            .map(|&date| weather_day(date, 28.0, WeatherCondition::PartlyCloudy, 15))
            .collect();
        let crowd = dates
            .iter()
            .map(|&date| predict_day(capacity, date, 1.0))
            .collect();
        (weather, crowd)
    }

    #[test]
    fn weather_component_stays_within_bounds() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        for temp in [-5.0, 10.0, 24.0, 26.0, 28.0, 30.0, 33.0, 45.0] {
            for precip in [0, 19, 20, 49, 50, 79, 80, 100] {
                for condition in [
                    WeatherCondition::Clear,
                    WeatherCondition::PartlyCloudy,
                    WeatherCondition::Cloudy,
                    WeatherCondition::Rain,
                    WeatherCondition::Thunderstorm,
                ] {
                    let pts = weather_score(&weather_day(d, temp, condition, precip));
                    assert!(pts <= ScoreBreakdown::WEATHER_MAX);
                }
            }
        }
    }

    #[test]
    fn ideal_day_reaches_the_weather_maximum() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let pts = weather_score(&weather_day(d, 28.0, WeatherCondition::Clear, 5));
        assert_eq!(pts, ScoreBreakdown::WEATHER_MAX);
    }

    #[test]
    fn below_band_temperature_earns_partial_credit() {
        // 24°C partly cloudy with 18% precipitation: 19 + 10 + 3 = 32.
        let d = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let pts = weather_score(&weather_day(d, 24.0, WeatherCondition::PartlyCloudy, 18));
        assert_eq!(pts, 32);
        assert!(pts < ScoreBreakdown::WEATHER_MAX);
    }

    #[test]
    fn crowd_component_is_monotonically_non_increasing() {
        let mut previous = ScoreBreakdown::CROWD_MAX;
        for pct in 0..=100u8 {
            let pts = crowd_score(pct);
            assert!(pts <= ScoreBreakdown::CROWD_MAX);
            assert!(pts <= previous, "crowd score increased at {pct}%");
            previous = pts;
        }
        assert_eq!(crowd_score(39), 35);
        assert_eq!(crowd_score(40), 25);
        assert_eq!(crowd_score(60), 25);
        assert_eq!(crowd_score(61), 10);
    }

    #[test]
    fn output_is_ranked_by_score_then_date() {
        let a = dufan_with_capacity(10_000);
        // Tuesday through Monday.
        let start = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let (weather, crowd) = aligned_series(a.capacity, start, 7);
        let set = DateScorer::new()
            .score_dates(&a, &weather, &crowd, &Preferences::default())
            .unwrap();

        assert_eq!(set.recommended_dates.len(), 7);
        for pair in set.recommended_dates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].date < pair[1].date);
            }
        }
        // Identical weather everywhere, so weekdays outrank the weekend.
        assert!(!calendar::is_weekend(set.best().unwrap().date));
    }

    #[test]
    fn events_component_stays_zero_without_a_feed() {
        let a = dufan_with_capacity(10_000);
        let start = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let (weather, crowd) = aligned_series(a.capacity, start, 7);
        let set = DateScorer::new()
            .score_dates(&a, &weather, &crowd, &Preferences::default())
            .unwrap();
        assert!(set
            .recommended_dates
            .iter()
            .all(|d| d.score_breakdown.events == 0));
    }

    #[test]
    fn event_signal_feeds_the_events_component() {
        struct Festival(NaiveDate);
        impl EventSignal for Festival {
            fn score(&self, date: NaiveDate) -> u8 {
                if date == self.0 {
                    200 // deliberately past the cap
                } else {
                    0
                }
            }
        }

        let a = dufan_with_capacity(10_000);
        let start = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let (weather, crowd) = aligned_series(a.capacity, start, 3);
        let festival_day = start + chrono::Duration::days(1);
        let set = DateScorer::with_events(Arc::new(Festival(festival_day)))
            .score_dates(&a, &weather, &crowd, &Preferences::default())
            .unwrap();

        let scored = set
            .recommended_dates
            .iter()
            .find(|d| d.date == festival_day)
            .unwrap();
        assert_eq!(scored.score_breakdown.events, ScoreBreakdown::EVENTS_MAX);
        assert!(scored.badges.contains(&"Event Day".to_string()));
    }

    #[test]
    fn tuesday_scenario_scores_moderate_crowd_and_partial_weather() {
        let a = dufan_with_capacity(10_000);
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let weather = vec![weather_day(date, 24.0, WeatherCondition::PartlyCloudy, 18)];
        let crowd = vec![predict_day(a.capacity, date, 1.0)];

        let set = DateScorer::new()
            .score_dates(&a, &weather, &crowd, &Preferences::default())
            .unwrap();
        let best = set.best().unwrap();

        assert_eq!(best.crowd.level, CrowdLevel::Moderate);
        assert_eq!(best.score_breakdown.weather, 32);
        assert_eq!(best.score_breakdown.crowd, 25);
        assert_eq!(best.score_breakdown.price, pricing::STANDARD_POINTS);
        assert_eq!(best.score, 32 + 25 + 10);
        assert_eq!(best.pricing.reason, "Standard pricing");
    }

    #[test]
    fn badges_follow_component_thresholds() {
        let a = dufan_with_capacity(100_000);
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let weather = vec![weather_day(date, 28.0, WeatherCondition::Clear, 5)];
        let crowd = vec![predict_day(a.capacity, date, 1.0)];

        let set = DateScorer::new()
            .score_dates(&a, &weather, &crowd, &Preferences::default())
            .unwrap();
        let best = set.best().unwrap();
        assert!(best.badges.contains(&"Best Weather".to_string()));
        assert!(best.badges.contains(&"Good Crowd".to_string()));
        assert!(!best.reasons.is_empty() && best.reasons.len() <= 3);
    }

    #[test]
    fn unmatched_dates_are_a_data_mismatch() {
        let a = dufan_with_capacity(10_000);
        let start = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let (weather, mut crowd) = aligned_series(a.capacity, start, 3);
        crowd[2].date += chrono::Duration::days(30);

        let err = DateScorer::new()
            .score_dates(&a, &weather, &crowd, &Preferences::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommendError>(),
            Some(RecommendError::DataMismatch(_))
        ));
    }

    #[test]
    fn length_mismatch_is_a_data_mismatch() {
        let a = dufan_with_capacity(10_000);
        let start = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let (weather, crowd) = aligned_series(a.capacity, start, 3);
        let err = DateScorer::new()
            .score_dates(&a, &weather[..2], &crowd, &Preferences::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommendError>(),
            Some(RecommendError::DataMismatch(_))
        ));
    }

    #[test]
    fn empty_series_is_an_invalid_argument() {
        let a = dufan_with_capacity(10_000);
        let err = DateScorer::new()
            .score_dates(&a, &[], &[], &Preferences::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommendError>(),
            Some(RecommendError::InvalidArgument(_))
        ));
    }
}
