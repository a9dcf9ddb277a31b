use crate::domain::recommendation::{Insight, InsightKind, RecommendedDate};
use crate::time::calendar;

const BEST_WEATHER_THRESHOLD: u8 = 35;

/// Summarise the ranked list. Returns an empty vec when no rule fires.
pub(crate) fn derive_insights(ranked: &[RecommendedDate]) -> Vec<Insight> {
    let mut out = Vec::new();

    let top = &ranked[..ranked.len().min(3)];
    let weekday_labels: Vec<&str> = top
        .iter()
        .filter(|d| !calendar::is_weekend(d.date))
        .map(|d| d.day_of_week.as_str())
        .collect();
    if weekday_labels.len() >= 2 {
        out.push(Insight {
            kind: InsightKind::Tip,
            title: "Best Time to Visit".to_string(),
            message: format!(
                "Weekdays such as {} combine lighter crowds with standard or \
                 discounted pricing. Aim for days around 26-30\u{b0}C with a low \
                 chance of rain for the most comfortable visit.",
                weekday_labels.join(" and ")
            ),
        });
    }

    if let Some(best) = ranked.first() {
        if best.score_breakdown.weather >= BEST_WEATHER_THRESHOLD {
            out.push(Insight {
                kind: InsightKind::Weather,
                title: "Great Weather Window".to_string(),
                message: format!(
                    "{} looks ideal: {} at {:.0}\u{b0}C with a {}% chance of rain.",
                    calendar::format_full(best.date),
                    best.weather.condition.label(),
                    best.weather.temperature,
                    best.weather.precipitation
                ),
            });
        }
    }

    out
}
