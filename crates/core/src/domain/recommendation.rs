use crate::domain::forecast::{CrowdDay, WeatherDay};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-component decomposition of the 0-100 suitability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub weather: u8,
    pub crowd: u8,
    pub price: u8,
    pub events: u8,
}

impl ScoreBreakdown {
    pub const WEATHER_MAX: u8 = 40;
    pub const CROWD_MAX: u8 = 35;
    pub const PRICE_MAX: u8 = 15;
    pub const EVENTS_MAX: u8 = 10;

    pub fn total(&self) -> u8 {
        let sum = u16::from(self.weather)
            + u16::from(self.crowd)
            + u16::from(self.price)
            + u16::from(self.events);
        sum.min(100) as u8
    }

    pub fn within_bounds(&self) -> bool {
        self.weather <= Self::WEATHER_MAX
            && self.crowd <= Self::CROWD_MAX
            && self.price <= Self::PRICE_MAX
            && self.events <= Self::EVENTS_MAX
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    /// Synthetic dynamic price in whole currency units.
    pub dynamic_price: i64,
    /// Name of the applied pricing policy ("Weekday discount", ...).
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedDate {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub score: u8,
    pub score_breakdown: ScoreBreakdown,
    pub weather: WeatherDay,
    pub crowd: CrowdDay,
    pub pricing: PricingInfo,
    pub reasons: Vec<String>,
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Tip,
    Weather,
    Crowd,
    Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
}

/// The ranked output of a recommendation run. `recommended_dates` is kept
/// sorted by score descending, ties broken by earliest date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub recommended_dates: Vec<RecommendedDate>,
    #[serde(default)]
    pub insights: Vec<Insight>,
}

impl RecommendationSet {
    /// Re-establish the canonical ranking order.
    pub fn sort_ranked(&mut self) {
        self.recommended_dates
            .sort_by(|a, b| b.score.cmp(&a.score).then(a.date.cmp(&b.date)));
    }

    /// The best choice, when any dates were scored.
    pub fn best(&self) -> Option<&RecommendedDate> {
        self.recommended_dates.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetRange {
    Low,
    Medium,
    High,
}

impl BudgetRange {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub budget_range: BudgetRange,
    pub group_size: u32,
    pub interests: Vec<String>,
    pub avoid_crowds: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            budget_range: BudgetRange::Medium,
            group_size: 2,
            interests: Vec::new(),
            avoid_crowds: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Oracle,
    Deterministic,
}

impl fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oracle => write!(f, "oracle"),
            Self::Deterministic => write!(f, "deterministic"),
        }
    }
}

/// Envelope handed to the API, the worker and the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub source: RecommendationSource,
    pub generated_at: DateTime<Utc>,
    pub set: RecommendationSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forecast::{CrowdLevel, WeatherCondition};

    fn stub_date(date: NaiveDate, score: u8) -> RecommendedDate {
        RecommendedDate {
            date,
            day_of_week: date.format("%A").to_string(),
            score,
            score_breakdown: ScoreBreakdown {
                weather: score.min(ScoreBreakdown::WEATHER_MAX),
                crowd: 0,
                price: 0,
                events: 0,
            },
            weather: WeatherDay {
                date,
                temperature: 28.0,
                condition: WeatherCondition::Clear,
                precipitation: 10,
            },
            crowd: CrowdDay {
                date,
                level: CrowdLevel::Low,
                expected_visitors: 100,
                capacity_percentage: 10,
                factors: vec!["Typical weekday traffic".to_string()],
            },
            pricing: PricingInfo {
                dynamic_price: 200_000,
                reason: "Standard pricing".to_string(),
            },
            reasons: vec!["stub".to_string()],
            badges: Vec::new(),
        }
    }

    #[test]
    fn total_clamps_to_one_hundred() {
        let full = ScoreBreakdown {
            weather: 40,
            crowd: 35,
            price: 15,
            events: 10,
        };
        assert_eq!(full.total(), 100);
        assert!(full.within_bounds());

        let overflowing = ScoreBreakdown {
            weather: 200,
            crowd: 35,
            price: 15,
            events: 10,
        };
        assert_eq!(overflowing.total(), 100);
        assert!(!overflowing.within_bounds());
    }

    #[test]
    fn sort_ranked_orders_by_score_then_earliest_date() {
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 21).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2026, 1, 22).unwrap();

        let mut set = RecommendationSet {
            recommended_dates: vec![stub_date(d3, 40), stub_date(d1, 12), stub_date(d2, 40)],
            insights: Vec::new(),
        };
        set.sort_ranked();

        let order: Vec<_> = set.recommended_dates.iter().map(|d| d.date).collect();
        assert_eq!(order, vec![d2, d3, d1]);
        assert_eq!(set.best().unwrap().date, d2);
    }

    #[test]
    fn wire_shape_uses_camel_case() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let v = serde_json::to_value(stub_date(d, 50)).unwrap();
        assert!(v.get("dayOfWeek").is_some());
        assert!(v.get("scoreBreakdown").is_some());
        assert!(v["crowd"].get("capacityPercentage").is_some());
        assert!(v["pricing"].get("dynamicPrice").is_some());
    }
}
