use crate::domain::attraction::Attraction;
use crate::domain::forecast::{CrowdDay, WeatherDay};
use crate::domain::recommendation::{
    Insight, InsightKind, PricingInfo, RecommendationSet, RecommendedDate, ScoreBreakdown,
};
use crate::time::calendar;
use anyhow::{bail, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Wire contract for the recommendation oracle. Parsed leniently (unknown
/// keys such as the echoed weather/crowd blocks are ignored), then
/// validated strictly and rebuilt against the authoritative inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRecommendationSet {
    pub recommended_dates: Vec<OracleRecommendedDate>,
    #[serde(default)]
    pub insights: Vec<OracleInsight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRecommendedDate {
    pub date: NaiveDate,
    pub score: i64,
    pub score_breakdown: OracleScoreBreakdown,
    pub pricing: OraclePricingInfo,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleScoreBreakdown {
    pub weather: i64,
    pub crowd: i64,
    pub price: i64,
    pub events: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OraclePricingInfo {
    pub dynamic_price: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleInsight {
    #[serde(rename = "type", default)]
    pub kind: Option<InsightKind>,
    pub title: String,
    pub message: String,
}

impl OracleRecommendationSet {
    pub fn validate_and_into_set(
        self,
        attraction: &Attraction,
        weather_days: &[WeatherDay],
        crowd_days: &[CrowdDay],
    ) -> anyhow::Result<RecommendationSet> {
        ensure!(
            !self.recommended_dates.is_empty(),
            "oracle output must contain at least one recommended date"
        );

        let weather_by_date: BTreeMap<NaiveDate, &WeatherDay> =
            weather_days.iter().map(|w| (w.date, w)).collect();
        let crowd_by_date: BTreeMap<NaiveDate, &CrowdDay> =
            crowd_days.iter().map(|c| (c.date, c)).collect();

        let mut seen_dates = BTreeSet::<NaiveDate>::new();
        let mut dates = Vec::with_capacity(self.recommended_dates.len());
        for entry in self.recommended_dates {
            dates.push(entry.validate_and_into_date(
                attraction,
                &weather_by_date,
                &crowd_by_date,
                &mut seen_dates,
            )?);
        }

        let insights = self
            .insights
            .into_iter()
            .map(OracleInsight::validate_into_insight)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut set = RecommendationSet {
            recommended_dates: dates,
            insights,
        };
        set.sort_ranked();
        Ok(set)
    }
}

impl OracleRecommendedDate {
    fn validate_and_into_date(
        self,
        attraction: &Attraction,
        weather_by_date: &BTreeMap<NaiveDate, &WeatherDay>,
        crowd_by_date: &BTreeMap<NaiveDate, &CrowdDay>,
        seen_dates: &mut BTreeSet<NaiveDate>,
    ) -> anyhow::Result<RecommendedDate> {
        ensure!(
            seen_dates.insert(self.date),
            "duplicate recommended date: {}",
            self.date
        );
        let Some(weather) = weather_by_date.get(&self.date) else {
            bail!(
                "recommended date {} is outside the requested window",
                self.date
            );
        };
        let Some(crowd) = crowd_by_date.get(&self.date) else {
            bail!("recommended date {} has no crowd forecast", self.date);
        };

        let breakdown = self.score_breakdown.validate_into_breakdown()?;
        ensure!(
            (0..=100).contains(&self.score),
            "score out of range: {}",
            self.score
        );
        ensure!(
            self.score as u8 == breakdown.total(),
            "score {} does not equal breakdown total {}",
            self.score,
            breakdown.total()
        );

        let reasons: Vec<String> = self
            .reasons
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        ensure!(!reasons.is_empty(), "reasons must be non-empty");
        ensure!(reasons.len() <= 5, "too many reasons ({})", reasons.len());

        let badges: Vec<String> = self
            .badges
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        // Sanity band for the synthetic dynamic price: the named policies
        // stay well inside half to double the base price.
        ensure!(
            (attraction.base_price / 2..=attraction.base_price * 2)
                .contains(&self.pricing.dynamic_price),
            "dynamic price {} implausible for base price {}",
            self.pricing.dynamic_price,
            attraction.base_price
        );
        let reason = self.pricing.reason.trim().to_string();
        ensure!(!reason.is_empty(), "pricing reason must be non-empty");

        Ok(RecommendedDate {
            date: self.date,
            day_of_week: calendar::day_of_week_label(self.date),
            score: self.score as u8,
            score_breakdown: breakdown,
            weather: (*weather).clone(),
            crowd: (*crowd).clone(),
            pricing: PricingInfo {
                dynamic_price: self.pricing.dynamic_price,
                reason,
            },
            reasons,
            badges,
        })
    }
}

impl OracleScoreBreakdown {
    fn validate_into_breakdown(self) -> anyhow::Result<ScoreBreakdown> {
        let components = [
            ("weather", self.weather, ScoreBreakdown::WEATHER_MAX),
            ("crowd", self.crowd, ScoreBreakdown::CROWD_MAX),
            ("price", self.price, ScoreBreakdown::PRICE_MAX),
            ("events", self.events, ScoreBreakdown::EVENTS_MAX),
        ];
        for (label, value, max) in components {
            ensure!(
                (0..=i64::from(max)).contains(&value),
                "{label} component out of range: {value} (max {max})"
            );
        }
        Ok(ScoreBreakdown {
            weather: self.weather as u8,
            crowd: self.crowd as u8,
            price: self.price as u8,
            events: self.events as u8,
        })
    }
}

impl OracleInsight {
    fn validate_into_insight(self) -> anyhow::Result<Insight> {
        let title = self.title.trim().to_string();
        let message = self.message.trim().to_string();
        ensure!(!title.is_empty(), "insight title must be non-empty");
        ensure!(!message.is_empty(), "insight message must be non-empty");
        Ok(Insight {
            kind: self.kind.unwrap_or(InsightKind::Tip),
            title,
            message,
        })
    }
}
