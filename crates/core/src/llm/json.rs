use crate::domain::attraction::Attraction;
use crate::domain::contract::OracleRecommendationSet;
use crate::domain::forecast::{CrowdDay, WeatherDay};
use crate::domain::recommendation::RecommendationSet;
use anyhow::Context;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort extraction: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

pub fn parse_recommendation_set(
    text: &str,
    attraction: &Attraction,
    weather_days: &[WeatherDay],
    crowd_days: &[CrowdDay],
) -> anyhow::Result<RecommendationSet> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    let parsed = serde_json::from_str::<OracleRecommendationSet>(&json_str)
        .with_context(|| format!("oracle output is not valid recommendation JSON: {json_str}"))?;
    parsed.validate_and_into_set(attraction, weather_days, crowd_days)
}
