use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Thunderstorm,
}

impl WeatherCondition {
    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly cloudy",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Thunderstorm => "thunderstorm",
        }
    }
}

/// One forecast day. Dates are unique and consecutive within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDay {
    pub date: NaiveDate,
    /// Daytime temperature in °C.
    pub temperature: f64,
    pub condition: WeatherCondition,
    /// Precipitation probability, 0..=100.
    pub precipitation: u8,
}

/// Crowd level bands over capacity percentage. The level is a function of
/// the capacity percentage alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrowdLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl CrowdLevel {
    pub fn from_capacity_percentage(pct: u8) -> Self {
        match pct {
            0..=39 => Self::Low,
            40..=69 => Self::Moderate,
            70..=89 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrowdDay {
    pub date: NaiveDate,
    pub level: CrowdLevel,
    /// May exceed the attraction capacity to signal an over-capacity day.
    pub expected_visitors: u32,
    /// round(expected / capacity * 100), clamped to 100.
    pub capacity_percentage: u8,
    /// Human-readable contributing factors in application order.
    pub factors: Vec<String>,
}
