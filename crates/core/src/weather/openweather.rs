use crate::config::Settings;
use crate::domain::attraction::Location;
use crate::domain::forecast::{WeatherCondition, WeatherDay};
use crate::error::RecommendError;
use crate::time::calendar;
use crate::weather::WeatherProvider;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;

// The 5-day/3-hour forecast carries eight entries per day; the one
// closest to this hour represents the day.
const REPRESENTATIVE_HOUR: u32 = 12;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retries: u32,
}

impl OpenWeatherClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_openweather_api_key()?.to_string();
        let base_url =
            std::env::var("OPENWEATHER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("OPENWEATHER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("OPENWEATHER_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build weather http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            retries,
        })
    }

    async fn fetch_once(
        &self,
        location: &Location,
        start: NaiveDate,
        days: u32,
    ) -> Result<Vec<WeatherDay>> {
        let url = format!("{}/forecast", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .context("weather request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read weather response")?;
        if !status.is_success() {
            let snippet: String = text.chars().take(200).collect();
            anyhow::bail!("weather source HTTP {status}: {snippet}");
        }

        let parsed = serde_json::from_str::<ForecastResponse>(&text)
            .context("failed to parse weather response")?;

        let series = daily_series(&parsed, start, days)?;
        validate(&series, start, days)?;
        Ok(series)
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn provider_name(&self) -> &'static str {
        "openweather"
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
        start: NaiveDate,
        days: u32,
    ) -> Result<Vec<WeatherDay>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(location, start, days).await {
                Ok(series) => return Ok(series),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(RecommendError::UpstreamDataUnavailable(format!("{err:#}")).into());
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, error = %err, "weather fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Reduce the 3-hourly list to one record per requested date, preferring
/// the entry closest to midday.
fn daily_series(res: &ForecastResponse, start: NaiveDate, days: u32) -> Result<Vec<WeatherDay>> {
    let mut best_per_day: BTreeMap<NaiveDate, (u32, &ForecastEntry)> = BTreeMap::new();
    for entry in &res.list {
        let stamp = NaiveDateTime::parse_from_str(&entry.dt_txt, "%Y-%m-%d %H:%M:%S")
            .with_context(|| format!("bad forecast timestamp: {}", entry.dt_txt))?;
        let date = stamp.date();
        let distance = hour_distance(stamp.hour());
        match best_per_day.get(&date) {
            Some((current, _)) if *current <= distance => {}
            _ => {
                best_per_day.insert(date, (distance, entry));
            }
        }
    }

    let mut out = Vec::with_capacity(days as usize);
    for date in calendar::date_range(start, days) {
        let Some((_, entry)) = best_per_day.get(&date) else {
            anyhow::bail!("weather source returned no entries for {date}");
        };
        out.push(into_weather_day(date, entry)?);
    }
    Ok(out)
}

fn hour_distance(hour: u32) -> u32 {
    hour.abs_diff(REPRESENTATIVE_HOUR)
}

fn into_weather_day(date: NaiveDate, entry: &ForecastEntry) -> Result<WeatherDay> {
    let summary = entry
        .weather
        .first()
        .context("forecast entry has no weather summary")?;
    let precipitation = (entry.pop.clamp(0.0, 1.0) * 100.0).round() as u8;
    Ok(WeatherDay {
        date,
        temperature: entry.main.temp,
        condition: map_condition(&summary.main, &summary.description),
        precipitation,
    })
}

fn map_condition(main: &str, description: &str) -> WeatherCondition {
    match main {
        "Clear" => WeatherCondition::Clear,
        "Thunderstorm" => WeatherCondition::Thunderstorm,
        "Rain" | "Drizzle" => WeatherCondition::Rain,
        "Clouds" => {
            let description = description.to_ascii_lowercase();
            if description.contains("few") || description.contains("scattered") {
                WeatherCondition::PartlyCloudy
            } else {
                WeatherCondition::Cloudy
            }
        }
        _ => WeatherCondition::Cloudy,
    }
}

fn validate(series: &[WeatherDay], start: NaiveDate, days: u32) -> Result<()> {
    anyhow::ensure!(
        series.len() == days as usize,
        "weather series has {} days, expected {days}",
        series.len()
    );
    for (offset, day) in series.iter().enumerate() {
        let expected = start + chrono::Duration::days(offset as i64);
        anyhow::ensure!(
            day.date == expected,
            "weather series out of order at {}: expected {expected}",
            day.date
        );
        anyhow::ensure!(
            day.precipitation <= 100,
            "precipitation out of range: {}",
            day.precipitation
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastEntry {
    dt_txt: String,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<WeatherSummary>,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct WeatherSummary {
    main: String,
    #[serde(default)]
    description: String,
}
