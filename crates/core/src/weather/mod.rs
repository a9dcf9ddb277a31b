pub mod openweather;
pub mod synthetic;

use crate::domain::attraction::Location;
use crate::domain::forecast::WeatherDay;
use chrono::NaiveDate;

/// External daily-forecast source. Callers must be prepared for failure
/// and fall back to a synthetic series of the same shape.
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_forecast(
        &self,
        location: &Location,
        start: NaiveDate,
        days: u32,
    ) -> anyhow::Result<Vec<WeatherDay>>;
}
