use crate::domain::forecast::{WeatherCondition, WeatherDay};
use crate::time::calendar;
use chrono::NaiveDate;
use rand::Rng;

/// Fallback forecast with the same schema as the live source. Tropical
/// Jakarta band: warm days, precipitation coupled to the condition. Seed
/// the rng per (location, start date) for a stable series.
pub fn synthetic_forecast<R: Rng + ?Sized>(
    start: NaiveDate,
    days: u32,
    rng: &mut R,
) -> Vec<WeatherDay> {
    calendar::date_range(start, days)
        .into_iter()
        .map(|date| {
            let condition = draw_condition(rng);
            let temperature = (rng.gen_range(24.0..=33.0f64) * 10.0).round() / 10.0;
            let precipitation = draw_precipitation(condition, rng);
            WeatherDay {
                date,
                temperature,
                condition,
                precipitation,
            }
        })
        .collect()
}

fn draw_condition<R: Rng + ?Sized>(rng: &mut R) -> WeatherCondition {
    match rng.gen_range(0..100u32) {
        0..=34 => WeatherCondition::Clear,
        35..=64 => WeatherCondition::PartlyCloudy,
        65..=79 => WeatherCondition::Cloudy,
        80..=94 => WeatherCondition::Rain,
        _ => WeatherCondition::Thunderstorm,
    }
}

fn draw_precipitation<R: Rng + ?Sized>(condition: WeatherCondition, rng: &mut R) -> u8 {
    match condition {
        WeatherCondition::Clear => rng.gen_range(0..=10),
        WeatherCondition::PartlyCloudy => rng.gen_range(5..=30),
        WeatherCondition::Cloudy => rng.gen_range(20..=50),
        WeatherCondition::Rain => rng.gen_range(50..=85),
        WeatherCondition::Thunderstorm => rng.gen_range(70..=100),
    }
}
