use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Current calendar date in Western Indonesian Time (WIB, UTC+7), where the
/// attraction catalog lives. Forecast windows always open on this date.
pub fn today_jakarta(now_utc: DateTime<Utc>) -> anyhow::Result<NaiveDate> {
    let wib = chrono::FixedOffset::east_opt(WIB_OFFSET_SECS).context("invalid WIB offset")?;
    Ok(now_utc.with_timezone(&wib).date_naive())
}

/// The canonical date-range generator. Both the crowd forecaster and the
/// weather series are built from this so their date sets always align.
pub fn date_range(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .map(|offset| start + Duration::days(i64::from(offset)))
        .collect()
}

pub fn day_of_week_label(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

/// "Tuesday, 5 August 2026"
pub fn format_full(date: NaiveDate) -> String {
    date.format("%A, %-d %B %Y").to_string()
}

/// "5 Aug"
pub fn format_short(date: NaiveDate) -> String {
    date.format("%-d %b").to_string()
}

pub fn is_today(date: NaiveDate, now_utc: DateTime<Utc>) -> anyhow::Result<bool> {
    Ok(date == today_jakarta(now_utc)?)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}
