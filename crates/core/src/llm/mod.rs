pub mod gemini;
pub mod json;

use crate::domain::attraction::Attraction;
use crate::domain::forecast::{CrowdDay, WeatherDay};
use crate::domain::recommendation::{Preferences, RecommendationSet};
use crate::error::RecommendError;
use std::future::Future;
use std::time::Duration;

/// Input bundle for a single oracle query. Construction validates that the
/// weather and crowd series cover the same dates in the same order, so a
/// misaligned bundle never reaches the wire.
#[derive(Debug, Clone)]
pub struct OracleInput {
    pub attraction: Attraction,
    pub weather_days: Vec<WeatherDay>,
    pub crowd_days: Vec<CrowdDay>,
    pub preferences: Preferences,
}

impl OracleInput {
    pub fn try_new(
        attraction: Attraction,
        weather_days: Vec<WeatherDay>,
        crowd_days: Vec<CrowdDay>,
        preferences: Preferences,
    ) -> anyhow::Result<Self> {
        if weather_days.is_empty() {
            return Err(
                RecommendError::InvalidArgument("weather series is empty".to_string()).into(),
            );
        }
        if weather_days.len() != crowd_days.len() {
            return Err(RecommendError::DataMismatch(format!(
                "weather covers {} days but crowd covers {}",
                weather_days.len(),
                crowd_days.len()
            ))
            .into());
        }
        for (weather, crowd) in weather_days.iter().zip(&crowd_days) {
            if weather.date != crowd.date {
                return Err(RecommendError::DataMismatch(format!(
                    "weather date {} is paired with crowd date {}",
                    weather.date, crowd.date
                ))
                .into());
            }
        }

        Ok(Self {
            attraction,
            weather_days,
            crowd_days,
            preferences,
        })
    }
}

#[async_trait::async_trait]
pub trait RecommendationOracle: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn generate_recommendations(
        &self,
        input: &OracleInput,
    ) -> anyhow::Result<RecommendationSet>;
}

/// Run `call` against an ordered preference list of oracle instances.
///
/// Only `OracleUnavailable` failures move on to the next alternate, after
/// an exponentially growing backoff (`base_delay` doubling per attempt).
/// Every other error class fails fast without exhausting the list.
pub(crate) async fn call_with_alternates<T, F, Fut>(
    alternates: &[String],
    base_delay: Duration,
    mut call: F,
) -> anyhow::Result<T>
where
    F: FnMut(usize, String) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    anyhow::ensure!(
        !alternates.is_empty(),
        "at least one oracle instance is required"
    );

    let mut last_err: Option<anyhow::Error> = None;
    for (attempt, alternate) in alternates.iter().enumerate() {
        if attempt > 0 {
            let backoff = base_delay * 2u32.saturating_pow(attempt as u32 - 1);
            tracing::warn!(
                attempt,
                ?backoff,
                alternate = %alternate,
                "oracle unavailable; retrying against the next alternate"
            );
            tokio::time::sleep(backoff).await;
        }

        match call(attempt, alternate.clone()).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let retryable = err
                    .downcast_ref::<RecommendError>()
                    .is_some_and(RecommendError::is_retryable);
                if !retryable {
                    return Err(err);
                }
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        RecommendError::OracleUnavailable("no oracle alternates left".to_string()).into()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attraction::builtin_catalog;
    use crate::domain::forecast::{CrowdLevel, WeatherCondition};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn series(dates: &[NaiveDate]) -> (Vec<WeatherDay>, Vec<CrowdDay>) {
        let weather = dates
            .iter()
            .map(|&date| WeatherDay {
                date,
                temperature: 28.0,
                condition: WeatherCondition::Clear,
                precipitation: 10,
            })
            .collect();
        let crowd = dates
            .iter()
            .map(|&date| CrowdDay {
                date,
                level: CrowdLevel::Low,
                expected_visitors: 1_000,
                capacity_percentage: 10,
                factors: vec!["Typical weekday traffic".to_string()],
            })
            .collect();
        (weather, crowd)
    }

    #[test]
    fn input_rejects_misaligned_series() {
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 21).unwrap();
        let (weather, _) = series(&[d1, d2]);
        let (_, crowd) = series(&[d1, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()]);

        let err = OracleInput::try_new(
            builtin_catalog().remove(0),
            weather,
            crowd,
            Preferences::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommendError>(),
            Some(RecommendError::DataMismatch(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_first_attempt_retries_with_one_delay() {
        let alternates = vec!["primary".to_string(), "fallback".to_string()];
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_closure = calls.clone();

        let started = Instant::now();
        let result: i32 = call_with_alternates(&alternates, Duration::from_millis(500), |_, _| {
            let calls = calls_in_closure.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(RecommendError::OracleUnavailable("status=503".to_string()).into())
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // Exactly one backoff delay of the base duration.
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_errors_fail_fast() {
        let alternates = vec!["primary".to_string(), "fallback".to_string()];
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_closure = calls.clone();

        let result: anyhow::Result<i32> =
            call_with_alternates(&alternates, Duration::from_millis(500), |_, _| {
                let calls = calls_in_closure.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(RecommendError::OracleMalformed("not json".to_string()).into())
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommendError>(),
            Some(RecommendError::OracleMalformed(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_the_list_returns_the_last_error_with_doubling_backoff() {
        let alternates = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let started = Instant::now();

        let result: anyhow::Result<i32> =
            call_with_alternates(&alternates, Duration::from_millis(500), |attempt, _| async move {
                Err(RecommendError::OracleUnavailable(format!("attempt {attempt}")).into())
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("attempt 2"));
        // 500ms before the second attempt, 1000ms before the third.
        assert_eq!(started.elapsed(), Duration::from_millis(1_500));
    }
}
