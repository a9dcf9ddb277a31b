use crate::cache::{InMemoryCache, RecommendationCache};
use crate::config::Settings;
use crate::crowd;
use crate::domain::attraction::{Attraction, Location};
use crate::domain::forecast::{CrowdDay, WeatherDay};
use crate::domain::recommendation::{
    Preferences, Recommendation, RecommendationSet, RecommendationSource,
};
use crate::error::RecommendError;
use crate::llm::gemini::GeminiClient;
use crate::llm::{OracleInput, RecommendationOracle};
use crate::scoring::DateScorer;
use crate::time::calendar;
use crate::weather::openweather::OpenWeatherClient;
use crate::weather::{synthetic, WeatherProvider};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_HORIZON_DAYS: u32 = 7;
const DEFAULT_CACHE_TTL_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub horizon_days: u32,
    pub cache_ttl: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

/// Orchestrates one recommendation run: cache lookup, concurrent weather
/// fetch and crowd forecast, oracle with deterministic fallback, cache
/// store. Both collaborators are optional; the engine always has a local
/// path to a result.
pub struct RecommendationEngine {
    weather: Option<Arc<dyn WeatherProvider>>,
    oracle: Option<Arc<dyn RecommendationOracle>>,
    cache: Arc<dyn RecommendationCache>,
    scorer: DateScorer,
    options: EngineOptions,
}

impl RecommendationEngine {
    pub fn new(
        weather: Option<Arc<dyn WeatherProvider>>,
        oracle: Option<Arc<dyn RecommendationOracle>>,
        cache: Arc<dyn RecommendationCache>,
        scorer: DateScorer,
        options: EngineOptions,
    ) -> Self {
        Self {
            weather,
            oracle,
            cache,
            scorer,
            options,
        }
    }

    /// Build from the environment. Missing upstream credentials degrade
    /// (synthetic weather, deterministic scorer) instead of failing.
    pub fn from_settings(settings: &Settings) -> Self {
        let weather: Option<Arc<dyn WeatherProvider>> =
            match OpenWeatherClient::from_settings(settings) {
                Ok(client) => Some(Arc::new(client)),
                Err(err) => {
                    tracing::warn!(error = %err, "weather provider not configured; using synthetic forecasts");
                    None
                }
            };

        let oracle: Option<Arc<dyn RecommendationOracle>> =
            match GeminiClient::from_settings(settings) {
                Ok(client) => Some(Arc::new(client)),
                Err(err) => {
                    tracing::warn!(error = %err, "oracle not configured; using the deterministic scorer");
                    None
                }
            };

        let options = EngineOptions {
            horizon_days: settings.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS),
            cache_ttl: Duration::from_secs(
                settings.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS),
            ),
        };

        Self::new(
            weather,
            oracle,
            Arc::new(InMemoryCache::new()),
            DateScorer::new(),
            options,
        )
    }

    /// Drop the oracle collaborator, forcing the deterministic path.
    pub fn without_oracle(mut self) -> Self {
        self.oracle = None;
        self
    }

    pub fn horizon_days(&self) -> u32 {
        self.options.horizon_days
    }

    pub async fn recommend(
        &self,
        attraction: &Attraction,
        preferences: &Preferences,
    ) -> anyhow::Result<Recommendation> {
        self.recommend_for(attraction, preferences, self.options.horizon_days)
            .await
    }

    pub async fn recommend_for(
        &self,
        attraction: &Attraction,
        preferences: &Preferences,
        days: u32,
    ) -> anyhow::Result<Recommendation> {
        if attraction.capacity == 0 {
            return Err(RecommendError::InvalidArgument(format!(
                "attraction {} has zero capacity",
                attraction.id
            ))
            .into());
        }
        if days == 0 {
            return Err(
                RecommendError::InvalidArgument("forecast horizon is zero days".to_string()).into(),
            );
        }

        let start = calendar::today_jakarta(chrono::Utc::now())?;
        let key = cache_key(&attraction.id, start, days);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(attraction = %attraction.id, %start, "serving cached recommendation");
            return Ok(hit);
        }

        // Weather fetch and crowd forecast are independent; join them
        // before scoring, which needs both series date-aligned.
        let (weather_days, crowd_days) = tokio::join!(
            self.forecast_weather(&attraction.location, start, days),
            async {
                let mut rng = stable_rng(&attraction.id, start);
                crowd::generate_crowd_predictions(attraction, days, start, &mut rng)
            }
        );
        let crowd_days = crowd_days?;

        let (source, set) = self
            .oracle_or_deterministic(attraction, &weather_days, &crowd_days, preferences)
            .await?;

        let recommendation = Recommendation {
            source,
            generated_at: chrono::Utc::now(),
            set,
        };
        self.cache
            .set(&key, recommendation.clone(), self.options.cache_ttl);
        tracing::info!(
            attraction = %attraction.id,
            %start,
            days,
            source = %recommendation.source,
            best = ?recommendation.set.best().map(|d| d.date),
            "recommendation computed"
        );
        Ok(recommendation)
    }

    async fn forecast_weather(
        &self,
        location: &Location,
        start: NaiveDate,
        days: u32,
    ) -> Vec<WeatherDay> {
        if let Some(provider) = &self.weather {
            match provider.fetch_forecast(location, start, days).await {
                Ok(series) => return series,
                Err(err) => {
                    tracing::warn!(
                        provider = provider.provider_name(),
                        error = %format!("{err:#}"),
                        "weather source unavailable; falling back to synthetic forecast"
                    );
                }
            }
        }

        let seed_label = format!("weather:{:.4}:{:.4}", location.latitude, location.longitude);
        let mut rng = stable_rng(&seed_label, start);
        synthetic::synthetic_forecast(start, days, &mut rng)
    }

    async fn oracle_or_deterministic(
        &self,
        attraction: &Attraction,
        weather_days: &[WeatherDay],
        crowd_days: &[CrowdDay],
        preferences: &Preferences,
    ) -> anyhow::Result<(RecommendationSource, RecommendationSet)> {
        if let Some(oracle) = &self.oracle {
            let input = OracleInput::try_new(
                attraction.clone(),
                weather_days.to_vec(),
                crowd_days.to_vec(),
                preferences.clone(),
            )?;
            match oracle.generate_recommendations(&input).await {
                Ok(set) => return Ok((RecommendationSource::Oracle, set)),
                Err(err) => {
                    if err
                        .downcast_ref::<RecommendError>()
                        .is_some_and(RecommendError::is_contract_violation)
                    {
                        return Err(err);
                    }
                    tracing::warn!(
                        provider = oracle.provider_name(),
                        error = %format!("{err:#}"),
                        "oracle failed; degrading to the deterministic scorer"
                    );
                }
            }
        }

        let set = self
            .scorer
            .score_dates(attraction, weather_days, crowd_days, preferences)?;
        Ok((RecommendationSource::Deterministic, set))
    }
}

fn cache_key(attraction_id: &str, start: NaiveDate, days: u32) -> String {
    format!("rec:{attraction_id}:{start}:{days}d")
}

/// Seed a rng from a label and date so repeated runs within the same day
/// produce the same jittered forecasts.
fn stable_rng(label: &str, date: NaiveDate) -> ChaCha8Rng {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    label.hash(&mut hasher);
    date.hash(&mut hasher);
    ChaCha8Rng::seed_from_u64(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoopCache;
    use crate::domain::attraction::builtin_catalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingWeather;

    #[async_trait::async_trait]
    impl WeatherProvider for FailingWeather {
        fn provider_name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_forecast(
            &self,
            _location: &Location,
            _start: NaiveDate,
            _days: u32,
        ) -> anyhow::Result<Vec<WeatherDay>> {
            Err(RecommendError::UpstreamDataUnavailable("connection refused".to_string()).into())
        }
    }

    struct CountingWeather {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl WeatherProvider for CountingWeather {
        fn provider_name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_forecast(
            &self,
            _location: &Location,
            start: NaiveDate,
            days: u32,
        ) -> anyhow::Result<Vec<WeatherDay>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            Ok(synthetic::synthetic_forecast(start, days, &mut rng))
        }
    }

    struct MalformedOracle;

    #[async_trait::async_trait]
    impl RecommendationOracle for MalformedOracle {
        fn provider_name(&self) -> &'static str {
            "malformed"
        }

        async fn generate_recommendations(
            &self,
            _input: &OracleInput,
        ) -> anyhow::Result<RecommendationSet> {
            Err(RecommendError::OracleMalformed("no valid JSON found".to_string()).into())
        }
    }

    struct EchoOracle;

    #[async_trait::async_trait]
    impl RecommendationOracle for EchoOracle {
        fn provider_name(&self) -> &'static str {
            "echo"
        }

        async fn generate_recommendations(
            &self,
            input: &OracleInput,
        ) -> anyhow::Result<RecommendationSet> {
            DateScorer::new().score_dates(
                &input.attraction,
                &input.weather_days,
                &input.crowd_days,
                &input.preferences,
            )
        }
    }

    fn engine(
        weather: Option<Arc<dyn WeatherProvider>>,
        oracle: Option<Arc<dyn RecommendationOracle>>,
        cache: Arc<dyn RecommendationCache>,
    ) -> RecommendationEngine {
        RecommendationEngine::new(
            weather,
            oracle,
            cache,
            DateScorer::new(),
            EngineOptions::default(),
        )
    }

    #[tokio::test]
    async fn degraded_weather_still_produces_a_full_result() {
        let engine = engine(Some(Arc::new(FailingWeather)), None, Arc::new(NoopCache));
        let attraction = builtin_catalog().remove(0);
        let rec = engine
            .recommend(&attraction, &Preferences::default())
            .await
            .unwrap();
        assert_eq!(rec.source, RecommendationSource::Deterministic);
        assert_eq!(rec.set.recommended_dates.len(), 7);
    }

    #[tokio::test]
    async fn malformed_oracle_degrades_to_the_deterministic_scorer() {
        let engine = engine(None, Some(Arc::new(MalformedOracle)), Arc::new(NoopCache));
        let attraction = builtin_catalog().remove(0);
        let rec = engine
            .recommend(&attraction, &Preferences::default())
            .await
            .unwrap();
        assert_eq!(rec.source, RecommendationSource::Deterministic);
        assert!(!rec.set.recommended_dates.is_empty());
    }

    #[tokio::test]
    async fn healthy_oracle_result_is_reported_as_oracle_sourced() {
        let engine = engine(None, Some(Arc::new(EchoOracle)), Arc::new(NoopCache));
        let attraction = builtin_catalog().remove(0);
        let rec = engine
            .recommend(&attraction, &Preferences::default())
            .await
            .unwrap();
        assert_eq!(rec.source, RecommendationSource::Oracle);
    }

    #[tokio::test]
    async fn second_request_is_served_from_the_cache() {
        let weather = Arc::new(CountingWeather {
            calls: AtomicUsize::new(0),
        });
        let engine = engine(
            Some(weather.clone()),
            None,
            Arc::new(InMemoryCache::new()),
        );
        let attraction = builtin_catalog().remove(0);

        let first = engine
            .recommend(&attraction, &Preferences::default())
            .await
            .unwrap();
        let second = engine
            .recommend(&attraction, &Preferences::default())
            .await
            .unwrap();

        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn zero_capacity_is_rejected_up_front() {
        let engine = engine(None, None, Arc::new(NoopCache));
        let mut attraction = builtin_catalog().remove(0);
        attraction.capacity = 0;
        let err = engine
            .recommend(&attraction, &Preferences::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommendError>(),
            Some(RecommendError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn zero_day_horizon_is_rejected_up_front() {
        let engine = engine(None, None, Arc::new(NoopCache));
        let attraction = builtin_catalog().remove(0);
        let err = engine
            .recommend_for(&attraction, &Preferences::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecommendError>(),
            Some(RecommendError::InvalidArgument(_))
        ));
    }
}
