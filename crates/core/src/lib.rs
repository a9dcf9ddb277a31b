pub mod cache;
pub mod crowd;
pub mod domain;
pub mod engine;
pub mod error;
pub mod llm;
pub mod scoring;
pub mod time;
pub mod weather;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub openweather_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub cache_ttl_secs: Option<u64>,
        pub horizon_days: Option<u32>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
                openweather_api_key: std::env::var("OPENWEATHER_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                cache_ttl_secs: std::env::var("RECOMMENDATION_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok()),
                horizon_days: std::env::var("RECOMMENDATION_HORIZON_DAYS")
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok()),
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required")
        }

        pub fn require_openweather_api_key(&self) -> anyhow::Result<&str> {
            self.openweather_api_key
                .as_deref()
                .context("OPENWEATHER_API_KEY is required")
        }
    }
}
