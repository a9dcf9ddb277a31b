use crate::config::Settings;
use crate::domain::recommendation::RecommendationSet;
use crate::error::RecommendError;
use crate::llm::{call_with_alternates, json, OracleInput, RecommendationOracle};
use anyhow::Context;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_FALLBACK_MODELS: &str = "gemini-2.0-flash";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Gemini-backed recommendation oracle. The model preference list doubles
/// as the retry ladder: an unavailable instance hands over to the next
/// model after backoff, anything else fails fast and the caller degrades
/// to the deterministic scorer.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    models: Vec<String>,
    max_output_tokens: u32,
    retry_base_delay: Duration,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let primary = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let fallbacks = std::env::var("GEMINI_FALLBACK_MODELS")
            .unwrap_or_else(|_| DEFAULT_FALLBACK_MODELS.to_string());
        let models = model_preference_list(&primary, &fallbacks);

        let max_output_tokens = std::env::var("GEMINI_MAX_OUTPUT_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS);

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retry_base_delay = std::env::var("GEMINI_RETRY_BASE_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            models,
            max_output_tokens,
            retry_base_delay,
        })
    }

    async fn call_model(&self, model: &str, prompt: &str) -> anyhow::Result<String> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: self.max_output_tokens,
            },
            system_instruction: Some(SystemInstruction {
                parts: vec![Part {
                    text: Self::system_instruction(),
                }],
            }),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );
        let res = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await
            .map_err(|err| RecommendError::OracleUnavailable(format!("transport: {err}")))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|err| RecommendError::OracleUnavailable(format!("read body: {err}")))?;

        if !status.is_success() {
            return Err(classify_http_failure(status, &text));
        }

        let parsed = serde_json::from_str::<GenerateContentResponse>(&text)
            .map_err(|err| RecommendError::OracleMalformed(format!("response decode: {err}")))?;
        response_text(&parsed)
    }

    fn system_instruction() -> String {
        [
            "You are a travel-planning engine scoring visit dates for Jakarta attractions.",
            "Return ONLY valid JSON. Do not wrap in markdown. Do not include any extra keys.",
            "No trailing commas. No comments. Use double quotes for all JSON strings.",
            "Respond directly without extended reasoning. Analyze the data and return JSON immediately.",
        ]
        .join("\n")
    }

    fn user_prompt(input: &OracleInput) -> String {
        let weather_lines = input
            .weather_days
            .iter()
            .map(|w| {
                format!(
                    "{}|{:.0}\u{b0}C|{}|{}%",
                    w.date,
                    w.temperature,
                    w.condition.label(),
                    w.precipitation
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let crowd_lines = input
            .crowd_days
            .iter()
            .map(|c| format!("{}|{}|{}%", c.date, c.expected_visitors, c.capacity_percentage))
            .collect::<Vec<_>>()
            .join("\n");

        let avoid_crowds = if input.preferences.avoid_crowds {
            "avoid crowds"
        } else {
            "crowds OK"
        };

        format!(
            "Analyze the provided {days} days of data to recommend the top 3 best visit dates \
             for {name}.\n\n\
             ATTRACTION: {name} | Capacity: {capacity} | Base Price: {currency} {base_price}\n\
             USER PREFERENCES: {budget} budget, {group_size} people, {avoid_crowds}.\n\n\
             SCORING (100pts total):\n\
             - Weather (40pts): 26-30\u{b0}C and low precipitation is best. Clear or partly cloudy is a bonus.\n\
             - Crowd (35pts): <40% capacity=35pts; 40-60%=25pts; >60%=10pts.\n\
             - Price (15pts): weekday discounts apply on low-crowd days, premium prices on weekends.\n\
             - Events (10pts): no events data provided, use 0.\n\n\
             WEATHER DATA (date|temp|condition|precip%):\n{weather_lines}\n\n\
             CROWD DATA (date|visitors|capacity%):\n{crowd_lines}\n\n\
             Return a JSON object with the top 3 dates based on your analysis. Use this exact structure:\n\
             {{\n\
             \x20 \"recommendedDates\": [\n\
             \x20   {{\n\
             \x20     \"date\": \"YYYY-MM-DD\",\n\
             \x20     \"dayOfWeek\": \"string\",\n\
             \x20     \"score\": integer,\n\
             \x20     \"scoreBreakdown\": {{\"weather\": integer, \"crowd\": integer, \"price\": integer, \"events\": integer}},\n\
             \x20     \"weather\": {{\"temperature\": integer, \"condition\": \"string\", \"precipitation\": integer}},\n\
             \x20     \"crowd\": {{\"level\": \"string\", \"expectedVisitors\": integer, \"capacityPercentage\": integer}},\n\
             \x20     \"pricing\": {{\"dynamicPrice\": integer, \"reason\": \"string\"}},\n\
             \x20     \"reasons\": [\"string\"],\n\
             \x20     \"badges\": [\"string\"]\n\
             \x20   }}\n\
             \x20 ],\n\
             \x20 \"insights\": [\n\
             \x20   {{\"type\": \"tip\", \"title\": \"Best Time to Visit\", \"message\": \"string\"}}\n\
             \x20 ]\n\
             }}",
            days = input.weather_days.len(),
            name = input.attraction.name,
            capacity = input.attraction.capacity,
            currency = input.attraction.currency,
            base_price = input.attraction.base_price,
            budget = input.preferences.budget_range.label(),
            group_size = input.preferences.group_size,
        )
    }
}

#[async_trait::async_trait]
impl RecommendationOracle for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_recommendations(
        &self,
        input: &OracleInput,
    ) -> anyhow::Result<RecommendationSet> {
        let prompt = Self::user_prompt(input);
        call_with_alternates(&self.models, self.retry_base_delay, |_, model| {
            let prompt = prompt.clone();
            async move {
                let text = self.call_model(&model, &prompt).await?;
                json::parse_recommendation_set(
                    &text,
                    &input.attraction,
                    &input.weather_days,
                    &input.crowd_days,
                )
                .map_err(|err| RecommendError::OracleMalformed(format!("{err:#}")).into())
            }
        })
        .await
    }
}

fn model_preference_list(primary: &str, fallbacks_csv: &str) -> Vec<String> {
    let mut out = vec![primary.trim().to_string()];
    for part in fallbacks_csv.split(',') {
        let part = part.trim();
        if !part.is_empty() && !out.iter().any(|m| m == part) {
            out.push(part.to_string());
        }
    }
    out
}

fn classify_http_failure(status: StatusCode, body: &str) -> anyhow::Error {
    let snippet: String = body.chars().take(200).collect();
    let detail = format!("status={status} body={snippet}");
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        RecommendError::OracleUnavailable(detail).into()
    } else {
        anyhow::anyhow!("oracle rejected the request: {detail}")
    }
}

fn response_text(res: &GenerateContentResponse) -> anyhow::Result<String> {
    let Some(candidate) = res.candidates.first() else {
        return Err(RecommendError::OracleMalformed("no candidates in response".to_string()).into());
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            return Err(
                RecommendError::OracleMalformed(format!("finish_reason={reason}")).into(),
            );
        }
    }

    let mut out = String::new();
    if let Some(content) = &candidate.content {
        for part in &content.parts {
            if let Some(text) = &part.text {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
    }

    if out.trim().is_empty() {
        return Err(RecommendError::OracleMalformed("no text in response".to_string()).into());
    }
    Ok(out)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
