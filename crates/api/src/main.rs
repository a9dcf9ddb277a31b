use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use wisata_core::domain::attraction::{builtin_catalog, Attraction};
use wisata_core::domain::recommendation::{
    Preferences, RecommendationSet, RecommendationSource,
};
use wisata_core::engine::RecommendationEngine;
use wisata_core::error::RecommendError;

const MAX_HORIZON_DAYS: u32 = 14;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = wisata_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Missing upstream credentials are logged inside and degrade to the
    // synthetic/deterministic path; the API always starts.
    let engine = RecommendationEngine::from_settings(&settings);

    let state = AppState {
        engine: Arc::new(engine),
        catalog: Arc::new(builtin_catalog()),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/attractions", get(list_attractions))
        .route("/attractions/:id", get(get_attraction))
        .route("/attractions/:id/recommendations", get(get_recommendations))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    engine: Arc<RecommendationEngine>,
    catalog: Arc<Vec<Attraction>>,
}

impl AppState {
    fn find_attraction(&self, id: &str) -> Option<&Attraction> {
        self.catalog.iter().find(|a| a.id == id)
    }
}

async fn list_attractions(State(state): State<AppState>) -> Json<Vec<Attraction>> {
    Json(state.catalog.as_ref().clone())
}

async fn get_attraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Attraction>, StatusCode> {
    state
        .find_attraction(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Debug, Deserialize)]
struct RecommendQuery {
    days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRecommendation {
    request_id: Uuid,
    attraction_id: String,
    source: RecommendationSource,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    set: RecommendationSet,
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<ApiRecommendation>, StatusCode> {
    let attraction = state
        .find_attraction(&id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;

    let days = query.days.unwrap_or(state.engine.horizon_days());
    if days == 0 || days > MAX_HORIZON_DAYS {
        return Err(StatusCode::BAD_REQUEST);
    }

    let recommendation = state
        .engine
        .recommend_for(&attraction, &Preferences::default(), days)
        .await
        .map_err(|err| {
            if err
                .downcast_ref::<RecommendError>()
                .is_some_and(RecommendError::is_contract_violation)
            {
                return StatusCode::BAD_REQUEST;
            }
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(attraction = %id, error = %format!("{err:#}"), "recommendation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ApiRecommendation {
        request_id: Uuid::new_v4(),
        attraction_id: attraction.id,
        source: recommendation.source,
        generated_at: recommendation.generated_at,
        set: recommendation.set,
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &wisata_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
