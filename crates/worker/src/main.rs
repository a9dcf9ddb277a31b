use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wisata_core::domain::attraction::{builtin_catalog, Attraction};
use wisata_core::domain::recommendation::Preferences;
use wisata_core::engine::RecommendationEngine;
use wisata_core::error::RecommendError;

#[derive(Debug, Parser)]
#[command(name = "wisata_worker")]
struct Args {
    /// Attraction id to compute (see the built-in catalog).
    #[arg(long)]
    attraction: Option<String>,

    /// Compute recommendations for every attraction in the catalog.
    #[arg(long)]
    all: bool,

    /// Forecast horizon in days.
    #[arg(long, default_value_t = 7)]
    days: u32,

    /// Skip the oracle and use the deterministic scorer only.
    #[arg(long)]
    offline: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

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

    let args = Args::parse();

    let catalog = builtin_catalog();
    let targets: Vec<Attraction> = if args.all {
        catalog
    } else if let Some(id) = &args.attraction {
        let attraction = catalog
            .into_iter()
            .find(|a| &a.id == id)
            .with_context(|| format!("unknown attraction id: {id}"))?;
        vec![attraction]
    } else {
        anyhow::bail!("pass --attraction <id> or --all");
    };

    let mut engine = RecommendationEngine::from_settings(&settings);
    if args.offline {
        engine = engine.without_oracle();
    }

    let preferences = Preferences::default();
    let mut contract_violations = 0usize;

    for attraction in &targets {
        let started = std::time::Instant::now();
        match engine
            .recommend_for(attraction, &preferences, args.days)
            .await
        {
            Ok(recommendation) => {
                let json = if args.pretty {
                    serde_json::to_string_pretty(&recommendation)?
                } else {
                    serde_json::to_string(&recommendation)?
                };
                println!("{json}");
                tracing::info!(
                    attraction = %attraction.id,
                    source = %recommendation.source,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "recommendation emitted"
                );
            }
            Err(err) => {
                sentry_anyhow::capture_anyhow(&err);
                if err
                    .downcast_ref::<RecommendError>()
                    .is_some_and(RecommendError::is_contract_violation)
                {
                    contract_violations += 1;
                }
                tracing::error!(
                    attraction = %attraction.id,
                    error = %format!("{err:#}"),
                    "recommendation run failed"
                );
            }
        }
    }

    anyhow::ensure!(
        contract_violations == 0,
        "{contract_violations} attraction(s) failed with contract violations"
    );
    Ok(())
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
