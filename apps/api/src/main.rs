mod cache;
mod config;
mod db;
mod errors;
mod jobs_client;
mod market;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::memory::MemoryCacheStore;
use crate::cache::postgres::PgCacheStore;
use crate::cache::{CacheStore, MarketCache};
use crate::config::Config;
use crate::db::create_pool;
use crate::jobs_client::{JobSource, JobsApiClient};
use crate::market::enrich::Enricher;
use crate::market::extractor::{matcher_from_name, SkillExtractor};
use crate::market::orchestrator::{InsightsPipeline, MarketInsightsService, PipelineSettings};
use crate::market::taxonomy::SkillTaxonomy;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portfolio Insights API v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {config:?}");

    // Cache store: Postgres when configured, otherwise in-process
    let store: Arc<dyn CacheStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("Postgres cache store initialized");
            Arc::new(PgCacheStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory cache (contents are lost on restart)");
            Arc::new(MemoryCacheStore::default())
        }
    };
    let cache = MarketCache::new(store, config.insights_ttl()?, config.job_retention()?);

    // Initialize listings client
    let jobs = JobsApiClient::with_base_url(
        config.rapidapi_key.clone(),
        &config.rapidapi_host,
        &config.jobs_api_base_url,
        config.upstream_timeout_secs,
    )?;
    if jobs.is_configured() {
        info!("Listings client initialized (host: {})", config.rapidapi_host);
    } else {
        warn!("RAPIDAPI_KEY not set; insights will be served from cache only");
    }

    // Initialize skill extraction
    let taxonomy = Arc::new(SkillTaxonomy::default());
    let extractor = SkillExtractor::new(taxonomy.clone(), matcher_from_name(&config.skill_matcher));
    info!(
        "Skill taxonomy loaded: {} skills (matcher: {})",
        taxonomy.len(),
        extractor.matcher_name()
    );

    let insights = MarketInsightsService::new(InsightsPipeline {
        cache,
        jobs: Arc::new(jobs),
        enricher: Arc::new(Enricher::new(extractor)),
        settings: PipelineSettings {
            request_delay: Duration::from_secs(config.request_delay_secs),
            rate_limit_backoff: Duration::from_secs(config.rate_limit_backoff_secs),
            max_countries: config.max_countries_per_request,
            max_keywords: config.max_keywords_per_request,
            max_jobs_per_fetch: config.max_jobs_per_fetch,
        },
    });

    // Build app state
    let state = AppState {
        config: config.clone(),
        insights: Arc::new(insights),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the portfolio frontend

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
