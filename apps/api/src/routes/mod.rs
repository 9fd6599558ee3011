pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::market::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Market Insights API
        .route(
            "/api/v1/market-insights/trending-skills",
            get(handlers::handle_trending_skills),
        )
        .route(
            "/api/v1/market-insights/upstream-first",
            get(handlers::handle_upstream_first),
        )
        .route("/api/v1/market-insights/jobs", get(handlers::handle_search_jobs))
        .route(
            "/api/v1/market-insights/job-details",
            get(handlers::handle_job_details),
        )
        .route(
            "/api/v1/market-insights/cache",
            delete(handlers::handle_clear_cache),
        )
        .route(
            "/api/v1/market-insights/cache/cleanup",
            post(handlers::handle_cleanup_cache),
        )
        .route(
            "/api/v1/market-insights/config-status",
            get(handlers::handle_config_status),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::cache::memory::MemoryCacheStore;
    use crate::cache::MarketCache;
    use crate::config::Config;
    use crate::jobs_client::JobsApiClient;
    use crate::market::enrich::Enricher;
    use crate::market::extractor::{SkillExtractor, SubstringMatcher};
    use crate::market::orchestrator::{InsightsPipeline, MarketInsightsService, PipelineSettings};
    use crate::market::taxonomy::SkillTaxonomy;

    /// Router over an in-memory cache and a client without a key, so no test reaches the network.
    fn test_router() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let jobs = JobsApiClient::with_base_url(None, &config.rapidapi_host, "http://127.0.0.1:9", 1).unwrap();
        let extractor = SkillExtractor::new(Arc::new(SkillTaxonomy::default()), Box::new(SubstringMatcher));
        let service = MarketInsightsService::new(InsightsPipeline {
            cache: MarketCache::new(
                Arc::new(MemoryCacheStore::default()),
                chrono::Duration::hours(24),
                chrono::Duration::days(7),
            ),
            jobs: Arc::new(jobs),
            enricher: Arc::new(Enricher::with_rng(extractor, StdRng::seed_from_u64(1))),
            settings: PipelineSettings {
                request_delay: Duration::ZERO,
                rate_limit_backoff: Duration::ZERO,
                max_countries: 1,
                max_keywords: 1,
                max_jobs_per_fetch: 10,
            },
        });

        build_router(AppState {
            config,
            insights: Arc::new(service),
        })
    }

    async fn call(method: Method, uri: &str) -> (StatusCode, Value) {
        let response = test_router()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "portfolio-insights");
    }

    #[tokio::test]
    async fn test_trending_skills_without_key_returns_empty_envelope() {
        let (status, body) = call(
            Method::GET,
            "/api/v1/market-insights/trending-skills?countries=Germany&keywords=rust",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["metadata"]["source"], "none");
        assert_eq!(body["metadata"]["countries"][0], "Germany");
        assert_eq!(body["data"]["summary"]["totalJobs"], 0);
        assert!(body["metadata"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_limit_is_rejected() {
        let (status, body) = call(Method::GET, "/api/v1/market-insights/trending-skills?limit=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_job_search_without_key_is_unavailable() {
        let (status, body) = call(Method::GET, "/api/v1/market-insights/jobs?keywords=rust").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "UPSTREAM_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_job_details_on_empty_cache() {
        let (status, body) = call(Method::GET, "/api/v1/market-insights/job-details").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalJobs"], 0);
        assert_eq!(body["metadata"]["source"], "cache");
    }

    #[tokio::test]
    async fn test_cache_maintenance_routes() {
        let (status, body) = call(Method::DELETE, "/api/v1/market-insights/cache").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"]["insights"], 0);

        let (status, body) = call(Method::POST, "/api/v1/market-insights/cache/cleanup").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_config_status_reports_without_secrets() {
        let (status, body) = call(Method::GET, "/api/v1/market-insights/config-status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["upstreamConfigured"], false);
        assert_eq!(body["cacheBackend"], "memory");
        assert_eq!(body["skillMatcher"], "substring");
        assert!(body.get("rapidapiKey").is_none());
    }
}
