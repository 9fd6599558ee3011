//! Orchestration: the fallback chain behind the insights endpoints.
//!
//! A chain is an ordered list of `InsightsStrategy` values; the first one that
//! finds data wins. Two chains are assembled from the same strategies:
//!
//! - trending: cache → upstream
//! - upstream-first: upstream → (trending chain, reported as `fallback`)
//!
//! When every strategy comes up empty the caller still gets a well-formed,
//! all-empty result tagged `none` with the last explanatory message.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::MarketCache;
use crate::jobs_client::{DatePosted, JobSearch, JobSource, UpstreamError};
use crate::market::aggregator::aggregate;
use crate::market::countries::{canonical_country, country_location_id};
use crate::market::enrich::Enricher;
use crate::market::text::normalize_keyword;
use crate::models::market::{EnrichedJobPosting, MarketInsightsResult};

pub const DEFAULT_COUNTRY: &str = "United States";
pub const DEFAULT_LIMIT: usize = 10;

/// Used as the keyword list when the caller supplies none.
pub const POPULAR_TECH_KEYWORDS: &[&str] = &[
    "software engineer",
    "frontend developer",
    "backend developer",
    "full stack developer",
    "data scientist",
    "machine learning engineer",
    "devops engineer",
    "cloud engineer",
    "mobile developer",
    "web developer",
    "python developer",
    "javascript developer",
    "react developer",
    "node.js developer",
    "java developer",
    "golang developer",
    "rust developer",
    "blockchain developer",
    "ai engineer",
    "cybersecurity engineer",
];

const EMPTY_UPSTREAM_MESSAGE: &str =
    "Rate limited by the listings API or no jobs found. Please try again in a few minutes.";
const NOT_CONFIGURED_MESSAGE: &str = "Listings API key not configured and no cached data available";

// ────────────────────────────────────────────────────────────────────────────
// Query & outcome types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightsSource {
    Cache,
    Api,
    Fallback,
    None,
}

/// Caller-supplied query before scoping.
#[derive(Debug, Clone, Default)]
pub struct InsightsQuery {
    pub countries: Vec<String>,
    pub keywords: Vec<String>,
    pub limit: Option<usize>,
}

/// A query after defaults and per-request caps were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedQuery {
    pub countries: Vec<String>,
    pub keywords: Vec<String>,
    pub limit: usize,
}

impl ScopedQuery {
    /// Cache identity of the whole scope. For the usual single pair this is
    /// just (country, keyword).
    fn cache_identity(&self) -> (String, String) {
        (self.countries.join(","), self.keywords.join(","))
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.countries.iter().flat_map(move |country| {
            self.keywords
                .iter()
                .map(move |keyword| (country.as_str(), keyword.as_str()))
        })
    }
}

/// What one strategy produced.
#[derive(Debug)]
pub enum SourceOutcome {
    Found(MarketInsightsResult),
    /// Nothing to report; the chain moves on.
    Empty(String),
    /// Recoverable failure; the chain moves on.
    Failed(String),
    /// Configuration problem; the chain stops.
    Fatal(String),
}

/// Final answer handed to the HTTP layer.
#[derive(Debug, Clone)]
pub struct InsightsOutcome {
    pub result: MarketInsightsResult,
    pub source: InsightsSource,
    pub message: Option<String>,
    pub countries: Vec<String>,
    pub keywords: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub request_delay: Duration,
    pub rate_limit_backoff: Duration,
    pub max_countries: usize,
    pub max_keywords: usize,
    pub max_jobs_per_fetch: usize,
}

/// Collaborators every strategy draws on.
pub struct InsightsPipeline {
    pub cache: MarketCache,
    pub jobs: Arc<dyn JobSource>,
    pub enricher: Arc<Enricher>,
    pub settings: PipelineSettings,
}

impl InsightsPipeline {
    /// Applies defaults, truncates to the configured number of countries and
    /// keywords, and caps the per-fetch limit.
    pub fn scope(&self, query: &InsightsQuery) -> ScopedQuery {
        // Canonical forms, so case variants share a cache entry, a result
        // label and the stored job rows.
        let clean = |values: &[String], canonical: fn(&str) -> String| -> Vec<String> {
            let mut out: Vec<String> = Vec::new();
            for value in values.iter().filter(|v| !v.trim().is_empty()) {
                let value = canonical(value);
                if !out.contains(&value) {
                    out.push(value);
                }
            }
            out
        };

        let mut countries = clean(&query.countries, canonical_country);
        if countries.is_empty() {
            countries.push(DEFAULT_COUNTRY.to_string());
        }
        countries.truncate(self.settings.max_countries.max(1));

        let mut keywords = clean(&query.keywords, normalize_keyword);
        if keywords.is_empty() {
            keywords = POPULAR_TECH_KEYWORDS.iter().take(3).map(|k| k.to_string()).collect();
        }
        keywords.truncate(self.settings.max_keywords.max(1));

        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, self.settings.max_jobs_per_fetch.max(1));

        ScopedQuery {
            countries,
            keywords,
            limit,
        }
    }

    /// Fetches and enriches every (country, keyword) pair in order, sleeping
    /// between pairs. Rate-limited pairs are abandoned after the backoff.
    async fn fetch_scope(&self, scope: &ScopedQuery) -> Result<FetchReport, UpstreamError> {
        let mut report = FetchReport::default();
        let pairs: Vec<(&str, &str)> = scope.pairs().collect();

        for (i, &(country, keyword)) in pairs.iter().enumerate() {
            if i > 0 && !self.settings.request_delay.is_zero() {
                tokio::time::sleep(self.settings.request_delay).await;
            }

            let search = JobSearch {
                keyword: keyword.to_string(),
                location_id: country_location_id(country).to_string(),
                date_posted: DatePosted::Month,
                limit: scope.limit,
            };

            info!("Fetching jobs for {country} - {keyword}");
            match self.jobs.search(&search).await {
                Ok(postings) => {
                    info!("Fetched {} jobs for {country} - {keyword}", postings.len());
                    report
                        .jobs
                        .extend(self.enricher.enrich_all(postings, keyword, Some(country)));
                }
                Err(e @ (UpstreamError::Auth { .. } | UpstreamError::NotConfigured)) => return Err(e),
                Err(UpstreamError::RateLimited { .. }) => {
                    warn!(
                        "Rate limited for {country} - {keyword}; waiting {:?} before moving on",
                        self.settings.rate_limit_backoff
                    );
                    tokio::time::sleep(self.settings.rate_limit_backoff).await;
                    report.rate_limited = true;
                }
                Err(e) => {
                    warn!("Error fetching jobs for {country} - {keyword}: {e}");
                    report.last_error = Some(e.to_string());
                }
            }
        }

        Ok(report)
    }

    /// Write-back failures are logged and swallowed: the fresh result is
    /// still returned to the caller.
    async fn write_back(&self, scope: &ScopedQuery, result: &MarketInsightsResult, jobs: &[EnrichedJobPosting]) {
        let (country, keyword) = scope.cache_identity();
        if let Err(e) = self.cache.save_insights(&country, &keyword, result).await {
            warn!("Failed to cache insights for {country} - {keyword}: {e}");
        }
        if let Err(e) = self.cache.save_job_postings(jobs).await {
            warn!("Failed to cache job postings for {country} - {keyword}: {e}");
        }
    }
}

#[derive(Debug, Default)]
struct FetchReport {
    jobs: Vec<EnrichedJobPosting>,
    rate_limited: bool,
    last_error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Strategies
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait InsightsStrategy: Send + Sync {
    fn source(&self) -> InsightsSource;

    async fn attempt(&self, scope: &ScopedQuery) -> SourceOutcome;
}

/// Serves a non-expired cached result. Read failures count as a miss.
pub struct CachedInsights {
    pipeline: Arc<InsightsPipeline>,
}

#[async_trait]
impl InsightsStrategy for CachedInsights {
    fn source(&self) -> InsightsSource {
        InsightsSource::Cache
    }

    async fn attempt(&self, scope: &ScopedQuery) -> SourceOutcome {
        let (country, keyword) = scope.cache_identity();
        match self.pipeline.cache.get_insights(&country, &keyword).await {
            Ok(Some(result)) => {
                info!("Serving cached insights for {country} - {keyword}");
                SourceOutcome::Found(result)
            }
            Ok(None) => SourceOutcome::Empty(format!("No cached insights for {country} - {keyword}")),
            Err(e) => {
                warn!("Cache read failed for {country} - {keyword}: {e}");
                SourceOutcome::Failed(format!("Cache unavailable: {e}"))
            }
        }
    }
}

/// Fetches from the listings API, enriches, aggregates and writes back.
/// Empty results are never cached.
pub struct UpstreamInsights {
    pipeline: Arc<InsightsPipeline>,
}

#[async_trait]
impl InsightsStrategy for UpstreamInsights {
    fn source(&self) -> InsightsSource {
        InsightsSource::Api
    }

    async fn attempt(&self, scope: &ScopedQuery) -> SourceOutcome {
        if !self.pipeline.jobs.is_configured() {
            warn!("Listings API key not configured; skipping upstream fetch");
            return SourceOutcome::Failed(NOT_CONFIGURED_MESSAGE.to_string());
        }

        let report = match self.pipeline.fetch_scope(scope).await {
            Ok(report) => report,
            Err(e @ UpstreamError::Auth { .. }) => {
                error!("Listings API rejected the configured key: {e}");
                return SourceOutcome::Fatal(
                    "Listings API authentication failed. Please check the configured API key.".to_string(),
                );
            }
            Err(e) => {
                warn!("Upstream fetch failed: {e}");
                return SourceOutcome::Failed(e.to_string());
            }
        };

        if report.jobs.is_empty() {
            return match report.last_error {
                Some(message) if !report.rate_limited => SourceOutcome::Failed(message),
                _ => SourceOutcome::Empty(EMPTY_UPSTREAM_MESSAGE.to_string()),
            };
        }

        let result = aggregate(&report.jobs, &scope.countries);
        self.pipeline.write_back(scope, &result, &report.jobs).await;
        SourceOutcome::Found(result)
    }
}

/// Runs a whole inner chain as a single step.
pub struct ChainFallback {
    inner: FallbackChain,
}

#[async_trait]
impl InsightsStrategy for ChainFallback {
    fn source(&self) -> InsightsSource {
        InsightsSource::Fallback
    }

    async fn attempt(&self, scope: &ScopedQuery) -> SourceOutcome {
        info!("Falling back to the trending-skills chain");
        let outcome = self.inner.run_scoped(scope).await;
        match outcome.source {
            InsightsSource::None => {
                SourceOutcome::Empty(outcome.message.unwrap_or_else(|| "No data available".to_string()))
            }
            _ => SourceOutcome::Found(outcome.result),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Chain
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct FallbackChain {
    strategies: Vec<Arc<dyn InsightsStrategy>>,
}

impl FallbackChain {
    pub fn new(strategies: Vec<Arc<dyn InsightsStrategy>>) -> Self {
        Self { strategies }
    }

    /// Tries each strategy in order; the first `Found` wins.
    pub async fn run_scoped(&self, scope: &ScopedQuery) -> InsightsOutcome {
        let mut message = None;

        for strategy in &self.strategies {
            match strategy.attempt(scope).await {
                SourceOutcome::Found(result) => {
                    return InsightsOutcome {
                        result,
                        source: strategy.source(),
                        message: None,
                        countries: scope.countries.clone(),
                        keywords: scope.keywords.clone(),
                    };
                }
                SourceOutcome::Empty(m) | SourceOutcome::Failed(m) => message = Some(m),
                SourceOutcome::Fatal(m) => {
                    message = Some(m);
                    break;
                }
            }
        }

        InsightsOutcome {
            result: MarketInsightsResult::empty(),
            source: InsightsSource::None,
            message: message.or_else(|| Some("No data available from any source".to_string())),
            countries: scope.countries.clone(),
            keywords: scope.keywords.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

/// Raw search results enriched per job and grouped by resolved country.
#[derive(Debug, Clone)]
pub struct JobSearchOutcome {
    pub jobs: Vec<EnrichedJobPosting>,
    pub insights: MarketInsightsResult,
}

pub struct MarketInsightsService {
    pipeline: Arc<InsightsPipeline>,
    trending: FallbackChain,
    upstream_first: FallbackChain,
}

impl MarketInsightsService {
    pub fn new(pipeline: InsightsPipeline) -> Self {
        let pipeline = Arc::new(pipeline);
        let cached: Arc<dyn InsightsStrategy> = Arc::new(CachedInsights {
            pipeline: pipeline.clone(),
        });
        let upstream: Arc<dyn InsightsStrategy> = Arc::new(UpstreamInsights {
            pipeline: pipeline.clone(),
        });

        let trending = FallbackChain::new(vec![cached, upstream.clone()]);
        let upstream_first = FallbackChain::new(vec![
            upstream,
            Arc::new(ChainFallback {
                inner: trending.clone(),
            }),
        ]);

        Self {
            pipeline,
            trending,
            upstream_first,
        }
    }

    pub fn cache(&self) -> &MarketCache {
        &self.pipeline.cache
    }

    pub fn upstream_configured(&self) -> bool {
        self.pipeline.jobs.is_configured()
    }

    pub fn matcher_name(&self) -> &'static str {
        self.pipeline.enricher.matcher_name()
    }

    pub fn scope(&self, query: &InsightsQuery) -> ScopedQuery {
        self.pipeline.scope(query)
    }

    /// Cache first, then the listings API.
    pub async fn trending_skills(&self, query: &InsightsQuery) -> InsightsOutcome {
        self.trending.run_scoped(&self.scope(query)).await
    }

    /// Listings API first, then the trending chain as a fallback.
    pub async fn upstream_first(&self, query: &InsightsQuery) -> InsightsOutcome {
        self.upstream_first.run_scoped(&self.scope(query)).await
    }

    /// One raw search; each job's country is resolved from its own location.
    pub async fn search_jobs(&self, search: &JobSearch) -> Result<JobSearchOutcome, UpstreamError> {
        let postings = self.pipeline.jobs.search(search).await?;
        let jobs = self.pipeline.enricher.enrich_all(postings, &search.keyword, None);

        let mut countries: Vec<String> = Vec::new();
        for job in &jobs {
            if !countries.contains(&job.country) {
                countries.push(job.country.clone());
            }
        }

        let insights = aggregate(&jobs, &countries);
        Ok(JobSearchOutcome { jobs, insights })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::cache::memory::MemoryCacheStore;
    use crate::market::extractor::{SkillExtractor, SubstringMatcher};
    use crate::market::taxonomy::SkillTaxonomy;
    use crate::models::market::JobPosting;

    /// Scripted `JobSource`: pops one response per call, counting calls.
    struct FakeJobSource {
        configured: bool,
        responses: Mutex<Vec<Result<Vec<JobPosting>, UpstreamError>>>,
        calls: AtomicUsize,
    }

    impl FakeJobSource {
        fn new(responses: Vec<Result<Vec<JobPosting>, UpstreamError>>) -> Self {
            Self {
                configured: true,
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::new(Vec::new())
            }
        }
    }

    #[async_trait]
    impl JobSource for FakeJobSource {
        async fn search(&self, _query: &JobSearch) -> Result<Vec<JobPosting>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(Vec::new())
            } else {
                responses.remove(0)
            }
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }

    fn backend_job(id: &str) -> JobPosting {
        JobPosting {
            job_id: id.to_string(),
            title: "Backend Developer".to_string(),
            company: "Acme".to_string(),
            location: "Berlin, Germany".to_string(),
            description: "Looking for experience with Node.js, PostgreSQL, and Docker.".to_string(),
            posted_date: None,
            salary: None,
            experience_level: None,
            job_type: None,
        }
    }

    fn service(source: Arc<FakeJobSource>, store: Arc<MemoryCacheStore>) -> MarketInsightsService {
        service_with(
            source,
            store,
            PipelineSettings {
                request_delay: Duration::ZERO,
                rate_limit_backoff: Duration::ZERO,
                max_countries: 1,
                max_keywords: 1,
                max_jobs_per_fetch: 10,
            },
        )
    }

    fn service_with(
        source: Arc<FakeJobSource>,
        store: Arc<MemoryCacheStore>,
        settings: PipelineSettings,
    ) -> MarketInsightsService {
        let extractor = SkillExtractor::new(Arc::new(SkillTaxonomy::default()), Box::new(SubstringMatcher));
        MarketInsightsService::new(InsightsPipeline {
            cache: MarketCache::new(store, chrono::Duration::hours(24), chrono::Duration::days(7)),
            jobs: source,
            enricher: Arc::new(Enricher::with_rng(extractor, StdRng::seed_from_u64(3))),
            settings,
        })
    }

    fn paced_settings(max_countries: usize) -> PipelineSettings {
        PipelineSettings {
            request_delay: Duration::from_secs(5),
            rate_limit_backoff: Duration::from_secs(10),
            max_countries,
            max_keywords: 1,
            max_jobs_per_fetch: 10,
        }
    }

    fn single_query(country: &str, keyword: &str) -> InsightsQuery {
        InsightsQuery {
            countries: vec![country.to_string()],
            keywords: vec![keyword.to_string()],
            limit: None,
        }
    }

    fn germany_query() -> InsightsQuery {
        InsightsQuery {
            countries: vec!["Germany".to_string(), "France".to_string()],
            keywords: vec!["backend developer".to_string(), "rust".to_string()],
            limit: Some(50),
        }
    }

    #[test]
    fn test_scope_applies_defaults_and_caps() {
        let svc = service(Arc::new(FakeJobSource::new(Vec::new())), Arc::new(MemoryCacheStore::default()));

        let scoped = svc.scope(&germany_query());
        assert_eq!(scoped.countries, vec!["Germany"]);
        assert_eq!(scoped.keywords, vec!["backend developer"]);
        assert_eq!(scoped.limit, 10);

        let defaults = svc.scope(&InsightsQuery::default());
        assert_eq!(defaults.countries, vec![DEFAULT_COUNTRY]);
        assert_eq!(defaults.keywords, vec!["software engineer"]);
        assert_eq!(defaults.limit, DEFAULT_LIMIT);
    }

    #[tokio::test]
    async fn test_upstream_result_is_cached_then_served_from_cache() {
        let source = Arc::new(FakeJobSource::new(vec![Ok(vec![backend_job("1"), backend_job("2")])]));
        let store = Arc::new(MemoryCacheStore::default());
        let svc = service(source.clone(), store);

        let first = svc.trending_skills(&germany_query()).await;
        assert_eq!(first.source, InsightsSource::Api);
        assert_eq!(first.result.summary.total_jobs, 2);
        assert_eq!(first.result.country_insights["Germany"].total_jobs, 2);

        let second = svc.trending_skills(&germany_query()).await;
        assert_eq!(second.source, InsightsSource::Cache);
        assert_eq!(second.result, first.result);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let postings = svc.cache().get_job_postings("Germany", "backend developer", 10).await.unwrap();
        assert_eq!(postings.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_upstream_returns_empty_shape_and_is_not_cached() {
        let source = Arc::new(FakeJobSource::new(vec![Ok(Vec::new())]));
        let svc = service(source, Arc::new(MemoryCacheStore::default()));

        let outcome = svc.trending_skills(&germany_query()).await;
        assert_eq!(outcome.source, InsightsSource::None);
        assert_eq!(outcome.result.summary.total_jobs, 0);
        assert_eq!(outcome.message.as_deref(), Some(EMPTY_UPSTREAM_MESSAGE));
        assert!(!svc.cache().has_recent_insights("Germany", "backend developer").await.unwrap());
    }

    #[tokio::test]
    async fn test_rate_limit_abandons_the_pair() {
        let source = Arc::new(FakeJobSource::new(vec![Err(UpstreamError::RateLimited {
            status: 429,
            body: "slow down".to_string(),
        })]));
        let svc = service(source.clone(), Arc::new(MemoryCacheStore::default()));

        let outcome = svc.trending_skills(&germany_query()).await;
        assert_eq!(outcome.source, InsightsSource::None);
        assert_eq!(outcome.message.as_deref(), Some(EMPTY_UPSTREAM_MESSAGE));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_upstream_reports_message() {
        let svc = service(Arc::new(FakeJobSource::unconfigured()), Arc::new(MemoryCacheStore::default()));

        let outcome = svc.trending_skills(&germany_query()).await;
        assert_eq!(outcome.source, InsightsSource::None);
        assert_eq!(outcome.message.as_deref(), Some(NOT_CONFIGURED_MESSAGE));
        assert!(!svc.upstream_configured());
    }

    #[tokio::test]
    async fn test_upstream_first_falls_back_to_cache() {
        let source = Arc::new(FakeJobSource::new(vec![Err(UpstreamError::Api {
            status: 500,
            body: "boom".to_string(),
        })]));
        let store = Arc::new(MemoryCacheStore::default());
        let svc = service(source, store);

        let mut cached = MarketInsightsResult::empty();
        cached.summary.total_jobs = 7;
        svc.cache().save_insights("Germany", "backend developer", &cached).await.unwrap();

        let outcome = svc.upstream_first(&germany_query()).await;
        assert_eq!(outcome.source, InsightsSource::Fallback);
        assert_eq!(outcome.result.summary.total_jobs, 7);
    }

    #[tokio::test]
    async fn test_upstream_first_prefers_fresh_data() {
        let source = Arc::new(FakeJobSource::new(vec![Ok(vec![backend_job("1")])]));
        let svc = service(source, Arc::new(MemoryCacheStore::default()));

        let mut stale = MarketInsightsResult::empty();
        stale.summary.total_jobs = 99;
        svc.cache().save_insights("Germany", "backend developer", &stale).await.unwrap();

        let outcome = svc.upstream_first(&germany_query()).await;
        assert_eq!(outcome.source, InsightsSource::Api);
        assert_eq!(outcome.result.summary.total_jobs, 1);
    }

    #[tokio::test]
    async fn test_auth_error_stops_the_chain() {
        let source = Arc::new(FakeJobSource::new(vec![
            Err(UpstreamError::Auth {
                status: 403,
                body: "bad key".to_string(),
            }),
            Ok(vec![backend_job("1")]),
        ]));
        let svc = service(source.clone(), Arc::new(MemoryCacheStore::default()));

        let outcome = svc.upstream_first(&germany_query()).await;
        assert_eq!(outcome.source, InsightsSource::None);
        assert_eq!(outcome.result.summary.total_jobs, 0);
        assert!(outcome.message.unwrap().contains("authentication"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_case_variants_share_cache_labels_and_rows() {
        let source = Arc::new(FakeJobSource::new(vec![Ok(vec![backend_job("1")])]));
        let svc = service(source.clone(), Arc::new(MemoryCacheStore::default()));

        let first = svc.trending_skills(&single_query("germany", "Backend  Developer")).await;
        assert_eq!(first.source, InsightsSource::Api);
        assert_eq!(first.countries, vec!["Germany"]);
        assert_eq!(first.keywords, vec!["backend developer"]);
        assert!(first.result.country_insights.contains_key("Germany"));

        let second = svc.trending_skills(&single_query("Germany", "backend developer")).await;
        assert_eq!(second.source, InsightsSource::Cache);
        assert_eq!(second.countries, vec!["Germany"]);
        assert!(second.result.country_insights.contains_key("Germany"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let rows = svc.cache().get_job_postings("Germany", "backend developer", 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country, "Germany");
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_pair_scope_waits_between_pairs_and_skips_rate_limited_pair() {
        let source = Arc::new(FakeJobSource::new(vec![
            Ok(vec![backend_job("1"), backend_job("2")]),
            Err(UpstreamError::RateLimited {
                status: 429,
                body: "slow down".to_string(),
            }),
        ]));
        let svc = service_with(source.clone(), Arc::new(MemoryCacheStore::default()), paced_settings(2));

        let started = tokio::time::Instant::now();
        let outcome = svc.trending_skills(&germany_query()).await;
        let elapsed = started.elapsed();

        // 5s between the two pairs, then 10s of backoff after the 429.
        assert!(elapsed >= Duration::from_secs(15), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(16), "elapsed {elapsed:?}");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        assert_eq!(outcome.source, InsightsSource::Api);
        assert_eq!(outcome.countries, vec!["Germany", "France"]);
        assert_eq!(outcome.result.country_insights["Germany"].total_jobs, 2);
        assert_eq!(outcome.result.country_insights["France"].total_jobs, 0);
        assert_eq!(outcome.result.summary.countries_analyzed, 2);

        let cached = svc
            .cache()
            .get_insights("Germany,France", "backend developer")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached, outcome.result);
        assert!(svc.cache().get_insights("Germany", "backend developer").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_pair_never_waits() {
        let source = Arc::new(FakeJobSource::new(vec![Ok(vec![backend_job("1")])]));
        let svc = service_with(source, Arc::new(MemoryCacheStore::default()), paced_settings(1));

        let started = tokio::time::Instant::now();
        let outcome = svc.trending_skills(&germany_query()).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(outcome.source, InsightsSource::Api);
    }

    #[tokio::test]
    async fn test_search_jobs_groups_by_resolved_country() {
        let mut paris = backend_job("2");
        paris.location = "Paris, France".to_string();
        let source = Arc::new(FakeJobSource::new(vec![Ok(vec![backend_job("1"), paris])]));
        let svc = service(source, Arc::new(MemoryCacheStore::default()));

        let outcome = svc
            .search_jobs(&JobSearch {
                keyword: "backend developer".to_string(),
                location_id: "92000000".to_string(),
                date_posted: DatePosted::Any,
                limit: 10,
            })
            .await
            .unwrap();

        assert_eq!(outcome.jobs.len(), 2);
        assert_eq!(outcome.insights.country_insights["Germany"].total_jobs, 1);
        assert_eq!(outcome.insights.country_insights["France"].total_jobs, 1);
        assert_eq!(outcome.insights.summary.countries_analyzed, 2);
    }
}
