//! Axum route handlers for the Market Insights API.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::PurgeCounts;
use crate::errors::AppError;
use crate::jobs_client::{DatePosted, JobSearch};
use crate::market::countries::{canonical_country, WORLDWIDE_LOCATION_ID};
use crate::market::orchestrator::{
    InsightsOutcome, InsightsQuery, InsightsSource, DEFAULT_COUNTRY, DEFAULT_LIMIT,
};
use crate::market::salary::{describe_salary, SalaryDisplay};
use crate::market::text::normalize_keyword;
use crate::models::market::{EnrichedJobPosting, MarketInsightsResult};
use crate::state::AppState;

const DEFAULT_KEYWORD: &str = "software engineer";
const DEFAULT_DETAILS_LIMIT: usize = 20;
const MAX_DETAILS_LIMIT: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// `countries` and `keywords` are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct InsightsParams {
    pub countries: Option<String>,
    pub keywords: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchParams {
    pub keywords: Option<String>,
    pub location_id: Option<String>,
    pub date_posted: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobDetailsParams {
    pub country: Option<String>,
    pub keyword: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsMetadata {
    pub total_jobs: u32,
    pub countries: Vec<String>,
    pub keywords: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub source: InsightsSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InsightsEnvelope {
    pub success: bool,
    pub data: MarketInsightsResult,
    pub metadata: InsightsMetadata,
}

impl From<InsightsOutcome> for InsightsEnvelope {
    fn from(outcome: InsightsOutcome) -> Self {
        Self {
            success: true,
            metadata: InsightsMetadata {
                total_jobs: outcome.result.summary.total_jobs,
                countries: outcome.countries,
                keywords: outcome.keywords,
                generated_at: Utc::now(),
                source: outcome.source,
                message: outcome.message,
            },
            data: outcome.result,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEcho {
    pub keywords: String,
    pub location_id: String,
    pub date_posted: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchData {
    pub jobs: Vec<EnrichedJobPosting>,
    pub insights: MarketInsightsResult,
    pub total_jobs: usize,
    pub search_params: SearchEcho,
}

#[derive(Debug, Serialize)]
pub struct JobSearchResponse {
    pub success: bool,
    pub data: JobSearchData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary: SalaryDisplay,
    pub experience_level: String,
    pub job_type: String,
    pub skills: Vec<String>,
    pub posted_date: Option<String>,
    pub country: String,
    pub keyword: String,
}

impl JobDetail {
    fn from_posting(job: EnrichedJobPosting, country: &str) -> Self {
        let salary = describe_salary(job.posting.salary.as_ref(), country, &job.posting.title);
        Self {
            id: job.posting.job_id,
            title: job.posting.title,
            company: job.posting.company,
            location: job.posting.location,
            description: job.posting.description,
            salary,
            experience_level: job
                .posting
                .experience_level
                .unwrap_or_else(|| "Not specified".to_string()),
            job_type: job.posting.job_type.unwrap_or_else(|| "Not specified".to_string()),
            skills: job.skills,
            posted_date: job.posting.posted_date,
            country: job.country,
            keyword: job.keyword,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetailsData {
    pub jobs: Vec<JobDetail>,
    pub total_jobs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetailsMetadata {
    pub country: String,
    pub keyword: String,
    pub generated_at: DateTime<Utc>,
    pub source: InsightsSource,
}

#[derive(Debug, Serialize)]
pub struct JobDetailsResponse {
    pub success: bool,
    pub data: JobDetailsData,
    pub metadata: JobDetailsMetadata,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub success: bool,
    pub message: String,
    pub removed: PurgeCounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStatusResponse {
    pub success: bool,
    pub upstream_configured: bool,
    pub upstream_host: String,
    pub cache_backend: &'static str,
    pub skill_matcher: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Param helpers
// ────────────────────────────────────────────────────────────────────────────

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_limit(value: Option<&str>) -> Result<Option<usize>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("limit must be a non-negative integer, got '{v}'"))),
    }
}

/// Job-details page size: defaulted, then clamped to `1..=MAX_DETAILS_LIMIT`.
fn details_limit(value: Option<&str>) -> Result<usize, AppError> {
    Ok(parse_limit(value)?
        .unwrap_or(DEFAULT_DETAILS_LIMIT)
        .clamp(1, MAX_DETAILS_LIMIT))
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl InsightsParams {
    fn into_query(self) -> Result<InsightsQuery, AppError> {
        Ok(InsightsQuery {
            countries: split_list(self.countries.as_deref()),
            keywords: split_list(self.keywords.as_deref()),
            limit: parse_limit(self.limit.as_deref())?,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/market-insights/trending-skills
/// Cache first, then the listings API. Always answers with the envelope.
pub async fn handle_trending_skills(
    State(state): State<AppState>,
    Query(params): Query<InsightsParams>,
) -> Result<Json<InsightsEnvelope>, AppError> {
    let query = params.into_query()?;
    let outcome = state.insights.trending_skills(&query).await;
    Ok(Json(outcome.into()))
}

/// GET /api/v1/market-insights/upstream-first
/// Listings API first, then the trending-skills chain as a fallback.
pub async fn handle_upstream_first(
    State(state): State<AppState>,
    Query(params): Query<InsightsParams>,
) -> Result<Json<InsightsEnvelope>, AppError> {
    let query = params.into_query()?;
    let outcome = state.insights.upstream_first(&query).await;
    Ok(Json(outcome.into()))
}

/// GET /api/v1/market-insights/jobs
/// Raw listings search, enriched per job and grouped by resolved country.
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> Result<Json<JobSearchResponse>, AppError> {
    let limit = parse_limit(params.limit.as_deref())?
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, state.config.max_jobs_per_fetch.max(1));
    let date_posted = params
        .date_posted
        .as_deref()
        .map(DatePosted::from_param)
        .unwrap_or_default();

    let search = JobSearch {
        keyword: non_empty_or(params.keywords, DEFAULT_KEYWORD),
        location_id: non_empty_or(params.location_id, WORLDWIDE_LOCATION_ID),
        date_posted,
        limit,
    };

    let outcome = state.insights.search_jobs(&search).await?;

    Ok(Json(JobSearchResponse {
        success: true,
        data: JobSearchData {
            total_jobs: outcome.jobs.len(),
            jobs: outcome.jobs,
            insights: outcome.insights,
            search_params: SearchEcho {
                keywords: search.keyword,
                location_id: search.location_id,
                date_posted: search.date_posted.as_str(),
            },
        },
    }))
}

/// GET /api/v1/market-insights/job-details
/// Cached postings with a salary display. Cache read failures answer empty.
pub async fn handle_job_details(
    State(state): State<AppState>,
    Query(params): Query<JobDetailsParams>,
) -> Result<Json<JobDetailsResponse>, AppError> {
    let country = canonical_country(&non_empty_or(params.country, DEFAULT_COUNTRY));
    let keyword = normalize_keyword(&non_empty_or(params.keyword, DEFAULT_KEYWORD));
    let limit = details_limit(params.limit.as_deref())?;

    let postings = match state.insights.cache().get_job_postings(&country, &keyword, limit).await {
        Ok(postings) => postings,
        Err(e) => {
            warn!("Cache read failed for job details {country} - {keyword}: {e}");
            Vec::new()
        }
    };

    let jobs: Vec<JobDetail> = postings
        .into_iter()
        .map(|job| JobDetail::from_posting(job, &country))
        .collect();

    let message = jobs.is_empty().then(|| {
        "No job data available. This might be due to API rate limits or no jobs found for the selected criteria."
            .to_string()
    });

    Ok(Json(JobDetailsResponse {
        success: true,
        data: JobDetailsData {
            total_jobs: jobs.len(),
            jobs,
            message,
        },
        metadata: JobDetailsMetadata {
            country,
            keyword,
            generated_at: Utc::now(),
            source: InsightsSource::Cache,
        },
    }))
}

/// DELETE /api/v1/market-insights/cache
pub async fn handle_clear_cache(
    State(state): State<AppState>,
) -> Result<Json<MaintenanceResponse>, AppError> {
    let removed = state.insights.cache().clear_all().await?;
    Ok(Json(MaintenanceResponse {
        success: true,
        message: "Cache cleared successfully".to_string(),
        removed,
    }))
}

/// POST /api/v1/market-insights/cache/cleanup
pub async fn handle_cleanup_cache(
    State(state): State<AppState>,
) -> Result<Json<MaintenanceResponse>, AppError> {
    let removed = state.insights.cache().cleanup_expired().await?;
    Ok(Json(MaintenanceResponse {
        success: true,
        message: "Expired cache entries removed".to_string(),
        removed,
    }))
}

/// GET /api/v1/market-insights/config-status
/// Reports whether the listings key is set. Never echoes any part of it.
pub async fn handle_config_status(State(state): State<AppState>) -> Json<ConfigStatusResponse> {
    Json(ConfigStatusResponse {
        success: true,
        upstream_configured: state.insights.upstream_configured(),
        upstream_host: state.config.rapidapi_host.clone(),
        cache_backend: state.config.cache_backend(),
        skill_matcher: state.insights.matcher_name(),
    })
}
