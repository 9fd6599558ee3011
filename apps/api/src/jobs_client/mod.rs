/// Jobs Client: the single point of entry for the upstream listings API.
///
/// No other module talks to the listings API directly. Everything above this
/// layer depends on the `JobSource` trait so tests can substitute a fake.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::market::countries::location_id_to_name;
use crate::models::market::JobPosting;

pub mod normalize;
pub mod templates;

pub const DEFAULT_BASE_URL: &str = "https://jobs-api14.p.rapidapi.com";
pub const DEFAULT_HOST: &str = "jobs-api14.p.rapidapi.com";
const SEARCH_PATH: &str = "v2/linkedin/search";

// Fixed filters: every experience level, workplace type and employment type.
const EXPERIENCE_LEVELS: &str = "intern;entry;associate;midSenior;director";
const WORKPLACE_TYPES: &str = "remote;hybrid;onSite";
const EMPLOYMENT_TYPES: &str = "contractor;fulltime;parttime;intern;temporary";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("listings API key is not configured")]
    NotConfigured,

    #[error("listings API authentication failed (status {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("listings API rate limit exceeded (status {status}): {body}")]
    RateLimited { status: u16, body: String },

    #[error("listings API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid listings API base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Date-posted filter accepted by the listings API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePosted {
    Any,
    Day,
    Week,
    #[default]
    Month,
}

impl DatePosted {
    /// Maps the browser-facing filter names; anything unrecognized is `Month`.
    pub fn from_param(value: &str) -> Self {
        match value {
            "anyTime" => DatePosted::Any,
            "past24h" => DatePosted::Day,
            "pastWeek" => DatePosted::Week,
            _ => DatePosted::Month,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DatePosted::Any => "any",
            DatePosted::Day => "day",
            DatePosted::Week => "week",
            DatePosted::Month => "month",
        }
    }
}

/// One upstream search.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSearch {
    pub keyword: String,
    pub location_id: String,
    pub date_posted: DatePosted,
    pub limit: usize,
}

/// Source of raw job postings.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn search(&self, query: &JobSearch) -> Result<Vec<JobPosting>, UpstreamError>;

    /// False when the source cannot be called at all (e.g. missing key).
    fn is_configured(&self) -> bool;
}

/// Listings API client. Use [`JobsApiClient::with_base_url`] to point at a
/// mock server in tests.
#[derive(Clone)]
pub struct JobsApiClient {
    client: Client,
    api_key: Option<String>,
    host: String,
    base_url: Url,
}

impl JobsApiClient {
    pub fn with_base_url(
        api_key: Option<String>,
        host: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| UpstreamError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            host: host.to_string(),
            base_url,
        })
    }

    fn build_url(&self, query: &JobSearch) -> Result<Url, UpstreamError> {
        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .map_err(|_| UpstreamError::InvalidBaseUrl(self.base_url.to_string()))?;
        url.query_pairs_mut()
            .append_pair("query", &query.keyword)
            .append_pair("location", location_id_to_name(&query.location_id))
            .append_pair("datePosted", query.date_posted.as_str())
            .append_pair("experienceLevels", EXPERIENCE_LEVELS)
            .append_pair("workplaceTypes", WORKPLACE_TYPES)
            .append_pair("employmentTypes", EMPLOYMENT_TYPES);
        Ok(url)
    }
}

/// Maps a non-success status to the error the orchestration layer branches on.
fn classify_status(status: StatusCode, body: String) -> UpstreamError {
    let status = status.as_u16();
    match status {
        403 => UpstreamError::Auth { status, body },
        429 => UpstreamError::RateLimited { status, body },
        _ => UpstreamError::Api { status, body },
    }
}

#[async_trait]
impl JobSource for JobsApiClient {
    async fn search(&self, query: &JobSearch) -> Result<Vec<JobPosting>, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::NotConfigured)?;
        let url = self.build_url(query)?;

        let response = self
            .client
            .get(url.clone())
            .header("x-rapidapi-host", &self.host)
            .header("x-rapidapi-key", api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Listings API returned {}: {}", status, body);
            return Err(classify_status(status, body));
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).map_err(|e| UpstreamError::Deserialize {
            context: format!("search(query={})", query.keyword),
            source: e,
        })?;

        let jobs = normalize::normalize_response(&body, query.limit);
        debug!(
            "Listings API returned {} jobs for '{}' in {}",
            jobs.len(),
            query.keyword,
            location_id_to_name(&query.location_id)
        );
        Ok(jobs)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
