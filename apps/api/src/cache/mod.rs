//! Cache Tier: aggregated insights keyed by (country, keyword) and the raw
//! postings behind them.
//!
//! `CacheStore` is the raw storage seam (Postgres in production, in-memory for
//! tests and database-less runs). `MarketCache` layers keys, expiry and
//! retention on top of any store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::market::{
    EnrichedJobPosting, InsightsCacheRow, JobPostingRow, MarketInsightsResult,
};

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raw storage operations. Implementations must upsert insights by
/// `cache_key` and job postings by `(job_id, country, keyword)`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_insights(&self, cache_key: &str) -> Result<Option<InsightsCacheRow>, CacheError>;

    async fn upsert_insights(&self, row: InsightsCacheRow) -> Result<(), CacheError>;

    /// Returns the number of rows removed.
    async fn delete_insights(&self, cache_key: &str) -> Result<u64, CacheError>;

    async fn upsert_job_postings(&self, rows: Vec<JobPostingRow>) -> Result<(), CacheError>;

    /// Newest first.
    async fn job_postings(
        &self,
        country: &str,
        keyword: &str,
        limit: i64,
    ) -> Result<Vec<JobPostingRow>, CacheError>;

    async fn delete_insights_expired_before(&self, now: DateTime<Utc>) -> Result<u64, CacheError>;

    async fn delete_job_postings_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CacheError>;

    async fn clear_insights(&self) -> Result<u64, CacheError>;

    async fn clear_job_postings(&self) -> Result<u64, CacheError>;
}

/// Rows removed by a maintenance operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeCounts {
    pub insights: u64,
    pub job_postings: u64,
}

/// Deterministic insights key: lower-cased, whitespace runs become `_`.
pub fn cache_key(country: &str, keyword: &str) -> String {
    fn part(s: &str) -> String {
        s.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
    }
    format!("market_insights_{}_{}", part(country), part(keyword))
}

#[derive(Clone)]
pub struct MarketCache {
    store: Arc<dyn CacheStore>,
    insights_ttl: Duration,
    job_retention: Duration,
}

impl MarketCache {
    pub fn new(store: Arc<dyn CacheStore>, insights_ttl: Duration, job_retention: Duration) -> Self {
        Self {
            store,
            insights_ttl,
            job_retention,
        }
    }

    /// Returns a non-expired entry. An expired row is deleted before
    /// reporting a miss, so it is never served again.
    pub async fn get_insights(
        &self,
        country: &str,
        keyword: &str,
    ) -> Result<Option<MarketInsightsResult>, CacheError> {
        let key = cache_key(country, keyword);
        let Some(row) = self.store.get_insights(&key).await? else {
            debug!("Insights cache miss for {key}");
            return Ok(None);
        };

        if Utc::now() > row.expires_at {
            info!("Insights cache entry {key} expired at {}; evicting", row.expires_at);
            self.store.delete_insights(&key).await?;
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(row.data)?))
    }

    /// True when a non-expired entry exists. Never evicts.
    pub async fn has_recent_insights(&self, country: &str, keyword: &str) -> Result<bool, CacheError> {
        let row = self.store.get_insights(&cache_key(country, keyword)).await?;
        Ok(row.is_some_and(|r| r.expires_at > Utc::now()))
    }

    pub async fn save_insights(
        &self,
        country: &str,
        keyword: &str,
        result: &MarketInsightsResult,
    ) -> Result<(), CacheError> {
        let now = Utc::now();
        let row = InsightsCacheRow {
            cache_key: cache_key(country, keyword),
            country: country.to_string(),
            keyword: keyword.to_string(),
            data: serde_json::to_value(result)?,
            expires_at: now + self.insights_ttl,
            updated_at: now,
        };
        let key = row.cache_key.clone();
        self.store.upsert_insights(row).await?;
        info!("Cached insights under {key}");
        Ok(())
    }

    pub async fn delete_insights(&self, country: &str, keyword: &str) -> Result<bool, CacheError> {
        let removed = self.store.delete_insights(&cache_key(country, keyword)).await?;
        Ok(removed > 0)
    }

    pub async fn save_job_postings(&self, jobs: &[EnrichedJobPosting]) -> Result<(), CacheError> {
        if jobs.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let rows = jobs
            .iter()
            .map(|job| JobPostingRow::from_enriched(job, now))
            .collect();
        self.store.upsert_job_postings(rows).await?;
        info!("Cached {} job postings", jobs.len());
        Ok(())
    }

    pub async fn get_job_postings(
        &self,
        country: &str,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<EnrichedJobPosting>, CacheError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self.store.job_postings(country, keyword, limit).await?;
        Ok(rows.into_iter().map(JobPostingRow::into_enriched).collect())
    }

    /// Deletes expired insights and job postings older than the retention window.
    pub async fn cleanup_expired(&self) -> Result<PurgeCounts, CacheError> {
        let now = Utc::now();
        let counts = PurgeCounts {
            insights: self.store.delete_insights_expired_before(now).await?,
            job_postings: self
                .store
                .delete_job_postings_created_before(now - self.job_retention)
                .await?,
        };
        info!(
            "Cache cleanup removed {} insights and {} job postings",
            counts.insights, counts.job_postings
        );
        Ok(counts)
    }

    pub async fn clear_all(&self) -> Result<PurgeCounts, CacheError> {
        let counts = PurgeCounts {
            insights: self.store.clear_insights().await?,
            job_postings: self.store.clear_job_postings().await?,
        };
        info!(
            "Cache cleared: {} insights, {} job postings",
            counts.insights, counts.job_postings
        );
        Ok(counts)
    }
}
