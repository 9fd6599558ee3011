//! In-process `CacheStore`, used by tests and when no database is configured.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::{CacheError, CacheStore};
use crate::models::market::{InsightsCacheRow, JobPostingRow};

type JobKey = (String, String, String);

#[derive(Default)]
struct Tables {
    insights: HashMap<String, InsightsCacheRow>,
    job_postings: HashMap<JobKey, JobPostingRow>,
}

#[derive(Default)]
pub struct MemoryCacheStore {
    tables: Mutex<Tables>,
}

impl MemoryCacheStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get_insights(&self, cache_key: &str) -> Result<Option<InsightsCacheRow>, CacheError> {
        Ok(self.tables().insights.get(cache_key).cloned())
    }

    async fn upsert_insights(&self, row: InsightsCacheRow) -> Result<(), CacheError> {
        self.tables().insights.insert(row.cache_key.clone(), row);
        Ok(())
    }

    async fn delete_insights(&self, cache_key: &str) -> Result<u64, CacheError> {
        Ok(u64::from(self.tables().insights.remove(cache_key).is_some()))
    }

    async fn upsert_job_postings(&self, rows: Vec<JobPostingRow>) -> Result<(), CacheError> {
        let mut tables = self.tables();
        for row in rows {
            let key = (row.job_id.clone(), row.country.clone(), row.keyword.clone());
            tables.job_postings.insert(key, row);
        }
        Ok(())
    }

    async fn job_postings(
        &self,
        country: &str,
        keyword: &str,
        limit: i64,
    ) -> Result<Vec<JobPostingRow>, CacheError> {
        let mut rows: Vec<JobPostingRow> = self
            .tables()
            .job_postings
            .values()
            .filter(|r| r.country == country && r.keyword == keyword)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn delete_insights_expired_before(&self, now: DateTime<Utc>) -> Result<u64, CacheError> {
        let mut tables = self.tables();
        let before = tables.insights.len();
        tables.insights.retain(|_, row| row.expires_at >= now);
        Ok((before - tables.insights.len()) as u64)
    }

    async fn delete_job_postings_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CacheError> {
        let mut tables = self.tables();
        let before = tables.job_postings.len();
        tables.job_postings.retain(|_, row| row.created_at >= cutoff);
        Ok((before - tables.job_postings.len()) as u64)
    }

    async fn clear_insights(&self) -> Result<u64, CacheError> {
        let mut tables = self.tables();
        let removed = tables.insights.len() as u64;
        tables.insights.clear();
        Ok(removed)
    }

    async fn clear_job_postings(&self) -> Result<u64, CacheError> {
        let mut tables = self.tables();
        let removed = tables.job_postings.len() as u64;
        tables.job_postings.clear();
        Ok(removed)
    }
}
