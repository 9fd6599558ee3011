//! Postgres-backed `CacheStore`. Schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::cache::{CacheError, CacheStore};
use crate::models::market::{InsightsCacheRow, JobPostingRow};

#[derive(Clone)]
pub struct PgCacheStore {
    pool: PgPool,
}

impl PgCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn get_insights(&self, cache_key: &str) -> Result<Option<InsightsCacheRow>, CacheError> {
        let row = sqlx::query_as::<_, InsightsCacheRow>(
            r#"
            SELECT cache_key, country, keyword, data, expires_at, updated_at
            FROM market_insights_cache
            WHERE cache_key = $1
            "#,
        )
        .bind(cache_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert_insights(&self, row: InsightsCacheRow) -> Result<(), CacheError> {
        sqlx::query(
            r#"
            INSERT INTO market_insights_cache
                (cache_key, country, keyword, data, expires_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (cache_key) DO UPDATE SET
                country = EXCLUDED.country,
                keyword = EXCLUDED.keyword,
                data = EXCLUDED.data,
                expires_at = EXCLUDED.expires_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&row.cache_key)
        .bind(&row.country)
        .bind(&row.keyword)
        .bind(&row.data)
        .bind(row.expires_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_insights(&self, cache_key: &str) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM market_insights_cache WHERE cache_key = $1")
            .bind(cache_key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn upsert_job_postings(&self, rows: Vec<JobPostingRow>) -> Result<(), CacheError> {
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO job_postings_cache
                    (job_id, country, keyword, title, company, location, description,
                     salary_min, salary_max, salary_currency, experience_level, job_type,
                     skills, posted_date, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                ON CONFLICT (job_id, country, keyword) DO UPDATE SET
                    title = EXCLUDED.title,
                    company = EXCLUDED.company,
                    location = EXCLUDED.location,
                    description = EXCLUDED.description,
                    salary_min = EXCLUDED.salary_min,
                    salary_max = EXCLUDED.salary_max,
                    salary_currency = EXCLUDED.salary_currency,
                    experience_level = EXCLUDED.experience_level,
                    job_type = EXCLUDED.job_type,
                    skills = EXCLUDED.skills,
                    posted_date = EXCLUDED.posted_date,
                    created_at = EXCLUDED.created_at
                "#,
            )
            .bind(&row.job_id)
            .bind(&row.country)
            .bind(&row.keyword)
            .bind(&row.title)
            .bind(&row.company)
            .bind(&row.location)
            .bind(&row.description)
            .bind(row.salary_min)
            .bind(row.salary_max)
            .bind(&row.salary_currency)
            .bind(&row.experience_level)
            .bind(&row.job_type)
            .bind(&row.skills)
            .bind(&row.posted_date)
            .bind(row.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn job_postings(
        &self,
        country: &str,
        keyword: &str,
        limit: i64,
    ) -> Result<Vec<JobPostingRow>, CacheError> {
        let rows = sqlx::query_as::<_, JobPostingRow>(
            r#"
            SELECT job_id, country, keyword, title, company, location, description,
                   salary_min, salary_max, salary_currency, experience_level, job_type,
                   skills, posted_date, created_at
            FROM job_postings_cache
            WHERE country = $1 AND keyword = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(country)
        .bind(keyword)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_insights_expired_before(&self, now: DateTime<Utc>) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM market_insights_cache WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_job_postings_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM job_postings_cache WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn clear_insights(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM market_insights_cache")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear_job_postings(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM job_postings_cache")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
