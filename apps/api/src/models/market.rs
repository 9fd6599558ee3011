use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

/// Salary range as reported by the listings API. Either bound may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

impl Salary {
    /// The value folded into salary means: max preferred over min, zero ignored.
    pub fn representative(&self) -> Option<f64> {
        self.max
            .filter(|v| *v > 0.0)
            .or(self.min.filter(|v| *v > 0.0))
    }
}

/// A normalized job posting, independent of the upstream response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub posted_date: Option<String>,
    pub salary: Option<Salary>,
    pub experience_level: Option<String>,
    pub job_type: Option<String>,
}

/// A job posting with derived skills, the country it is analyzed under and the
/// search keyword that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedJobPosting {
    #[serde(flatten)]
    pub posting: JobPosting,
    pub skills: Vec<String>,
    pub country: String,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillStat {
    pub skill: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleStat {
    pub role: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInsight {
    pub country: String,
    pub total_jobs: u32,
    pub top_skills: Vec<SkillStat>,
    pub top_roles: Vec<RoleStat>,
    pub avg_salary: f64,
    pub skills_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalTrends {
    pub top_skills: Vec<SkillStat>,
    pub total_skills: u32,
    pub avg_skills_per_job: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSummary {
    pub total_jobs: u32,
    pub countries_analyzed: u32,
    pub top_skills: Vec<SkillStat>,
    pub top_roles: Vec<RoleStat>,
}

/// The unit persisted to the insights cache and returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsightsResult {
    pub country_insights: BTreeMap<String, CountryInsight>,
    pub global_trends: GlobalTrends,
    pub trending_roles: Vec<RoleStat>,
    pub summary: InsightsSummary,
}

impl MarketInsightsResult {
    /// All-empty result returned when no source produced data.
    pub fn empty() -> Self {
        Self::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cache rows
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InsightsCacheRow {
    pub cache_key: String,
    pub country: String,
    pub keyword: String,
    pub data: Value,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct JobPostingRow {
    pub job_id: String,
    pub country: String,
    pub keyword: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_currency: Option<String>,
    pub experience_level: Option<String>,
    pub job_type: Option<String>,
    pub skills: Json<Vec<String>>,
    pub posted_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobPostingRow {
    pub fn from_enriched(job: &EnrichedJobPosting, created_at: DateTime<Utc>) -> Self {
        let salary = job.posting.salary.clone().unwrap_or_default();
        Self {
            job_id: job.posting.job_id.clone(),
            country: job.country.clone(),
            keyword: job.keyword.clone(),
            title: job.posting.title.clone(),
            company: job.posting.company.clone(),
            location: job.posting.location.clone(),
            description: job.posting.description.clone(),
            salary_min: salary.min,
            salary_max: salary.max,
            salary_currency: salary.currency,
            experience_level: job.posting.experience_level.clone(),
            job_type: job.posting.job_type.clone(),
            skills: Json(job.skills.clone()),
            posted_date: job.posting.posted_date.clone(),
            created_at,
        }
    }

    pub fn into_enriched(self) -> EnrichedJobPosting {
        let salary = if self.salary_min.is_some() || self.salary_max.is_some() {
            Some(Salary {
                min: self.salary_min,
                max: self.salary_max,
                currency: self.salary_currency,
            })
        } else {
            None
        };

        EnrichedJobPosting {
            posting: JobPosting {
                job_id: self.job_id,
                title: self.title,
                company: self.company,
                location: self.location,
                description: self.description,
                posted_date: self.posted_date,
                salary,
                experience_level: self.experience_level,
                job_type: self.job_type,
            },
            skills: self.skills.0,
            country: self.country,
            keyword: self.keyword,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_prefers_max_over_min() {
        let salary = Salary {
            min: Some(50_000.0),
            max: Some(80_000.0),
            currency: Some("USD".to_string()),
        };
        assert_eq!(salary.representative(), Some(80_000.0));
    }

    #[test]
    fn test_salary_falls_back_to_min_and_ignores_zero() {
        let salary = Salary {
            min: Some(40_000.0),
            max: Some(0.0),
            currency: None,
        };
        assert_eq!(salary.representative(), Some(40_000.0));
        assert_eq!(Salary::default().representative(), None);
    }

    #[test]
    fn test_enriched_posting_serializes_flat_camel_case() {
        let job = EnrichedJobPosting {
            posting: JobPosting {
                job_id: "42".to_string(),
                title: "Backend Developer".to_string(),
                company: "Acme".to_string(),
                location: "Berlin, Germany".to_string(),
                description: "Rust and PostgreSQL".to_string(),
                posted_date: None,
                salary: None,
                experience_level: Some("Mid Level".to_string()),
                job_type: Some("Full-time".to_string()),
            },
            skills: vec!["Rust".to_string()],
            country: "Germany".to_string(),
            keyword: "backend developer".to_string(),
        };

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["jobId"], "42");
        assert_eq!(value["experienceLevel"], "Mid Level");
        assert_eq!(value["country"], "Germany");
        assert_eq!(value["skills"][0], "Rust");
    }

    #[test]
    fn test_row_round_trip_keeps_salary_absent() {
        let job = EnrichedJobPosting {
            posting: JobPosting {
                job_id: "7".to_string(),
                title: "Data Scientist".to_string(),
                company: "Acme".to_string(),
                location: "Paris, France".to_string(),
                description: String::new(),
                posted_date: Some("2026-10-01".to_string()),
                salary: None,
                experience_level: None,
                job_type: None,
            },
            skills: vec!["Python".to_string(), "SQL".to_string()],
            country: "France".to_string(),
            keyword: "data scientist".to_string(),
        };

        let restored = JobPostingRow::from_enriched(&job, Utc::now()).into_enriched();
        assert_eq!(restored, job);
    }

    #[test]
    fn test_empty_result_has_zero_summary() {
        let empty = MarketInsightsResult::empty();
        assert!(empty.country_insights.is_empty());
        assert_eq!(empty.summary.total_jobs, 0);
        assert_eq!(empty.global_trends.avg_skills_per_job, 0.0);
    }
}
