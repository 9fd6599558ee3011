use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::jobs_client::{DEFAULT_BASE_URL, DEFAULT_HOST};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numbers fail startup.
#[derive(Clone)]
pub struct Config {
    /// Postgres cache store. When unset an in-process store is used.
    pub database_url: Option<String>,
    pub rapidapi_key: Option<String>,
    pub rapidapi_host: String,
    pub jobs_api_base_url: String,
    pub upstream_timeout_secs: u64,
    pub insights_cache_ttl_hours: i64,
    pub job_cache_retention_days: i64,
    pub request_delay_secs: u64,
    pub rate_limit_backoff_secs: u64,
    pub max_countries_per_request: usize,
    pub max_keywords_per_request: usize,
    pub max_jobs_per_fetch: usize,
    /// `substring` or `boundary`.
    pub skill_matcher: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests never touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |key: &str, default: &str| optional(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            database_url: optional("DATABASE_URL"),
            rapidapi_key: optional("RAPIDAPI_KEY"),
            rapidapi_host: or_default("RAPIDAPI_HOST", DEFAULT_HOST),
            jobs_api_base_url: or_default("JOBS_API_BASE_URL", DEFAULT_BASE_URL),
            upstream_timeout_secs: parse_or(optional("UPSTREAM_TIMEOUT_SECS"), "UPSTREAM_TIMEOUT_SECS", 30)?,
            insights_cache_ttl_hours: parse_or(
                optional("INSIGHTS_CACHE_TTL_HOURS"),
                "INSIGHTS_CACHE_TTL_HOURS",
                24,
            )?,
            job_cache_retention_days: parse_or(
                optional("JOB_CACHE_RETENTION_DAYS"),
                "JOB_CACHE_RETENTION_DAYS",
                7,
            )?,
            request_delay_secs: parse_or(optional("REQUEST_DELAY_SECS"), "REQUEST_DELAY_SECS", 5)?,
            rate_limit_backoff_secs: parse_or(
                optional("RATE_LIMIT_BACKOFF_SECS"),
                "RATE_LIMIT_BACKOFF_SECS",
                10,
            )?,
            max_countries_per_request: parse_or(
                optional("MAX_COUNTRIES_PER_REQUEST"),
                "MAX_COUNTRIES_PER_REQUEST",
                1,
            )?,
            max_keywords_per_request: parse_or(
                optional("MAX_KEYWORDS_PER_REQUEST"),
                "MAX_KEYWORDS_PER_REQUEST",
                1,
            )?,
            max_jobs_per_fetch: parse_or(optional("MAX_JOBS_PER_FETCH"), "MAX_JOBS_PER_FETCH", 10)?,
            skill_matcher: or_default("SKILL_MATCHER", "substring"),
            port: parse_or(optional("PORT"), "PORT", 8080)?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }

    /// Lifetime of a cached insights entry.
    pub fn insights_ttl(&self) -> Result<chrono::Duration> {
        anyhow::ensure!(
            self.insights_cache_ttl_hours >= 0,
            "INSIGHTS_CACHE_TTL_HOURS must not be negative"
        );
        chrono::Duration::try_hours(self.insights_cache_ttl_hours)
            .context("INSIGHTS_CACHE_TTL_HOURS is out of range")
    }

    /// Age after which cached job postings are removed by cleanup.
    pub fn job_retention(&self) -> Result<chrono::Duration> {
        anyhow::ensure!(
            self.job_cache_retention_days >= 0,
            "JOB_CACHE_RETENTION_DAYS must not be negative"
        );
        chrono::Duration::try_days(self.job_cache_retention_days)
            .context("JOB_CACHE_RETENTION_DAYS is out of range")
    }

    pub fn cache_backend(&self) -> &'static str {
        if self.database_url.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}

impl fmt::Debug for Config {
    // Secrets are reported as set/unset only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let presence = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Config")
            .field("database_url", &presence(&self.database_url))
            .field("rapidapi_key", &presence(&self.rapidapi_key))
            .field("rapidapi_host", &self.rapidapi_host)
            .field("jobs_api_base_url", &self.jobs_api_base_url)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("insights_cache_ttl_hours", &self.insights_cache_ttl_hours)
            .field("job_cache_retention_days", &self.job_cache_retention_days)
            .field("request_delay_secs", &self.request_delay_secs)
            .field("rate_limit_backoff_secs", &self.rate_limit_backoff_secs)
            .field("max_countries_per_request", &self.max_countries_per_request)
            .field("max_keywords_per_request", &self.max_keywords_per_request)
            .field("max_jobs_per_fetch", &self.max_jobs_per_fetch)
            .field("skill_matcher", &self.skill_matcher)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.rapidapi_key.is_none());
        assert_eq!(config.rapidapi_host, "jobs-api14.p.rapidapi.com");
        assert_eq!(config.insights_cache_ttl_hours, 24);
        assert_eq!(config.request_delay_secs, 5);
        assert_eq!(config.rate_limit_backoff_secs, 10);
        assert_eq!(config.max_countries_per_request, 1);
        assert_eq!(config.max_jobs_per_fetch, 10);
        assert_eq!(config.skill_matcher, "substring");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_backend(), "memory");
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/insights"),
            ("MAX_KEYWORDS_PER_REQUEST", "3"),
            ("SKILL_MATCHER", "boundary"),
        ])
        .unwrap();
        assert_eq!(config.max_keywords_per_request, 3);
        assert_eq!(config.skill_matcher, "boundary");
        assert_eq!(config.cache_backend(), "postgres");
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = config_from(&[("RAPIDAPI_KEY", "   ")]).unwrap();
        assert!(config.rapidapi_key.is_none());
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_cache_durations_are_range_checked() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.insights_ttl().unwrap(), chrono::Duration::hours(24));
        assert_eq!(config.job_retention().unwrap(), chrono::Duration::days(7));

        let huge = config_from(&[
            ("INSIGHTS_CACHE_TTL_HOURS", "9223372036854775807"),
            ("JOB_CACHE_RETENTION_DAYS", "9223372036854775807"),
        ])
        .unwrap();
        assert!(huge.insights_ttl().unwrap_err().to_string().contains("INSIGHTS_CACHE_TTL_HOURS"));
        assert!(huge.job_retention().unwrap_err().to_string().contains("JOB_CACHE_RETENTION_DAYS"));

        let negative = config_from(&[("INSIGHTS_CACHE_TTL_HOURS", "-1")]).unwrap();
        assert!(negative.insights_ttl().is_err());
    }

    #[test]
    fn test_debug_never_prints_the_key() {
        let config = config_from(&[("RAPIDAPI_KEY", "super-secret-key")]).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret-key"));
        assert!(printed.contains("<set>"));
    }
}
