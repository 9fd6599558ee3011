//! Aggregator: turns enriched postings into per-country and global statistics.
//!
//! Rankings are stable: counts descending, ties in first-seen order.

use std::collections::{BTreeMap, HashMap};

use crate::market::roles::classify_role;
use crate::models::market::{
    CountryInsight, EnrichedJobPosting, GlobalTrends, InsightsSummary, MarketInsightsResult,
    RoleStat, SkillStat,
};

pub const COUNTRY_TOP_SKILLS: usize = 15;
pub const COUNTRY_TOP_ROLES: usize = 10;
pub const GLOBAL_TOP_SKILLS: usize = 20;
pub const SUMMARY_TOP: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Tally
// ────────────────────────────────────────────────────────────────────────────

/// Insertion-ordered counter.
#[derive(Debug, Default)]
struct Tally {
    counts: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    fn total(&self) -> u32 {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    fn distinct(&self) -> u32 {
        self.counts.len() as u32
    }

    /// Entries by count descending. `sort_by` is stable, so ties keep insertion order.
    fn ranked(&self) -> Vec<(String, u32)> {
        let mut ranked = self.counts.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    fn skill_stats(&self) -> Vec<SkillStat> {
        let total = self.total();
        self.ranked()
            .into_iter()
            .map(|(skill, count)| SkillStat {
                skill,
                count,
                percentage: percentage(count, total),
            })
            .collect()
    }

    fn role_stats(&self) -> Vec<RoleStat> {
        self.ranked()
            .into_iter()
            .map(|(role, count)| RoleStat { role, count })
            .collect()
    }
}

fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(count) * 100.0 / f64::from(total)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-country accumulator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CountryAccumulator {
    total_jobs: u32,
    skills: Tally,
    roles: Tally,
    salary_mean: f64,
    salary_count: u32,
}

impl CountryAccumulator {
    fn fold_salary(&mut self, value: f64) {
        let n = f64::from(self.salary_count);
        self.salary_mean = (self.salary_mean * n + value) / (n + 1.0);
        self.salary_count += 1;
    }

    fn into_insight(self, country: String) -> CountryInsight {
        let mut top_skills = self.skills.skill_stats();
        top_skills.truncate(COUNTRY_TOP_SKILLS);
        let mut top_roles = self.roles.role_stats();
        top_roles.truncate(COUNTRY_TOP_ROLES);

        CountryInsight {
            country,
            total_jobs: self.total_jobs,
            top_skills,
            top_roles,
            avg_salary: self.salary_mean.round(),
            skills_count: self.skills.distinct(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregation
// ────────────────────────────────────────────────────────────────────────────

/// Summarizes `jobs` into a `MarketInsightsResult`.
///
/// Every requested country gets an insight even when no job landed in it.
/// Jobs whose country was not requested still get their own bucket, so raw
/// searches grouped by resolved location are not silently dropped.
pub fn aggregate(jobs: &[EnrichedJobPosting], countries: &[String]) -> MarketInsightsResult {
    let mut buckets: Vec<(String, CountryAccumulator)> = Vec::new();
    let mut bucket_index: HashMap<String, usize> = HashMap::new();
    for country in countries {
        if !bucket_index.contains_key(country) {
            bucket_index.insert(country.clone(), buckets.len());
            buckets.push((country.clone(), CountryAccumulator::default()));
        }
    }

    let mut global_skills = Tally::default();
    let mut global_roles = Tally::default();
    let mut skill_occurrences = 0usize;

    for job in jobs {
        let slot = match bucket_index.get(&job.country) {
            Some(&i) => i,
            None => {
                bucket_index.insert(job.country.clone(), buckets.len());
                buckets.push((job.country.clone(), CountryAccumulator::default()));
                buckets.len() - 1
            }
        };
        let acc = &mut buckets[slot].1;

        acc.total_jobs += 1;
        for skill in &job.skills {
            acc.skills.add(skill);
            global_skills.add(skill);
        }
        skill_occurrences += job.skills.len();

        if let Some(role) = classify_role(&job.posting.title) {
            acc.roles.add(role);
            global_roles.add(role);
        }

        if let Some(value) = job.posting.salary.as_ref().and_then(|s| s.representative()) {
            acc.fold_salary(value);
        }
    }

    let country_insights: BTreeMap<String, CountryInsight> = buckets
        .into_iter()
        .map(|(country, acc)| (country.clone(), acc.into_insight(country)))
        .collect();

    let mut global_top = global_skills.skill_stats();
    global_top.truncate(GLOBAL_TOP_SKILLS);

    let avg_skills_per_job = if jobs.is_empty() {
        0.0
    } else {
        skill_occurrences as f64 / jobs.len() as f64
    };

    let trending_roles = global_roles.role_stats();

    let summary = InsightsSummary {
        total_jobs: jobs.len() as u32,
        countries_analyzed: countries.len() as u32,
        top_skills: global_top.iter().take(SUMMARY_TOP).cloned().collect(),
        top_roles: trending_roles.iter().take(SUMMARY_TOP).cloned().collect(),
    };

    MarketInsightsResult {
        country_insights,
        global_trends: GlobalTrends {
            top_skills: global_top,
            total_skills: global_skills.distinct(),
            avg_skills_per_job,
        },
        trending_roles,
        summary,
    }
}
