//! Enrichment: attaches skills, analysis country and keyword to a raw posting.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::market::countries::resolve_country;
use crate::market::extractor::SkillExtractor;
use crate::models::market::{EnrichedJobPosting, JobPosting};

/// Owns the extractor and the random source used for backfill.
pub struct Enricher {
    extractor: SkillExtractor,
    rng: Mutex<StdRng>,
}

impl Enricher {
    pub fn new(extractor: SkillExtractor) -> Self {
        Self::with_rng(extractor, StdRng::from_entropy())
    }

    pub fn with_rng(extractor: SkillExtractor, rng: StdRng) -> Self {
        Self {
            extractor,
            rng: Mutex::new(rng),
        }
    }

    pub fn matcher_name(&self) -> &'static str {
        self.extractor.matcher_name()
    }

    /// Enriches one posting. The queried country wins when present; otherwise
    /// the country is resolved from the posting's free-text location.
    pub fn enrich(
        &self,
        posting: JobPosting,
        keyword: &str,
        country: Option<&str>,
    ) -> EnrichedJobPosting {
        let skills = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.extractor.extract(
                &posting.title,
                &posting.description,
                posting.job_type.as_deref().unwrap_or_default(),
                &mut *rng,
            )
        };

        let country = match country {
            Some(c) => c.to_string(),
            None => resolve_country(&posting.location).to_string(),
        };

        EnrichedJobPosting {
            posting,
            skills,
            country,
            keyword: keyword.to_string(),
        }
    }

    pub fn enrich_all(
        &self,
        postings: Vec<JobPosting>,
        keyword: &str,
        country: Option<&str>,
    ) -> Vec<EnrichedJobPosting> {
        postings
            .into_iter()
            .map(|p| self.enrich(p, keyword, country))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::market::extractor::SubstringMatcher;
    use crate::market::taxonomy::SkillTaxonomy;

    fn enricher() -> Enricher {
        let extractor = SkillExtractor::new(Arc::new(SkillTaxonomy::default()), Box::new(SubstringMatcher));
        Enricher::with_rng(extractor, StdRng::seed_from_u64(11))
    }

    fn posting(location: &str) -> JobPosting {
        JobPosting {
            job_id: "1".to_string(),
            title: "Backend Developer".to_string(),
            company: "Acme".to_string(),
            location: location.to_string(),
            description: "Looking for experience with Node.js, PostgreSQL, and Docker.".to_string(),
            posted_date: None,
            salary: None,
            experience_level: None,
            job_type: None,
        }
    }

    #[test]
    fn test_query_country_wins() {
        let job = enricher().enrich(posting("Berlin, Germany"), "backend developer", Some("United States"));
        assert_eq!(job.country, "United States");
        assert_eq!(job.keyword, "backend developer");
    }

    #[test]
    fn test_country_resolved_from_location_without_query_country() {
        let job = enricher().enrich(posting("Berlin, Germany"), "backend developer", None);
        assert_eq!(job.country, "Germany");
        assert!(job.skills.contains(&"PostgreSQL".to_string()));
    }

    #[test]
    fn test_enrich_all_keeps_every_posting() {
        let jobs = enricher().enrich_all(vec![posting("Remote"), posting("Paris, France")], "dev", None);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].country, "Global");
        assert_eq!(jobs[1].country, "France");
        assert!(jobs.iter().all(|j| j.skills.len() >= 3));
    }
}
