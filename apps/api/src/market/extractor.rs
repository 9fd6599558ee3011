//! Text Skill Extractor: derives a skill set from a job title and description.
//!
//! Passes, in order:
//! 1. literal: every taxonomy entry found in the search text (via a `SkillMatcher`)
//! 2. pattern: lists following cue phrases ("experience with …", "required: …")
//! 3. backfill: category candidates, shuffled, when fewer than `MIN_SKILLS` were found
//! 4. generic padding up to `MIN_SKILLS`
//!
//! Backfill fabricates skills that are not literally in the text. That is accepted:
//! every posting must carry displayable skills. Randomness is injected by the
//! caller so tests can seed it.

use std::sync::{Arc, LazyLock};

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use crate::market::taxonomy::{JobCategory, SkillTaxonomy, GENERIC_SKILLS};
use crate::market::text::contains_word;

/// Floor on the number of skills attached to any posting.
pub const MIN_SKILLS: usize = 3;

static CUE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:experience with|knowledge of|proficient in|skilled in|expertise in|familiar with)\s+([a-z0-9\s,&.+#/-]+)",
        r"\b(?:required|preferred|must have|should have|nice to have)\s*:?\s*([a-z0-9\s,&.+#/-]+)",
        r"\b(?:technologies|technology|tools|tool|frameworks|framework|languages|language|platforms|platform)\s*:?\s*([a-z0-9\s,&.+#/-]+)",
        r"\b(?:working with|using|developing with|building with)\s+([a-z0-9\s,&.+#/-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("cue pattern is a valid regex"))
    .collect()
});

static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,&]|\.\s+|\s+and\s+|\s+or\s+").expect("separator is a valid regex"));

// ────────────────────────────────────────────────────────────────────────────
// Matching strategies
// ────────────────────────────────────────────────────────────────────────────

/// Decides whether a lower-cased taxonomy entry occurs in the lower-cased search text.
pub trait SkillMatcher: Send + Sync {
    fn matches(&self, search_text: &str, skill_lower: &str) -> bool;
    fn name(&self) -> &'static str;
}

/// Plain substring containment. Cheap and knowingly loose ("java" hits "javascript").
pub struct SubstringMatcher;

impl SkillMatcher for SubstringMatcher {
    fn matches(&self, search_text: &str, skill_lower: &str) -> bool {
        search_text.contains(skill_lower)
    }

    fn name(&self) -> &'static str {
        "substring"
    }
}

/// Requires the skill to be bounded by non-alphanumeric characters.
pub struct BoundaryMatcher;

impl SkillMatcher for BoundaryMatcher {
    fn matches(&self, search_text: &str, skill_lower: &str) -> bool {
        contains_word(search_text, skill_lower)
    }

    fn name(&self) -> &'static str {
        "boundary"
    }
}

/// Builds the matcher named in configuration; unknown names fall back to substring.
pub fn matcher_from_name(name: &str) -> Box<dyn SkillMatcher> {
    match name.trim().to_lowercase().as_str() {
        "boundary" | "word" => Box::new(BoundaryMatcher),
        _ => Box::new(SubstringMatcher),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor
// ────────────────────────────────────────────────────────────────────────────

pub struct SkillExtractor {
    taxonomy: Arc<SkillTaxonomy>,
    matcher: Box<dyn SkillMatcher>,
}

impl SkillExtractor {
    pub fn new(taxonomy: Arc<SkillTaxonomy>, matcher: Box<dyn SkillMatcher>) -> Self {
        Self { taxonomy, matcher }
    }

    pub fn matcher_name(&self) -> &'static str {
        self.matcher.name()
    }

    /// Returns a deduplicated skill list (order irrelevant) with at least
    /// `MIN_SKILLS` entries.
    pub fn extract<R: Rng + ?Sized>(
        &self,
        title: &str,
        description: &str,
        job_type: &str,
        rng: &mut R,
    ) -> Vec<String> {
        let search_text = format!("{} {}", description.to_lowercase(), title.to_lowercase());
        let mut found: Vec<String> = Vec::new();

        for (canonical, lower) in self.taxonomy.entries() {
            if self.matcher.matches(&search_text, lower) {
                push_unique(&mut found, canonical);
            }
        }

        for skill in self.cue_list_skills(&search_text) {
            push_unique(&mut found, &skill);
        }

        if found.len() < MIN_SKILLS {
            let wanted = (6 - found.len()).clamp(2, 4);
            let mut candidates: Vec<&str> = JobCategory::detect(title, job_type)
                .candidate_skills()
                .iter()
                .copied()
                .filter(|s| !found.iter().any(|f| f == s))
                .collect();
            candidates.shuffle(rng);
            for skill in candidates.into_iter().take(wanted) {
                push_unique(&mut found, skill);
            }
        }

        for skill in GENERIC_SKILLS {
            if found.len() >= MIN_SKILLS {
                break;
            }
            push_unique(&mut found, skill);
        }

        found
    }

    /// Taxonomy entries named in lists that follow cue phrases.
    fn cue_list_skills(&self, search_text: &str) -> Vec<String> {
        let mut skills = Vec::new();

        for pattern in CUE_PATTERNS.iter() {
            for captures in pattern.captures_iter(search_text) {
                let Some(list) = captures.get(1) else {
                    continue;
                };
                for token in LIST_SEPARATOR.split(list.as_str()) {
                    let token = token
                        .trim()
                        .trim_end_matches(['.', '-', '/'])
                        .trim_start_matches("and ")
                        .trim();
                    if token.len() <= 1 {
                        continue;
                    }
                    if let Some(canonical) = self.taxonomy.is_known_skill(token) {
                        skills.push(canonical.to_string());
                    }
                }
            }
        }

        skills
    }
}

fn push_unique(skills: &mut Vec<String>, skill: &str) {
    if !skills.iter().any(|s| s == skill) {
        skills.push(skill.to_string());
    }
}
