//! Skill Taxonomy: the catalogue of recognized technology names, plus the
//! per-category candidate lists used to backfill sparse extractions.
//!
//! The taxonomy is an immutable value built once at startup and shared behind an
//! `Arc`, so tests can construct their own catalogues side by side.

use std::collections::HashMap;

use crate::market::text::contains_any_word;

const LANGUAGES: &[&str] = &[
    "JavaScript", "TypeScript", "Python", "Java", "C++", "C#", "Go", "Rust", "Swift", "Kotlin",
    "PHP", "Ruby", "Scala", "MATLAB", "Perl", "Haskell", "Clojure", "Erlang", "Elixir", "Dart",
    "Julia", "Lua", "Assembly", "Shell", "PowerShell", "Bash",
];

const WEB: &[&str] = &[
    "React", "Vue", "Angular", "Node.js", "Express", "Django", "Flask", "Spring", "Laravel",
    "ASP.NET", "Ruby on Rails", "jQuery", "Bootstrap", "Tailwind CSS", "SASS", "LESS", "Next.js",
    "Nuxt.js", "Svelte", "Ember.js", "Backbone.js", "Meteor",
];

const DATABASES: &[&str] = &[
    "MySQL", "PostgreSQL", "MongoDB", "Redis", "Elasticsearch", "Cassandra", "DynamoDB", "SQLite",
    "Oracle", "SQL Server", "MariaDB", "Neo4j", "CouchDB", "InfluxDB", "Firebase", "Supabase",
    "PlanetScale", "CockroachDB",
];

const CLOUD_DEVOPS: &[&str] = &[
    "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Terraform", "Ansible", "Jenkins", "GitLab CI",
    "GitHub Actions", "CircleCI", "Travis CI", "Vagrant", "Chef", "Puppet", "Vercel", "Netlify",
    "Heroku", "DigitalOcean", "Linode",
];

const MOBILE: &[&str] = &[
    "React Native", "Flutter", "Xamarin", "Ionic", "Cordova", "PhoneGap", "Android Studio",
    "Xcode", "Expo",
];

const DATA_AI: &[&str] = &[
    "TensorFlow", "PyTorch", "Pandas", "NumPy", "Scikit-learn", "Keras", "OpenCV", "Jupyter",
    "Apache Spark", "Hadoop", "Tableau", "Power BI", "D3.js", "Apache Kafka", "Apache Airflow",
    "MLflow", "Weights & Biases",
];

const MISC: &[&str] = &[
    "GraphQL", "REST API", "Microservices", "Serverless", "Blockchain", "Web3",
    "Machine Learning", "Deep Learning", "Computer Vision", "NLP", "Data Analysis", "Git", "SVN",
    "Mercurial", "Linux", "Unix", "Windows Server",
];

/// Last-resort padding when neither extraction nor category backfill reach the floor.
pub const GENERIC_SKILLS: &[&str] = &["JavaScript", "Python", "Git", "SQL", "Docker", "AWS", "Linux"];

/// An ordered catalogue of canonical skill names with case-insensitive lookup.
#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    /// (canonical, lower-cased) in catalogue order.
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl SkillTaxonomy {
    pub fn from_entries<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for name in names {
            let canonical: String = name.into();
            let lower = canonical.to_lowercase();
            if index.contains_key(&lower) {
                continue;
            }
            index.insert(lower.clone(), entries.len());
            entries.push((canonical, lower));
        }

        Self { entries, index }
    }

    /// Canonical form of `candidate` if it names a known skill.
    pub fn is_known_skill(&self, candidate: &str) -> Option<&str> {
        self.index
            .get(&candidate.trim().to_lowercase())
            .map(|&i| self.entries[i].0.as_str())
    }

    /// Iterates `(canonical, lower-cased)` pairs in catalogue order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, l)| (c.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        Self::from_entries(
            [LANGUAGES, WEB, DATABASES, CLOUD_DEVOPS, MOBILE, DATA_AI, MISC]
                .into_iter()
                .flatten()
                .copied(),
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job categories (backfill candidates)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCategory {
    Frontend,
    Backend,
    FullStack,
    Data,
    DevOps,
    Mobile,
    Cloud,
    Security,
    Ml,
    General,
}

impl JobCategory {
    /// Picks the category from title and job-type cues. Checked in a fixed order;
    /// the first category with a matching cue wins.
    pub fn detect(title: &str, job_type: &str) -> Self {
        let title = title.to_lowercase();
        let job_type = job_type.to_lowercase();

        const RULES: &[(JobCategory, &[&str], &str)] = &[
            (JobCategory::Frontend, &["frontend", "front-end", "ui", "ux"], "frontend"),
            (JobCategory::Backend, &["backend", "back-end", "server", "api"], "backend"),
            (
                JobCategory::FullStack,
                &["fullstack", "full-stack", "full stack"],
                "fullstack",
            ),
            (JobCategory::Data, &["data", "analyst", "scientist"], "data"),
            (JobCategory::DevOps, &["devops", "sre", "infrastructure"], "devops"),
            (JobCategory::Mobile, &["mobile", "ios", "android"], "mobile"),
            (JobCategory::Cloud, &["cloud", "aws", "azure"], "cloud"),
            (
                JobCategory::Security,
                &["security", "cybersecurity", "cyber", "penetration"],
                "security",
            ),
            (JobCategory::Ml, &["ml", "machine learning", "ai"], "ml"),
        ];

        RULES
            .iter()
            .find(|(_, cues, type_cue)| {
                contains_any_word(&title, cues) || job_type.contains(type_cue)
            })
            .map(|(category, _, _)| *category)
            .unwrap_or(JobCategory::General)
    }

    pub fn candidate_skills(self) -> &'static [&'static str] {
        match self {
            JobCategory::Frontend => &[
                "React", "Vue", "Angular", "JavaScript", "TypeScript", "HTML5", "CSS3", "SASS",
                "Tailwind CSS", "Bootstrap", "Next.js", "Nuxt.js", "Webpack", "Vite", "Jest",
                "Cypress", "Storybook", "Figma", "Adobe XD", "Sketch",
            ],
            JobCategory::Backend => &[
                "Node.js", "Python", "Java", "C#", "Go", "Rust", "Express", "Django", "Flask",
                "Spring", "ASP.NET", "FastAPI", "GraphQL", "REST API", "PostgreSQL", "MongoDB",
                "Redis", "Docker", "Kubernetes", "AWS", "Azure",
            ],
            JobCategory::FullStack => &[
                "React", "Node.js", "JavaScript", "TypeScript", "Python", "PostgreSQL", "MongoDB",
                "Docker", "AWS", "Next.js", "Express", "GraphQL", "REST API", "HTML5", "CSS3",
                "Tailwind CSS", "Jest", "Cypress",
            ],
            JobCategory::Data => &[
                "Python", "SQL", "Pandas", "NumPy", "Scikit-learn", "TensorFlow", "PyTorch",
                "Jupyter", "Tableau", "Power BI", "Apache Spark", "Hadoop", "Machine Learning",
                "Deep Learning", "Statistics", "MATLAB",
            ],
            JobCategory::DevOps => &[
                "Docker", "Kubernetes", "AWS", "Azure", "GCP", "Terraform", "Ansible", "Jenkins",
                "GitLab CI", "GitHub Actions", "Linux", "Bash", "Python", "Monitoring",
                "Prometheus", "Grafana", "ELK Stack",
            ],
            JobCategory::Mobile => &[
                "React Native", "Flutter", "Swift", "Kotlin", "Java", "Dart", "Xcode",
                "Android Studio", "Expo", "Ionic", "Cordova", "Firebase",
            ],
            JobCategory::Cloud => &[
                "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Terraform", "Python", "Linux",
                "Bash", "Monitoring", "CI/CD", "Infrastructure as Code",
            ],
            JobCategory::Security => &[
                "Cybersecurity", "Penetration Testing", "Network Security", "Python", "Linux",
                "Docker", "Kubernetes", "AWS Security", "Azure Security", "Compliance",
                "Risk Assessment", "SIEM", "Firewall",
            ],
            JobCategory::Ml => &[
                "Python", "TensorFlow", "PyTorch", "Scikit-learn", "Pandas", "NumPy",
                "Machine Learning", "Deep Learning", "Computer Vision", "NLP", "Apache Spark",
                "Docker", "Kubernetes", "AWS", "Azure",
            ],
            JobCategory::General => &[
                "JavaScript", "Python", "Java", "React", "Node.js", "SQL", "Git", "Docker", "AWS",
                "Linux", "REST API", "Agile", "Scrum",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_skill_is_case_insensitive() {
        let taxonomy = SkillTaxonomy::default();
        assert_eq!(taxonomy.is_known_skill("postgresql"), Some("PostgreSQL"));
        assert_eq!(taxonomy.is_known_skill("  NODE.JS "), Some("Node.js"));
        assert_eq!(taxonomy.is_known_skill("cobol"), None);
    }

    #[test]
    fn test_duplicate_entries_are_collapsed() {
        let taxonomy = SkillTaxonomy::from_entries(["Rust", "rust", "Go"]);
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.is_known_skill("RUST"), Some("Rust"));
    }

    #[test]
    fn test_default_taxonomy_keeps_catalogue_order() {
        let taxonomy = SkillTaxonomy::default();
        let first: Vec<&str> = taxonomy.entries().take(2).map(|(c, _)| c).collect();
        assert_eq!(first, vec!["JavaScript", "TypeScript"]);
    }

    #[test]
    fn test_category_detection_order() {
        assert_eq!(JobCategory::detect("Senior Frontend Engineer", ""), JobCategory::Frontend);
        assert_eq!(JobCategory::detect("Backend Developer", ""), JobCategory::Backend);
        assert_eq!(JobCategory::detect("Full Stack Developer", ""), JobCategory::FullStack);
        assert_eq!(JobCategory::detect("Data Analyst", ""), JobCategory::Data);
        assert_eq!(JobCategory::detect("Site Reliability (SRE)", ""), JobCategory::DevOps);
        assert_eq!(JobCategory::detect("iOS Engineer", ""), JobCategory::Mobile);
        assert_eq!(JobCategory::detect("Penetration Tester", ""), JobCategory::Security);
        assert_eq!(JobCategory::detect("ML Engineer", ""), JobCategory::Ml);
        assert_eq!(JobCategory::detect("Product Owner", ""), JobCategory::General);
    }

    #[test]
    fn test_category_short_cues_need_whole_words() {
        // "build" contains "ui" and "maintain" contains "ai"; neither is a cue.
        assert_eq!(JobCategory::detect("Build Engineer", ""), JobCategory::General);
        assert_eq!(JobCategory::detect("Maintainer", ""), JobCategory::General);
    }

    #[test]
    fn test_category_from_job_type() {
        assert_eq!(JobCategory::detect("Engineer", "Mobile"), JobCategory::Mobile);
    }
}
