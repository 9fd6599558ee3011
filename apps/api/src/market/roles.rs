//! Role Classifier: maps a free-text job title to one canonical role label.

use std::sync::LazyLock;

use regex::Regex;

/// (pattern, role) in priority order. First match wins.
const ROLE_PATTERNS: &[(&str, &str)] = &[
    (r"software engineer|software developer", "Software Engineer"),
    (r"frontend developer|front-end developer|front end developer", "Frontend Developer"),
    (r"backend developer|back-end developer|back end developer", "Backend Developer"),
    (r"full stack developer|fullstack developer|full-stack developer", "Full Stack Developer"),
    (r"data scientist|data science", "Data Scientist"),
    (r"machine learning engineer|ml engineer", "ML Engineer"),
    (r"devops engineer|devops", "DevOps Engineer"),
    (r"cloud engineer|cloud developer", "Cloud Engineer"),
    (r"mobile developer|mobile engineer", "Mobile Developer"),
    (r"web developer|web engineer", "Web Developer"),
    (r"python developer|python engineer", "Python Developer"),
    (r"javascript developer|js developer", "JavaScript Developer"),
    (r"react developer|react engineer", "React Developer"),
    (r"node\.js developer|nodejs developer", "Node.js Developer"),
    (r"java developer|java engineer", "Java Developer"),
    (r"golang developer|go developer", "Go Developer"),
    (r"rust developer|rust engineer", "Rust Developer"),
    (r"blockchain developer|web3 developer", "Blockchain Developer"),
    (r"ai engineer|artificial intelligence engineer", "AI Engineer"),
    (r"cybersecurity engineer|security engineer", "Security Engineer"),
];

static ROLE_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    ROLE_PATTERNS
        .iter()
        .map(|(pattern, role)| {
            let regex = Regex::new(&format!(r"(?i)\b(?:{pattern})\b"))
                .expect("role pattern is a valid regex");
            (regex, *role)
        })
        .collect()
});

/// Returns the canonical role for `title`, or `None` when no rule matches.
/// Unclassified jobs are left out of role statistics entirely.
pub fn classify_role(title: &str) -> Option<&'static str> {
    ROLE_RULES
        .iter()
        .find(|(regex, _)| regex.is_match(title))
        .map(|(_, role)| *role)
}
