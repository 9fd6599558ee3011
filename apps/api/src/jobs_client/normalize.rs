//! Normalization of the two known listings response shapes.
//!
//! - `{"jobs": [...]}`: rich items whose field names vary
//!   (`jobId`/`id`/`job_id`, `title`/`jobTitle`/`job_title`, ...).
//! - `{"data": [...]}`: sparse items with `id`, `title`, `companyName`,
//!   `location` and `datePosted`. Description, experience level and job type
//!   are synthesized from the title.
//!
//! Items without a title are dropped. Any other body normalizes to no jobs.

use serde_json::{Map, Value};

use crate::jobs_client::templates::synthesize_description;
use crate::models::market::{JobPosting, Salary};

type Object = Map<String, Value>;

/// First present, non-empty value among `keys`, rendered as a string.
/// Numeric ids are accepted.
fn first_string(item: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Deterministic id for items that arrive without one, so repeated fetches
/// upsert the same cache row.
fn synthesize_job_id(title: &str, company: &str, location: &str) -> String {
    let slug: String = format!("{company} {title} {location}")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let parts: Vec<&str> = slug.split('-').filter(|p| !p.is_empty()).collect();
    format!("synth-{}", parts.join("-"))
}

fn parse_salary(value: Option<&Value>) -> Option<Salary> {
    let salary: Salary = serde_json::from_value(value?.clone()).ok()?;
    (salary.min.is_some() || salary.max.is_some()).then_some(salary)
}

pub fn infer_experience_level(title: &str) -> &'static str {
    let title = title.to_lowercase();
    if ["senior", "lead", "principal"].iter().any(|k| title.contains(k)) {
        "Senior"
    } else if ["junior", "entry", "new grad"].iter().any(|k| title.contains(k)) {
        "Entry Level"
    } else {
        "Mid Level"
    }
}

pub fn infer_job_type(title: &str) -> &'static str {
    let title = title.to_lowercase();
    if ["fullstack", "full-stack", "full stack"].iter().any(|k| title.contains(k)) {
        "Full-time"
    } else if ["part-time", "parttime"].iter().any(|k| title.contains(k)) {
        "Part-time"
    } else if ["contract", "freelance"].iter().any(|k| title.contains(k)) {
        "Contract"
    } else if title.contains("intern") {
        "Internship"
    } else {
        "Full-time"
    }
}

fn normalize_rich(item: &Object) -> Option<JobPosting> {
    let title = first_string(item, &["title", "jobTitle", "job_title"])?;
    let company = first_string(item, &["company", "companyName", "company_name"]).unwrap_or_default();
    let location = first_string(item, &["location", "jobLocation", "job_location"]).unwrap_or_default();
    let job_id = first_string(item, &["jobId", "id", "job_id"])
        .unwrap_or_else(|| synthesize_job_id(&title, &company, &location));

    Some(JobPosting {
        job_id,
        description: first_string(item, &["description", "jobDescription", "job_description"])
            .unwrap_or_default(),
        posted_date: first_string(item, &["postedDate", "datePosted", "date_posted"]),
        salary: parse_salary(item.get("salary")),
        experience_level: first_string(item, &["experienceLevel", "experience_level"]),
        job_type: first_string(item, &["jobType", "job_type"]),
        title,
        company,
        location,
    })
}

fn normalize_sparse(item: &Object) -> Option<JobPosting> {
    let title = first_string(item, &["title"])?;
    let company = first_string(item, &["companyName"]).unwrap_or_default();
    let location = first_string(item, &["location"]).unwrap_or_default();
    let job_id =
        first_string(item, &["id"]).unwrap_or_else(|| synthesize_job_id(&title, &company, &location));

    Some(JobPosting {
        job_id,
        description: synthesize_description(&title, &company),
        posted_date: first_string(item, &["datePosted"]),
        salary: None,
        experience_level: Some(infer_experience_level(&title).to_string()),
        job_type: Some(infer_job_type(&title).to_string()),
        title,
        company,
        location,
    })
}

/// Detects the response shape, normalizes each item and truncates to `limit`.
pub fn normalize_response(body: &Value, limit: usize) -> Vec<JobPosting> {
    let normalize: fn(&Object) -> Option<JobPosting>;
    let items = if let Some(items) = body.get("jobs").and_then(Value::as_array) {
        normalize = normalize_rich;
        items
    } else if let Some(items) = body.get("data").and_then(Value::as_array) {
        normalize = normalize_sparse;
        items
    } else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(normalize)
        .take(limit)
        .collect()
}
