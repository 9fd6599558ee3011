//! Country Resolver.
//!
//! Two deliberately separate lookups:
//! - `resolve_country` turns a free-text job location into an analysis label.
//! - `location_id_to_name` turns an upstream location id into the name sent
//!   in the listings query.

use crate::market::text::contains_any_word;

pub const GLOBAL_COUNTRY: &str = "Global";
pub const WORLDWIDE_LOCATION: &str = "Worldwide";
pub const WORLDWIDE_LOCATION_ID: &str = "92000000";

/// Checked in order; the first label with a matching keyword wins.
const COUNTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("United States", &["united states", "usa", "us"]),
    ("United Kingdom", &["united kingdom", "uk", "england"]),
    ("Canada", &["canada"]),
    ("Australia", &["australia"]),
    ("Germany", &["germany", "deutschland"]),
    ("France", &["france"]),
    ("Netherlands", &["netherlands"]),
    ("Singapore", &["singapore"]),
    ("India", &["india"]),
    ("Japan", &["japan"]),
    ("Sweden", &["sweden"]),
    ("Norway", &["norway"]),
    ("Denmark", &["denmark"]),
    ("Finland", &["finland"]),
    ("Switzerland", &["switzerland"]),
    ("Austria", &["austria"]),
    ("Belgium", &["belgium"]),
    ("Ireland", &["ireland"]),
    ("Spain", &["spain"]),
    ("Italy", &["italy"]),
    ("Poland", &["poland"]),
    ("Czech Republic", &["czech republic", "czechia"]),
    ("Portugal", &["portugal"]),
    ("Brazil", &["brazil"]),
    ("Mexico", &["mexico"]),
    ("South Korea", &["south korea"]),
    ("Israel", &["israel"]),
    ("United Arab Emirates", &["united arab emirates", "uae"]),
    ("South Africa", &["south africa"]),
];

/// Upstream location ids and the names the listings API expects.
const LOCATION_IDS: &[(&str, &str)] = &[
    (WORLDWIDE_LOCATION_ID, WORLDWIDE_LOCATION),
    ("101165590", "United States"),
    ("101620260", "United Kingdom"),
    ("101174742", "Canada"),
    ("101452733", "Australia"),
    ("101282430", "Germany"),
    ("101451783", "France"),
    ("101452735", "Netherlands"),
    ("101452734", "Singapore"),
    ("101165591", "India"),
    ("101452736", "Japan"),
];

/// Maps a free-text location to a country label; `"Global"` when nothing matches.
pub fn resolve_country(location: &str) -> &'static str {
    let location = location.to_lowercase();
    COUNTRY_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any_word(&location, keywords))
        .map(|(country, _)| *country)
        .unwrap_or(GLOBAL_COUNTRY)
}

/// Maps an upstream location id to its query name; `"Worldwide"` when unknown.
pub fn location_id_to_name(location_id: &str) -> &'static str {
    LOCATION_IDS
        .iter()
        .find(|(id, _)| *id == location_id.trim())
        .map(|(_, name)| *name)
        .unwrap_or(WORLDWIDE_LOCATION)
}

/// Canonical label for a requested country: the table name when the input
/// names a known country or alias (any case), otherwise the input title-cased
/// word by word, so case variants of one request share a label.
pub fn canonical_country(country: &str) -> String {
    let wanted = country.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = wanted.to_lowercase();

    let known = LOCATION_IDS
        .iter()
        .map(|(_, name)| *name)
        .find(|name| name.eq_ignore_ascii_case(&wanted))
        .or_else(|| {
            COUNTRY_KEYWORDS
                .iter()
                .find(|(label, keywords)| label.eq_ignore_ascii_case(&wanted) || keywords.contains(&lower.as_str()))
                .map(|(label, _)| *label)
        });

    match known {
        Some(label) => label.to_string(),
        None => wanted
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" "),
    }
}

/// Location id used to query the upstream for a requested country. Countries
/// without a dedicated id are searched worldwide.
pub fn country_location_id(country: &str) -> &'static str {
    LOCATION_IDS
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(country.trim()))
        .map(|(id, _)| *id)
        .unwrap_or(WORLDWIDE_LOCATION_ID)
}
