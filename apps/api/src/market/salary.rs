//! Salary display for cached job postings.
//!
//! Postings without salary data get an estimated band from a per-country
//! table. Estimates are for display only and never feed `avgSalary`.

use serde::Serialize;

use crate::models::market::Salary;

/// (country, min, max, currency). Unknown countries use the first row.
const SALARY_BANDS: &[(&str, f64, f64, &str)] = &[
    ("United States", 80_000.0, 180_000.0, "USD"),
    ("United Kingdom", 45_000.0, 100_000.0, "GBP"),
    ("Canada", 70_000.0, 140_000.0, "CAD"),
    ("Germany", 50_000.0, 100_000.0, "EUR"),
    ("Australia", 80_000.0, 150_000.0, "AUD"),
    ("Netherlands", 45_000.0, 90_000.0, "EUR"),
    ("Singapore", 60_000.0, 120_000.0, "SGD"),
    ("Japan", 5_000_000.0, 12_000_000.0, "JPY"),
    ("France", 40_000.0, 85_000.0, "EUR"),
    ("India", 800_000.0, 2_000_000.0, "INR"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryDisplay {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
    pub display: String,
    pub estimated: bool,
}

/// Title multiplier applied to the estimated band. Checked in order.
fn seniority_multiplier(title: &str) -> f64 {
    let title = title.to_lowercase();
    if title.contains("senior") || title.contains("lead") {
        1.3
    } else if title.contains("junior") || title.contains("entry") {
        0.7
    } else if title.contains("architect") || title.contains("principal") {
        1.5
    } else {
        1.0
    }
}

pub fn currency_symbol(currency: &str) -> &str {
    match currency {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "INR" => "₹",
        other => other,
    }
}

/// Formats a whole amount with comma thousand separators.
pub fn format_amount(amount: f64) -> String {
    let digits = (amount.round() as i64).unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if amount < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Deterministic band for a country and title.
pub fn estimate_salary(country: &str, title: &str) -> SalaryDisplay {
    let (_, min, max, currency) = SALARY_BANDS
        .iter()
        .find(|(name, ..)| *name == country)
        .copied()
        .unwrap_or(SALARY_BANDS[0]);

    let multiplier = seniority_multiplier(title);
    let min = (min * multiplier).round();
    let max = (max * multiplier).round();
    let symbol = currency_symbol(currency);

    SalaryDisplay {
        min: Some(min),
        max: Some(max),
        currency: Some(currency.to_string()),
        display: format!(
            "{symbol}{} - {symbol}{}",
            format_amount(min),
            format_amount(max)
        ),
        estimated: true,
    }
}

/// Display for a posting's own salary, falling back to the estimate when the
/// posting carries no usable bound.
pub fn describe_salary(salary: Option<&Salary>, country: &str, title: &str) -> SalaryDisplay {
    let Some(salary) = salary else {
        return estimate_salary(country, title);
    };

    let symbol = currency_symbol(salary.currency.as_deref().unwrap_or("USD")).to_string();
    let display = match (salary.min, salary.max) {
        (Some(min), Some(max)) => {
            format!("{symbol}{} - {symbol}{}", format_amount(min), format_amount(max))
        }
        (Some(min), None) => format!("{symbol}{}+", format_amount(min)),
        (None, Some(max)) => format!("Up to {symbol}{}", format_amount(max)),
        (None, None) => return estimate_salary(country, title),
    };

    SalaryDisplay {
        min: salary.min,
        max: salary.max,
        currency: salary.currency.clone(),
        display,
        estimated: false,
    }
}
