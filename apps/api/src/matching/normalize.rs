//! Normalization of raw JSearch listings into display-ready [`Job`] records.
//!
//! Every formatter here is a one-way transform over raw provider fields. They are
//! not meant to be applied to their own output: feeding `"Not Disclosed"` or
//! `"Full-time"` back in has no defined meaning.

use rand::Rng;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::job::Job;

pub const MISSING_FIELD: &str = "N/A";
pub const DEFAULT_LOCATION: &str = "India";
pub const SALARY_NOT_DISCLOSED: &str = "Not Disclosed";
pub const EXPERIENCE_NOT_SPECIFIED: &str = "Not specified";
pub const DEFAULT_JOB_TYPE: &str = "Full-time";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const APPLY_URL_PLACEHOLDER: &str = "#";
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Placeholder match range. Lower bound inclusive, upper exclusive.
pub const MATCH_PERCENTAGE_RANGE: std::ops::Range<u8> = 70..100;

/// The subset of a JSearch listing this service reads. Every field is optional.
/// Text fields of the wrong JSON type reject the listing; the numeric fields only
/// feed formatters, so an unusable number there reads as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobListing {
    pub job_title: Option<String>,
    pub employer_name: Option<String>,
    pub job_city: Option<String>,
    pub job_state: Option<String>,
    pub job_apply_link: Option<String>,
    pub job_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub job_min_salary: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub job_max_salary: Option<f64>,
    pub job_salary_currency: Option<String>,
    pub job_salary_period: Option<String>,
    pub job_required_experience: Option<RequiredExperience>,
    pub job_employment_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequiredExperience {
    #[serde(default, deserialize_with = "lenient_months")]
    pub required_experience_in_months: Option<u32>,
}

/// Integers, floats and numeric strings. Anything else is `None`.
fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Whole months; fractions are truncated, negatives read as absent.
fn lenient_months<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.trunc() as u32))
}

/// Outcome of validating one raw listing.
#[derive(Debug)]
pub enum ListingParse {
    Valid(Box<RawJobListing>),
    ShapeError(String),
}

pub fn parse_listing(value: Value) -> ListingParse {
    match serde_json::from_value::<RawJobListing>(value) {
        Ok(listing) => ListingParse::Valid(Box::new(listing)),
        Err(e) => ListingParse::ShapeError(e.to_string()),
    }
}

/// Empty strings count as absent, like the provider's own UI does.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn present_number(value: Option<f64>) -> Option<f64> {
    value.filter(|n| *n != 0.0 && !n.is_nan())
}

fn plural(n: u32) -> &'static str {
    // Singular for 0 and 1 alike.
    if n > 1 {
        "s"
    } else {
        ""
    }
}

pub fn format_location(city: Option<&str>, state: Option<&str>) -> String {
    let joined = match (present(city), present(state)) {
        (Some(city), Some(state)) => format!("{city}, {state}"),
        (Some(one), None) | (None, Some(one)) => one.to_string(),
        (None, None) => String::new(),
    };
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        DEFAULT_LOCATION.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_salary(
    min: Option<f64>,
    max: Option<f64>,
    currency: Option<&str>,
    period: Option<&str>,
) -> String {
    match (present_number(min), present_number(max)) {
        (Some(min), Some(max)) => format!(
            "{min} - {max} {} {}",
            currency.unwrap_or_default(),
            period.unwrap_or_default()
        )
        .trim()
        .to_string(),
        _ => SALARY_NOT_DISCLOSED.to_string(),
    }
}

pub fn format_experience(months: Option<u32>) -> String {
    match months {
        None | Some(0) => EXPERIENCE_NOT_SPECIFIED.to_string(),
        Some(months) if months >= 12 => {
            let years = months / 12;
            let remaining = months % 12;
            let mut out = format!("{years} year{}", plural(years));
            if remaining > 0 {
                out.push_str(&format!(" {remaining} month{}", plural(remaining)));
            }
            out
        }
        Some(months) => format!("{months} month{}", plural(months)),
    }
}

/// `FULL_TIME` → `Full Time`. Word starts follow ASCII word-character boundaries,
/// so `full-time` becomes `Full-Time`.
pub fn format_job_type(raw: Option<&str>) -> String {
    let Some(raw) = present(raw) else {
        return DEFAULT_JOB_TYPE.to_string();
    };
    let lowered = raw.replace('_', " ").to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_word = false;
    for c in lowered.chars() {
        let is_word_char = c.is_ascii_alphanumeric() || c == '_';
        if is_word_char && !in_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        in_word = is_word_char;
    }
    out
}

pub fn format_description(raw: Option<&str>) -> String {
    match raw {
        Some(text) => {
            let preview: String = text.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
            format!("{preview}...")
        }
        None => NO_DESCRIPTION.to_string(),
    }
}

/// Random stand-in for a match score. There is no matching algorithm behind it.
pub fn placeholder_match_percentage() -> u8 {
    rand::rng().random_range(MATCH_PERCENTAGE_RANGE)
}

pub fn normalize_listing(listing: &RawJobListing) -> Job {
    Job {
        title: present(listing.job_title.as_deref())
            .unwrap_or(MISSING_FIELD)
            .to_string(),
        company: present(listing.employer_name.as_deref())
            .unwrap_or(MISSING_FIELD)
            .to_string(),
        location: format_location(listing.job_city.as_deref(), listing.job_state.as_deref()),
        match_percentage: placeholder_match_percentage(),
        apply_url: present(listing.job_apply_link.as_deref())
            .unwrap_or(APPLY_URL_PLACEHOLDER)
            .to_string(),
        description: format_description(listing.job_description.as_deref()),
        salary_range: format_salary(
            listing.job_min_salary,
            listing.job_max_salary,
            listing.job_salary_currency.as_deref(),
            listing.job_salary_period.as_deref(),
        ),
        experience_required: format_experience(
            listing
                .job_required_experience
                .as_ref()
                .and_then(|e| e.required_experience_in_months),
        ),
        job_type: format_job_type(listing.job_employment_type.as_deref()),
    }
}
