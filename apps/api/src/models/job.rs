use serde::{Deserialize, Serialize};

/// Display-ready projection of one job-search listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Placeholder value in [70, 100). Not derived from the résumé; do not rank on it.
    pub match_percentage: u8,
    pub apply_url: String,
    pub description: String,
    pub salary_range: String,
    pub experience_required: String,
    pub job_type: String,
}
