use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::analysis::{Analysis, Skill};
use crate::models::job::Job;

/// A single improvement suggestion, stored wrapped for the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub suggestion: String,
}

/// Insert payload for one completed pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewResumeRecord {
    pub user_id: Uuid,
    pub filename: String,
    pub file_url: String,
    pub score: f64,
    pub experience_level: String,
    pub total_experience: f64,
    pub feedback: Vec<FeedbackItem>,
    pub skills: Vec<Skill>,
    pub matched_jobs: Vec<Job>,
}

impl NewResumeRecord {
    pub fn new(
        user_id: Uuid,
        filename: &str,
        file_url: String,
        analysis: Analysis,
        matched_jobs: Vec<Job>,
    ) -> Self {
        Self {
            user_id,
            filename: filename.to_string(),
            file_url,
            score: analysis.score,
            experience_level: analysis.experience_level,
            total_experience: analysis.total_experience,
            feedback: analysis
                .feedback
                .into_iter()
                .map(|suggestion| FeedbackItem { suggestion })
                .collect(),
            skills: analysis.skills,
            matched_jobs,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub file_url: String,
    pub score: f64,
    pub experience_level: String,
    pub total_experience: f64,
    pub feedback: Json<Vec<FeedbackItem>>,
    pub skills: Json<Vec<Skill>>,
    pub matched_jobs: Json<Vec<Job>>,
    pub created_at: DateTime<Utc>,
}
