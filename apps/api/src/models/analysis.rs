use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    Soft,
    Domain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: SkillCategory,
    /// 0.0 – 1.0 as reported by the model. Not re-validated locally.
    pub confidence: f64,
}

/// Structured résumé analysis returned by the AI provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub score: f64, // 0 – 100
    pub experience_level: String,
    pub total_experience: f64,
    pub feedback: Vec<String>,
    pub skills: Vec<Skill>,
    pub job_titles: Vec<String>,
}
