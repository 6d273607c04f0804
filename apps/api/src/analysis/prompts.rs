// Prompt and response schema for résumé analysis.

use serde_json::{json, Value};

/// Fixed extraction instruction sent alongside the résumé document.
pub const ANALYSIS_INSTRUCTION: &str = "Analyze the attached resume. Extract the following information in JSON format:
1. score: An overall score for the resume out of 100, based on clarity, skills, and experience.
2. experience_level: The candidate's experience level (e.g., 'Entry-Level', 'Mid-Level', 'Senior').
3. total_experience: The total years of professional experience as a number.
4. feedback: An array of 3-5 concise, actionable suggestions to improve the resume.
5. skills: An array of objects, each representing a skill. Each skill object should have 'name' (string), 'category' ('technical', 'soft', or 'domain'), and 'confidence' (a number between 0 and 1 representing your confidence in this skill being present and relevant).
6. job_titles: An array of 3-5 suitable job titles based on the resume content.";

/// Strict output schema the model is constrained to.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {
                "type": "NUMBER",
                "description": "Overall score for the resume out of 100."
            },
            "experience_level": {
                "type": "STRING",
                "description": "Candidate's experience level (e.g., 'Entry-Level', 'Mid-Level', 'Senior')."
            },
            "total_experience": {
                "type": "NUMBER",
                "description": "Total years of professional experience as a number."
            },
            "feedback": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "An array of 3-5 concise, actionable suggestions to improve the resume."
            },
            "skills": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "category": { "type": "STRING", "enum": ["technical", "soft", "domain"] },
                        "confidence": {
                            "type": "NUMBER",
                            "description": "A number between 0 and 1 representing confidence."
                        }
                    },
                    "required": ["name", "category", "confidence"]
                }
            },
            "job_titles": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "An array of 3-5 suitable job titles based on the resume content."
            }
        },
        "required": ["score", "experience_level", "total_experience", "feedback", "skills", "job_titles"]
    })
}
