//! Résumé Analyzer — sends one document to the AI provider and parses the structured reply.
//!
//! The analyzer never fails loudly: every problem is classified into an
//! [`AnalyzeError`] whose `Display` text is the message shown to the user.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::encoder::{encode_file, UploadedFile};
use crate::analysis::prompts::{analysis_schema, ANALYSIS_INSTRUCTION};
use crate::config::Config;
use crate::llm_client::{InlineDocument, LlmClient, LlmError};
use crate::models::analysis::Analysis;

pub const CONNECTIVITY_MESSAGE: &str = "Failed to connect to the AI service. This is often caused by an invalid or improperly configured Google Gemini API key. Please verify your API key in the environment settings and check your network connection.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzeError {
    #[error("AI features are disabled. Please configure your Google Gemini API key to proceed.")]
    Disabled,

    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity,

    /// Provider-reported failure, passed through verbatim.
    #[error("{0}")]
    Provider(String),

    /// The document itself could not be prepared for upload.
    #[error("{0}")]
    Input(String),

    #[error("An unknown error occurred during resume analysis.")]
    Unknown,
}

impl From<LlmError> for AnalyzeError {
    fn from(err: LlmError) -> Self {
        if err.is_connectivity() {
            return AnalyzeError::Connectivity;
        }
        match err {
            LlmError::Api { message, .. } if !message.trim().is_empty() => {
                AnalyzeError::Provider(message)
            }
            _ => AnalyzeError::Unknown,
        }
    }
}

/// `{data, error}` pair handed to the browser: exactly one side is non-null.
#[derive(Debug, Serialize)]
pub struct AnalysisEnvelope {
    pub data: Option<Analysis>,
    pub error: Option<String>,
}

impl From<Result<Analysis, AnalyzeError>> for AnalysisEnvelope {
    fn from(result: Result<Analysis, AnalyzeError>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, file: &UploadedFile) -> Result<Analysis, AnalyzeError>;
}

/// Gemini-backed analyzer. Holds no client when the API key is missing, so a
/// disabled analyzer cannot reach the network.
pub struct GeminiAnalyzer {
    llm: Option<LlmClient>,
}

impl GeminiAnalyzer {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config
                .gemini_api_key
                .clone()
                .map(|key| LlmClient::new(key, &config.gemini_api_base)),
        )
    }
}

#[async_trait]
impl ResumeAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, file: &UploadedFile) -> Result<Analysis, AnalyzeError> {
        let Some(llm) = &self.llm else {
            error!("Gemini API key is missing.");
            return Err(AnalyzeError::Disabled);
        };

        let encoded = encode_file(file).map_err(|e| {
            warn!("Could not encode {}: {e}", file.name);
            AnalyzeError::Input(e.to_string())
        })?;

        let document = InlineDocument {
            mime_type: &file.media_type,
            data: &encoded,
        };

        match llm
            .generate_json::<Analysis>(document, ANALYSIS_INSTRUCTION, &analysis_schema())
            .await
        {
            Ok(analysis) => {
                info!(
                    "Analyzed {}: score={} level={} titles={}",
                    file.name,
                    analysis.score,
                    analysis.experience_level,
                    analysis.job_titles.len()
                );
                Ok(analysis)
            }
            Err(e) => {
                error!("Error analyzing resume: {e}");
                Err(e.into())
            }
        }
    }
}
