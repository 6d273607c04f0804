use anyhow::{Context, Result};
use serde::Serialize;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_JSEARCH_API_BASE: &str = "https://jsearch.p.rapidapi.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Object storage + relational store credentials. Present only when every
/// required variable is configured.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

/// Application configuration loaded once from environment variables at startup.
///
/// Missing credentials never fail startup; they switch the corresponding feature off
/// (see [`Capabilities`]). Only malformed values such as a non-numeric `PORT` are errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub jsearch_api_key: Option<String>,
    pub jsearch_api_base: String,
    pub backend: Option<BackendConfig>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Which external services are usable in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub ai: bool,
    pub job_search: bool,
    pub backend: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let configured = |key: &str| lookup(key).filter(|v| is_configured_secret(v));

        let backend = match (
            configured("DATABASE_URL"),
            configured("S3_BUCKET"),
            configured("S3_ENDPOINT"),
            configured("AWS_ACCESS_KEY_ID"),
            configured("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(database_url), Some(s3_bucket), Some(s3_endpoint), Some(key_id), Some(secret)) => {
                let s3_public_url = configured("S3_PUBLIC_URL").unwrap_or_else(|| s3_endpoint.clone());
                Some(BackendConfig {
                    database_url,
                    s3_bucket,
                    s3_public_url: s3_public_url.trim_end_matches('/').to_string(),
                    s3_endpoint,
                    aws_access_key_id: key_id,
                    aws_secret_access_key: secret,
                })
            }
            _ => None,
        };

        Ok(Config {
            gemini_api_key: configured("GEMINI_API_KEY").or_else(|| configured("API_KEY")),
            gemini_api_base: lookup("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            jsearch_api_key: configured("JSEARCH_API_KEY"),
            jsearch_api_base: lookup("JSEARCH_API_BASE")
                .unwrap_or_else(|| DEFAULT_JSEARCH_API_BASE.to_string()),
            backend,
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            ai: self.gemini_api_key.is_some(),
            job_search: self.jsearch_api_key.is_some(),
            backend: self.backend.is_some(),
        }
    }
}

/// A credential counts as configured when it is non-blank and not one of the
/// placeholder values shipped in sample `.env` files.
pub fn is_configured_secret(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    let lower = value.to_lowercase();
    !(lower.starts_with("your-")
        || lower.starts_with("your_")
        || lower.contains("placeholder")
        || lower == "changeme")
}
