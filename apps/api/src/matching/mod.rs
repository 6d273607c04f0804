//! Job Matcher — best-effort enrichment of an analysis with live job listings.
//!
//! Flow: titles → one disjunctive JSearch query → first 5 listings → normalized `Job`s.
//! The matcher never fails: a missing key, an empty title list, a transport error,
//! a non-success status or a malformed body all collapse to an empty list.

pub mod normalize;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::matching::normalize::{normalize_listing, parse_listing, ListingParse};
use crate::models::job::Job;

/// Listings kept per run.
pub const RESULT_LIMIT: usize = 5;
const SEARCH_COUNTRY: &str = "IN";
const SEARCH_PAGES: &str = "1";
const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
enum MatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSearch API request failed with status {0}")]
    Status(u16),

    #[error("JSearch API returned invalid data format: {0}")]
    Shape(String),
}

#[async_trait]
pub trait JobMatcher: Send + Sync {
    async fn find_matching_jobs(&self, job_titles: &[String]) -> Vec<Job>;
}

/// JSearch (RapidAPI) backed matcher.
pub struct JSearchMatcher {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl JSearchMatcher {
    pub fn new(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jsearch_api_key.clone(), &config.jsearch_api_base)
    }

    async fn search(&self, api_key: &str, query: &str) -> Result<Vec<Job>, MatchError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("query", query),
                ("country", SEARCH_COUNTRY),
                ("num_pages", SEARCH_PAGES),
            ])
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MatchError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        let listings = match body.get("data").and_then(Value::as_array) {
            Some(listings) => listings,
            None => return Err(MatchError::Shape(body.to_string())),
        };

        let jobs = listings
            .iter()
            .take(RESULT_LIMIT)
            .enumerate()
            .filter_map(|(index, raw)| match parse_listing(raw.clone()) {
                ListingParse::Valid(listing) => Some(normalize_listing(&listing)),
                ListingParse::ShapeError(reason) => {
                    warn!("Skipping malformed JSearch listing #{index}: {reason}");
                    None
                }
            })
            .collect();

        Ok(jobs)
    }
}

/// Joins titles into one disjunctive search query.
pub fn build_query(job_titles: &[String]) -> String {
    job_titles.join(" or ")
}

#[async_trait]
impl JobMatcher for JSearchMatcher {
    async fn find_matching_jobs(&self, job_titles: &[String]) -> Vec<Job> {
        let Some(api_key) = &self.api_key else {
            error!("JSearch API key is missing. Skipping job search.");
            return Vec::new();
        };
        if job_titles.is_empty() {
            return Vec::new();
        }

        let query = build_query(job_titles);
        match self.search(api_key, &query).await {
            Ok(jobs) => {
                info!("JSearch returned {} matches for {:?}", jobs.len(), query);
                jobs
            }
            Err(e) => {
                error!("Error finding matching jobs with JSearch: {e}");
                Vec::new()
            }
        }
    }
}
