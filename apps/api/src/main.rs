mod analysis;
mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod routes;
mod state;
mod storage;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::GeminiAnalyzer;
use crate::config::{BackendConfig, Config};
use crate::db::create_pool;
use crate::matching::JSearchMatcher;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{ResumeStore, S3PgStore, UnconfiguredStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerSpark API v{}", env!("CARGO_PKG_VERSION"));

    let capabilities = config.capabilities();
    info!(
        "Capabilities: ai={} job_search={} backend={}",
        capabilities.ai, capabilities.job_search, capabilities.backend
    );
    if !capabilities.ai {
        warn!("GEMINI_API_KEY is not configured; resume analysis is disabled");
    }
    if !capabilities.job_search {
        warn!("JSEARCH_API_KEY is not configured; job matching will return no results");
    }

    // Initialize PostgreSQL + S3 / MinIO
    let store: Arc<dyn ResumeStore> = match &config.backend {
        Some(backend) => {
            let db = create_pool(&backend.database_url).await?;
            let s3 = build_s3_client(backend).await;
            info!("S3 client initialized (bucket: {})", backend.s3_bucket);
            Arc::new(S3PgStore::new(
                db,
                s3,
                &backend.s3_bucket,
                &backend.s3_public_url,
            ))
        }
        None => {
            warn!("Storage backend is not configured; results cannot be saved");
            Arc::new(UnconfiguredStore)
        }
    };

    // Initialize AI analyzer and job matcher
    let analyzer = Arc::new(GeminiAnalyzer::from_config(&config));
    info!("Analyzer initialized (model: {})", llm_client::MODEL);
    let matcher = Arc::new(JSearchMatcher::from_config(&config));

    let port = config.port;
    let state = AppState::new(config, analyzer, matcher, store);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(backend: &BackendConfig) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &backend.aws_access_key_id,
        &backend.aws_secret_access_key,
        None,
        None,
        "careerspark-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&backend.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
