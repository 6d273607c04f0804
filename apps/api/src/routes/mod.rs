pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/capabilities", get(health::capabilities_handler))
        // Pipeline
        .route(
            "/api/v1/resumes/analyze",
            post(handlers::handle_analyze_resume),
        )
        .route("/api/v1/analysis", post(handlers::handle_analysis))
        .route("/api/v1/runs/current", get(handlers::handle_current_run))
        .route("/api/v1/resumes/:id", get(handlers::handle_get_resume))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
