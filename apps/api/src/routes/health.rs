use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::config::Capabilities;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careerspark-api"
    }))
}

/// GET /api/v1/capabilities
/// Lets the client grey out features whose credentials are missing.
pub async fn capabilities_handler(State(state): State<AppState>) -> Json<Capabilities> {
    Json(state.capabilities)
}
