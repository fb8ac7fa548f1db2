//! LLM provider configuration and status.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use docops_llm::LlmConfigUpdate;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, ApiResultExt};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/llm/config", get(get_config).put(update_config))
        .route("/llm/status", get(status))
}

/// GET /api/llm/config — current settings with keys masked.
async fn get_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    let response = state.llm_config.read().to_response();
    Json(json!({ "success": true, "config": response }))
}

/// PUT /api/llm/config — merge, persist and swap in a new analyzer.
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<LlmConfigUpdate>,
) -> Result<Json<Value>, ApiError> {
    let response = {
        let mut current = state.llm_config.write();
        let mut updated = current.clone();
        updated.apply_update(&update);
        updated.save().or_api("Failed to save LLM config")?;
        let response = updated.to_response();
        *current = updated;
        response
    };
    state.reload_analyzer();
    info!(
        provider = response.active_provider.as_deref().unwrap_or("none"),
        "LLM config updated"
    );
    Ok(Json(json!({ "success": true, "config": response })))
}

/// GET /api/llm/status
async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let resolved = state.llm_config.read().resolve_provider();
    let analyzer = state.analyzer();
    Json(json!({
        "success": true,
        "llmAvailable": analyzer.uses_model(),
        "provider": resolved.as_ref().map(|r| r.provider.to_string()),
        "model": resolved.map(|r| r.model),
        "mockMode": state.config.mock_ai,
    }))
}
