//! HTTP route handlers.

pub mod analyze;
pub mod audit;
pub mod cases;
pub mod llm;
pub mod notes;
pub mod stats;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Multipart framing on top of the file itself.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes() as usize + BODY_LIMIT_SLACK;
    Router::new()
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(analyze::routes())
        .merge(cases::routes())
        .merge(notes::routes())
        .merge(audit::routes())
        .merge(stats::routes())
        .merge(llm::routes())
}
