//! Case notes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use docops_analyze::de;
use docops_store::NoteType;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResultExt};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/cases/{id}/notes", get(list_notes).post(add_note))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AddNoteRequest {
    #[serde(deserialize_with = "de::lenient_string")]
    content: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    note_type: Option<NoteType>,
    #[serde(deserialize_with = "de::lenient_string")]
    author: Option<String>,
}

async fn list_notes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let notes = state.store.list_notes(&id).or_api("Failed to fetch notes")?;
    Ok(Json(json!({ "success": true, "notes": notes })))
}

async fn add_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AddNoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let content = body.content.unwrap_or_default();
    let note = state
        .store
        .add_note(
            &id,
            &content,
            body.note_type.unwrap_or_default(),
            body.author.as_deref(),
        )
        .or_api("Failed to add note")?;
    Ok(Json(json!({ "success": true, "note": note })))
}
