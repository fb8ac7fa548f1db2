//! Per-case audit trail.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use docops_analyze::de;
use docops_store::{AuditEventType, NewAuditEvent};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResultExt};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/cases/{id}/audit", get(list_events).post(add_event))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AddEventRequest {
    #[serde(deserialize_with = "de::lenient_string")]
    event_type: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    description: Option<String>,
    metadata: Option<Value>,
    changes: Option<Value>,
    #[serde(deserialize_with = "de::lenient_string")]
    actor: Option<String>,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let events = state
        .store
        .list_audit_events(&id)
        .or_api("Failed to fetch audit events")?;
    Ok(Json(json!({ "success": true, "events": events })))
}

async fn add_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AddEventRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(event_type), Some(description)) = (body.event_type, body.description) else {
        return Err(ApiError::bad_request(
            "Event type and description are required",
        ));
    };
    let event_type: AuditEventType = event_type
        .parse()
        .map_err(|e| ApiError::from_error(e, "Failed to add audit event"))?;

    let mut event = NewAuditEvent::new(event_type, description);
    if let Some(actor) = body.actor.filter(|a| !a.trim().is_empty()) {
        event.actor = actor;
    }
    event.metadata = body.metadata.filter(|m| !m.is_null());
    event.changes = body.changes.filter(|c| !c.is_null());

    let event = state
        .store
        .add_audit_event(&id, event)
        .or_api("Failed to add audit event")?;
    Ok(Json(json!({ "success": true, "event": event })))
}
