//! Case CRUD routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use docops_analyze::{de, normalize, PartialAnalysis};
use docops_store::{CaseFilter, CaseUpdate, ClassificationConfirmation, NewCase};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResultExt};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cases", get(list_cases).post(create_case))
        .route(
            "/cases/{id}",
            get(get_case).patch(update_case).delete(delete_case),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ListQuery {
    team: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    search: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
    page: Option<usize>,
    limit: Option<usize>,
}

/// Parse an optional enum query param; blank means "no filter".
fn parse_param<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = docops_core::Error>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|e| ApiError::from_error(e, "Invalid query parameter")),
        None => Ok(None),
    }
}

impl ListQuery {
    fn into_filter(self) -> Result<CaseFilter, ApiError> {
        let defaults = CaseFilter::default();
        Ok(CaseFilter {
            team: parse_param(self.team.as_deref())?,
            priority: parse_param(self.priority.as_deref())?,
            status: parse_param(self.status.as_deref())?,
            search: self.search,
            sort_by: self.sort_by.unwrap_or(defaults.sort_by),
            sort_order: parse_param(self.sort_order.as_deref())?.unwrap_or(defaults.sort_order),
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        })
    }
}

/// GET /api/cases — filtered, paginated listing.
async fn list_cases(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = query.into_filter()?;
    let page = state.store.list_cases(&filter).or_api("Failed to fetch cases")?;
    Ok(Json(json!({ "success": true, "data": page })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CreateCaseRequest {
    #[serde(deserialize_with = "de::lenient_string")]
    file_name: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    file_type: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    original_text: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    analysis_result: Option<PartialAnalysis>,
    #[serde(deserialize_with = "de::lenient")]
    user_edits: Option<PartialAnalysis>,
    #[serde(deserialize_with = "de::lenient")]
    classification_confirmation: Option<ClassificationConfirmation>,
}

/// POST /api/cases — file an analyzed document as a case.
async fn create_case(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCaseRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(original_text), Some(analysis)) = (body.original_text, body.analysis_result) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let case = state
        .store
        .create_case(NewCase {
            file_name: body.file_name,
            file_type: body.file_type,
            original_text,
            analysis: normalize(analysis),
            user_edits: body.user_edits,
            classification: body.classification_confirmation,
        })
        .or_api("Failed to create case")?;

    Ok(Json(json!({ "success": true, "case": case })))
}

/// GET /api/cases/{id} — case with notes and audit trail.
async fn get_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let detail = state
        .store
        .get_case(&id)
        .or_api("Failed to fetch case")?
        .ok_or_else(|| ApiError::not_found("Case not found"))?;
    Ok(Json(json!({ "success": true, "case": detail })))
}

/// PATCH /api/cases/{id} — partial update with an audit event.
async fn update_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<CaseUpdate>,
) -> Result<Json<Value>, ApiError> {
    let case = state
        .store
        .update_case(&id, &update)
        .or_api("Failed to update case")?;
    Ok(Json(json!({ "success": true, "case": case })))
}

/// DELETE /api/cases/{id}
async fn delete_case(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.store.delete_case(&id).or_api("Failed to delete case")? {
        return Err(ApiError::not_found("Case not found"));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Case deleted successfully",
    })))
}
