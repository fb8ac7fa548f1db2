//! Document analysis route. Accepts JSON or a multipart upload.

use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use docops_analyze::{de, AnalyzeOptions, DocType};
use docops_ingest::{
    parse_document, validate_file_type, DocumentSource, ParsedDocument, SupportedFileType,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::ApiError;
use crate::state::AppState;

const MIN_TEXT_CHARS: usize = 10;
const ANALYSIS_FAILED: &str = "Failed to analyze document. Please try again.";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/analyze", post(analyze))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalyzeRequest {
    #[serde(deserialize_with = "de::lenient_string")]
    text: Option<String>,
    #[serde(deserialize_with = "de::lenient_bool")]
    mock_mode: bool,
    #[serde(deserialize_with = "de::lenient")]
    doc_type: Option<DocType>,
}

/// Text to analyze plus where it came from.
struct Submission {
    document: ParsedDocument,
    file_name: Option<String>,
    options: AnalyzeOptions,
}

/// POST /api/analyze — classify a pasted or uploaded document.
async fn analyze(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let submission = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?;
        from_multipart(&state, multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<AnalyzeRequest>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))?;
        from_json(body)?
    } else {
        return Err(ApiError::bad_request("Invalid content type"));
    };

    let Submission {
        document,
        file_name,
        options,
    } = submission;

    if document.text.chars().count() < MIN_TEXT_CHARS {
        return Err(ApiError::bad_request(
            "Document content is too short for analysis",
        ));
    }

    info!(
        file_type = %document.file_type,
        chars = document.text.len(),
        mock_mode = options.mock_mode,
        "Analyzing document"
    );

    let analysis = state
        .analyzer()
        .analyze(&document.text, options)
        .await
        .map_err(|e| {
            error!("Analysis error: {}", e);
            ApiError::internal(ANALYSIS_FAILED)
        })?;

    Ok(Json(json!({
        "success": true,
        "analysis": analysis,
        "extractedText": document.text,
        "metadata": {
            "fileName": file_name,
            "fileType": document.file_type,
            "textLength": document.text.chars().count(),
            "pageCount": document.metadata.page_count,
            "analyzedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    })))
}

fn from_json(body: AnalyzeRequest) -> Result<Submission, ApiError> {
    let text = body
        .text
        .ok_or_else(|| ApiError::bad_request("No text provided"))?;
    let document = parse_document(DocumentSource::PlainString(text), SupportedFileType::Paste)
        .map_err(|e| ApiError::from_error(e, ANALYSIS_FAILED))?;
    Ok(Submission {
        document,
        file_name: None,
        options: AnalyzeOptions {
            mock_mode: body.mock_mode,
            doc_type_hint: body.doc_type,
        },
    })
}

async fn from_multipart(state: &AppState, mut multipart: Multipart) -> Result<Submission, ApiError> {
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut text: Option<String> = None;
    let mut options = AnalyzeOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                upload = Some((file_name, mime, bytes.to_vec()));
            }
            "text" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                text = Some(value).filter(|t| !t.trim().is_empty());
            }
            "mockMode" => {
                let value = field.text().await.unwrap_or_default();
                options.mock_mode = value.trim().eq_ignore_ascii_case("true");
            }
            "docType" => {
                let value = field.text().await.unwrap_or_default();
                options.doc_type_hint = value.parse().ok();
            }
            _ => {}
        }
    }

    if let Some((file_name, mime, bytes)) = upload {
        let file_type = validate_file_type(&file_name, mime.as_deref()).ok_or_else(|| {
            ApiError::bad_request("Unsupported file format. Please upload PDF, DOCX, or TXT files.")
        })?;
        if bytes.len() as u64 > state.config.max_upload_bytes() {
            return Err(ApiError::payload_too_large(format!(
                "File too large. Maximum size is {}MB.",
                state.config.max_upload_mb
            )));
        }

        let document = tokio::task::spawn_blocking(move || {
            parse_document(DocumentSource::RawBytes(bytes), file_type)
        })
        .await
        .map_err(|e| {
            error!("Document parser task failed: {}", e);
            ApiError::internal(ANALYSIS_FAILED)
        })?
        .map_err(|e| ApiError::from_error(e, ANALYSIS_FAILED))?;

        return Ok(Submission {
            document,
            file_name: Some(file_name),
            options,
        });
    }

    let text = text.ok_or_else(|| ApiError::bad_request("No file or text provided"))?;
    let document = parse_document(DocumentSource::PlainString(text), SupportedFileType::Paste)
        .map_err(|e| ApiError::from_error(e, ANALYSIS_FAILED))?;
    Ok(Submission {
        document,
        file_name: None,
        options,
    })
}
