use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resumes::store::ResumeDocument;
use crate::state::AppState;

/// Content types browsers send when they don't know better; the file name is
/// a better hint for those.
const GENERIC_CONTENT_TYPES: [&str; 2] = ["application/octet-stream", "binary/octet-stream"];

struct Upload {
    declared: String,
    bytes: Bytes,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}

/// POST /api/v1/resumes
/// Multipart form: `file` (required), `resume_id` (optional, uploads a new version).
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeDocument>, AppError> {
    let mut upload: Option<Upload> = None;
    let mut resume_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let declared = match (content_type, file_name) {
                    (Some(ct), Some(name)) if GENERIC_CONTENT_TYPES.contains(&ct.as_str()) => name,
                    (Some(ct), _) => ct,
                    (None, Some(name)) => name,
                    (None, None) => String::new(),
                };
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some(Upload { declared, bytes });
            }
            Some("resume_id") => {
                let raw = field.text().await.map_err(multipart_error)?;
                let id = raw
                    .trim()
                    .parse::<Uuid>()
                    .map_err(|_| AppError::Validation(format!("invalid resume_id '{raw}'")))?;
                resume_id = Some(id);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    let doc = state
        .pipeline
        .ingest_resume(resume_id, &upload.declared, upload.bytes)
        .await?;
    Ok(Json(doc))
}

/// GET /api/v1/resumes/:resume_id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<ResumeDocument>, AppError> {
    Ok(Json(state.pipeline.resume(resume_id).await?))
}
