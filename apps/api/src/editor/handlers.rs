//! Axum route handlers for the form editor.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::editor::{parse_section, FormPath, PhotoSource};
use crate::errors::AppError;
use crate::models::ResumeDocument;
use crate::session::spawn_photo_upload;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetFieldRequest {
    pub path: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct AppendResponse {
    pub index: usize,
    pub form: Value,
}

/// GET /api/v1/sessions/:id/form
pub async fn handle_get_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = state.session(id).await?;
    let form = session.lock().await.editor.form();
    Ok(Json(form))
}

/// PATCH /api/v1/sessions/:id/form
///
/// Sets one field. The document is unchanged until the form is saved.
pub async fn handle_set_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetFieldRequest>,
) -> Result<Json<Value>, AppError> {
    let path: FormPath = request.path.parse()?;
    let session = state.session(id).await?;
    let mut session = session.lock().await;
    session.editor.set_field(&path, request.value)?;
    Ok(Json(session.editor.form()))
}

/// POST /api/v1/sessions/:id/form/:section
///
/// Appends a blank entry to a repeatable section.
pub async fn handle_append_entry(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
) -> Result<(StatusCode, Json<AppendResponse>), AppError> {
    let key = parse_section(&section)?;
    let session = state.session(id).await?;
    let mut session = session.lock().await;
    let index = session.editor.append(key, key.blank_entry());
    Ok((
        StatusCode::CREATED,
        Json(AppendResponse {
            index,
            form: session.editor.form(),
        }),
    ))
}

/// DELETE /api/v1/sessions/:id/form/:section/:index
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, String, usize)>,
) -> Result<Json<Value>, AppError> {
    let key = parse_section(&section)?;
    let session = state.session(id).await?;
    let mut session = session.lock().await;
    session.editor.remove(key, index)?;
    Ok(Json(session.editor.form()))
}

/// POST /api/v1/sessions/:id/form/photo
///
/// Accepts a multipart image (the first file part) and returns immediately.
/// The read and encode happen in the background; the last read to finish wins.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let session = state.session(id).await?;

    let mut source = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.file_name().is_none() && field.name() != Some("photo") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        source = Some(PhotoSource::Bytes { content_type, data });
        break;
    }

    let source = source.ok_or_else(|| AppError::Validation("No photo in upload".to_string()))?;
    spawn_photo_upload(session, source, state.photo_limits());

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "reading" }))))
}

/// POST /api/v1/sessions/:id/form/save
///
/// Commits the form: normalizes it into a new document.
pub async fn handle_save_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDocument>, AppError> {
    let session = state.session(id).await?;
    let mut session = session.lock().await;
    Ok(Json(session.save_form().clone()))
}
