//! Axum route handlers for sessions, template selection and preview.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::ExportState;
use crate::models::ResumeDocument;
use crate::render::{render_page, PageMode, TemplateVariant};
use crate::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub document: ResumeDocument,
    pub template: TemplateVariant,
    pub template_label: &'static str,
    /// Default answer for the export file-name prompt.
    pub suggested_file_name: String,
    pub export_state: ExportState,
    pub generating: bool,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            document: session.document.clone(),
            template: session.template,
            template_label: session.template.label(),
            suggested_file_name: session.render().suggested_file_name,
            export_state: session.export.state(),
            generating: session.generation.is_busy(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectTemplateRequest {
    pub variant: TemplateVariant,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = state.sessions.insert(state.new_session()).await;
    let session = session.lock().await;
    let active = state.sessions.len().await;
    info!(session = %session.id, active, "Session started");
    (StatusCode::CREATED, Json(SessionResponse::from(&*session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.session(id).await?;
    let session = session.lock().await;
    Ok(Json(SessionResponse::from(&*session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(id).await {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    info!(session = %id, "Session discarded");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectTemplateRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.session(id).await?;
    let mut session = session.lock().await;
    session.template = request.variant;
    Ok(Json(SessionResponse::from(&*session)))
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let session = state.session(id).await?;
    let rendered = session.lock().await.render();
    Ok(Html(render_page(&rendered, state.theme.get(), PageMode::Preview)))
}
