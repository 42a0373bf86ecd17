//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::GenerationError;
use crate::models::ResumeDocument;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub user_description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub session_id: Uuid,
    pub document: ResumeDocument,
    /// The editor, freshly reseeded from `document`.
    pub form: Value,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/generate
///
/// Calls the generation service once. On success the session's document is
/// replaced and the editor reseeded; on failure the session is left untouched.
/// A second request while one is pending gets 409.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let session = state.session(id).await?;
    let guard = session.lock().await.generation.clone();
    let _token = guard
        .try_acquire()
        .ok_or_else(|| AppError::Busy("A generation is already in progress".to_string()))?;

    info!(session = %id, chars = request.user_description.len(), "Generating resume");
    let timeout = state.config.generation_timeout;
    let payload = tokio::time::timeout(timeout, state.generator.generate(&request.user_description))
        .await
        .map_err(|_| GenerationError::Timeout(timeout.as_secs()))??;

    let document = payload.into_document();
    let mut session = session.lock().await;
    session.apply_generation(document);

    Ok(Json(GenerateResponse {
        session_id: id,
        document: session.document.clone(),
        form: session.editor.form(),
    }))
}
