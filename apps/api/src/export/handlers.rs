//! Axum route handlers for export (download and print).

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::ProvidedName;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Absent or blank cancels the export.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// POST /api/v1/sessions/:id/export/pdf
///
/// 200 with the PDF as an attachment, or 204 when no file name was given
/// (the prompt was cancelled).
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<ExportRequest>>,
) -> Result<Response, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session = state.session(id).await?;
    // Render and release the lock; the export itself runs unlocked.
    let (rendered, pipeline) = {
        let session = session.lock().await;
        (session.render(), session.export.clone())
    };

    let prompt = ProvidedName(request.file_name);
    let Some(file) = pipeline.export_as_download(&rendered, &prompt).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe_file_name(&file.file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// GET /api/v1/sessions/:id/export/print
///
/// Print-ready page that opens the browser's print dialog when loaded.
pub async fn handle_export_print(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let session = state.session(id).await?;
    let (rendered, pipeline) = {
        let session = session.lock().await;
        (session.render(), session.export.clone())
    };
    let html = pipeline.export_as_print(&rendered, state.theme.get())?;
    Ok(Html(html))
}

/// Quotes, backslashes and control characters cannot appear in a quoted header value.
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == '"' || c == '\\' || c.is_control() || !c.is_ascii() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe_file_name() {
        assert_eq!(header_safe_file_name("Ada Lovelace.pdf"), "Ada Lovelace.pdf");
        assert_eq!(header_safe_file_name("a\"b\\c\n.pdf"), "a_b_c_.pdf");
        assert_eq!(header_safe_file_name("José.pdf"), "Jos_.pdf");
    }
}
