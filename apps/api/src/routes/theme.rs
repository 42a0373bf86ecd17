use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::theme::Theme;

#[derive(Debug, Deserialize)]
pub struct SetThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
    pub changed: bool,
}

/// GET /api/v1/theme
pub async fn handle_get_theme(State(state): State<AppState>) -> Json<ThemeResponse> {
    Json(ThemeResponse {
        theme: state.theme.get(),
        changed: false,
    })
}

/// PUT /api/v1/theme
///
/// Only the preview chrome follows the theme; resumes and exports do not.
pub async fn handle_set_theme(
    State(state): State<AppState>,
    Json(request): Json<SetThemeRequest>,
) -> Json<ThemeResponse> {
    let changed = state.theme.set(request.theme);
    Json(ThemeResponse {
        theme: request.theme,
        changed,
    })
}
