use axum::Json;
use serde::Serialize;

use crate::render::TemplateVariant;

#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub variant: TemplateVariant,
    pub label: &'static str,
}

/// GET /api/v1/templates
/// The selectable variants, in menu order.
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(
        TemplateVariant::ALL
            .into_iter()
            .map(|variant| TemplateInfo {
                variant,
                label: variant.label(),
            })
            .collect(),
    )
}
