use std::sync::Arc;

use crate::config::Config;
use crate::editor::PhotoLimits;
use crate::errors::AppError;
use crate::export::{ExportPipeline, Rasterizer};
use crate::generation::ResumeGenerator;
use crate::layout::CanvasConfig;
use crate::session::{Session, SessionStore, SharedSession};
use crate::theme::ThemeState;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Remote generation service. Default: the HTTP `GenerationClient`.
    pub generator: Arc<dyn ResumeGenerator>,
    /// Capture rasterizer. Default: `SvgRasterizer` (resvg).
    pub rasterizer: Arc<dyn Rasterizer>,
    pub theme: ThemeState,
    /// Capture canvas: A4 width at 96 dpi.
    pub canvas: CanvasConfig,
}

impl AppState {
    /// A new session wired to this process's rasterizer and export timeout.
    pub fn new_session(&self) -> Session {
        Session::new(ExportPipeline::new(
            Arc::clone(&self.rasterizer),
            self.canvas.clone(),
            self.config.export_timeout,
        ))
    }

    pub async fn session(&self, id: uuid::Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub fn photo_limits(&self) -> PhotoLimits {
        PhotoLimits {
            max_bytes: self.config.max_photo_bytes,
            timeout: self.config.photo_read_timeout,
        }
    }
}
