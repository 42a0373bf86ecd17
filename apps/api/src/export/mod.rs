// Export pipeline: rendered resume → downloadable PDF, or print-ready HTML.
//
// Idle → Capturing → Rasterizing → Assembling → Saving → Idle for downloads,
// Idle → Printing → Idle for print. Any failure returns to Idle and is reported.

pub mod handlers;
pub mod pdf;
pub mod raster;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::guard::InFlight;
use crate::layout::{layout_resume, render_svg, CanvasConfig};
use crate::render::{render_page, PageMode, RenderedResume};
use crate::theme::Theme;

pub use pdf::Placement;
pub use raster::{RasterImage, Rasterizer, SvgRasterizer};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("capture failed: {0}")]
    Capture(String),

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("document assembly failed: {0}")]
    Assemble(String),

    #[error("export timed out after {0}s")]
    Timeout(u64),

    #[error("an export is already in progress")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    Idle,
    Capturing,
    Rasterizing,
    Assembling,
    Saving,
    Printing,
}

/// Source of the export file name. `None` or a blank answer cancels the export.
#[async_trait]
pub trait FileNamePrompt: Send + Sync {
    async fn ask(&self, suggested: &str) -> Option<String>;
}

/// A prompt already answered by the caller (e.g. the `fileName` of a request body).
pub struct ProvidedName(pub Option<String>);

#[async_trait]
impl FileNamePrompt for ProvidedName {
    async fn ask(&self, _suggested: &str) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    /// `<fileName>.pdf`
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub placement: Placement,
}

/// One pipeline per session. Clones share state and the in-flight guard.
#[derive(Clone)]
pub struct ExportPipeline {
    rasterizer: Arc<dyn Rasterizer>,
    canvas: CanvasConfig,
    timeout: Duration,
    guard: InFlight,
    state: watch::Sender<ExportState>,
}

impl ExportPipeline {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, canvas: CanvasConfig, timeout: Duration) -> Self {
        let (state, _rx) = watch::channel(ExportState::Idle);
        Self {
            rasterizer,
            canvas,
            timeout,
            guard: InFlight::new(),
            state,
        }
    }

    pub fn state(&self) -> ExportState {
        *self.state.borrow()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<ExportState> {
        self.state.subscribe()
    }

    fn transition(&self, next: ExportState) {
        debug!(state = ?next, "export state");
        self.state.send_replace(next);
    }

    /// Asks for a file name, then captures, rasterizes and assembles the page.
    ///
    /// Returns `Ok(None)` when the prompt is cancelled or blank; nothing runs and
    /// the state never leaves `Idle`.
    ///
    /// The work runs on its own task, which holds the in-flight guard. On timeout
    /// the state returns to `Idle` at once, but the guard stays taken until the
    /// abandoned task has stopped, so timed-out renders never pile up.
    pub async fn export_as_download(
        &self,
        rendered: &RenderedResume,
        prompt: &dyn FileNamePrompt,
    ) -> Result<Option<ExportedFile>, ExportError> {
        let Some(name) = prompt
            .ask(&rendered.suggested_file_name)
            .await
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        else {
            info!("Export cancelled: no file name");
            return Ok(None);
        };

        let token = self.guard.try_acquire().ok_or(ExportError::Busy)?;
        let abandoned = Arc::new(AtomicBool::new(false));
        let worker = {
            let pipeline = self.clone();
            let rendered = rendered.clone();
            let abandoned = Arc::clone(&abandoned);
            tokio::spawn(async move {
                let _token = token;
                pipeline.run_download(&rendered, name, &abandoned).await
            })
        };

        let result = match tokio::time::timeout(self.timeout, worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ExportError::Capture(format!("export task failed: {e}"))),
            Err(_) => Err(ExportError::Timeout(self.timeout.as_secs())),
        };
        // Same lock as `advance`, so an abandoned worker cannot publish after this.
        self.state.send_modify(|state| {
            abandoned.store(true, Ordering::Release);
            *state = ExportState::Idle;
        });
        debug!(state = ?ExportState::Idle, "export state");

        match result {
            Ok(file) => {
                info!(
                    file = %file.file_name,
                    bytes = file.bytes.len(),
                    height_mm = file.placement.height_mm,
                    "Export complete"
                );
                Ok(Some(file))
            }
            Err(e) => {
                error!("Export failed: {e}");
                Err(e)
            }
        }
    }

    /// Publishes `next` unless the run was abandoned, in which case the run stops.
    fn advance(&self, abandoned: &AtomicBool, next: ExportState) -> Result<(), ExportError> {
        let published = self.state.send_if_modified(|state| {
            if abandoned.load(Ordering::Acquire) {
                false
            } else {
                *state = next;
                true
            }
        });
        if !published {
            debug!(state = ?next, "abandoned export stopped");
            return Err(ExportError::Timeout(self.timeout.as_secs()));
        }
        debug!(state = ?next, "export state");
        Ok(())
    }

    async fn run_download(
        &self,
        rendered: &RenderedResume,
        name: String,
        abandoned: &AtomicBool,
    ) -> Result<ExportedFile, ExportError> {
        self.advance(abandoned, ExportState::Capturing)?;
        let owned = rendered.clone();
        let canvas = self.canvas.clone();
        let svg = tokio::task::spawn_blocking(move || render_svg(&layout_resume(&owned, &canvas)))
            .await
            .map_err(|e| ExportError::Capture(e.to_string()))?;

        self.advance(abandoned, ExportState::Rasterizing)?;
        let image = self.rasterizer.rasterize(svg).await?;
        debug!(width = image.width, height = image.height, "Captured raster");

        self.advance(abandoned, ExportState::Assembling)?;
        let title = name.clone();
        let (bytes, placement) = tokio::task::spawn_blocking(move || pdf::assemble(&image, &title))
            .await
            .map_err(|e| ExportError::Assemble(e.to_string()))??;
        if placement.overflows() {
            debug!(height_mm = placement.height_mm, "Image is taller than one page; not split");
        }

        self.advance(abandoned, ExportState::Saving)?;
        Ok(ExportedFile {
            file_name: format!("{name}.pdf"),
            bytes,
            placement,
        })
    }

    /// Print-ready HTML for the host's native print dialog. No snapshot, no file.
    pub fn export_as_print(&self, rendered: &RenderedResume, theme: Theme) -> Result<String, ExportError> {
        let _token = self.guard.try_acquire().ok_or(ExportError::Busy)?;
        self.transition(ExportState::Printing);
        let html = render_page(rendered, theme, PageMode::Print);
        self.transition(ExportState::Idle);
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::default_canvas_config;
    use crate::models::ResumeDocument;
    use crate::render::{render_resume, TemplateVariant};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Returns a fixed-size image without looking at the SVG.
    struct FixedRasterizer {
        width: u32,
        height: u32,
        calls: AtomicUsize,
    }

    impl FixedRasterizer {
        fn new(width: u32, height: u32) -> Arc<Self> {
            Arc::new(Self {
                width,
                height,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Rasterizer for FixedRasterizer {
        async fn rasterize(&self, svg: String) -> Result<RasterImage, ExportError> {
            assert!(svg.starts_with("<svg"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RasterImage::blank(self.width, self.height))
        }
    }

    struct FailingRasterizer;

    #[async_trait]
    impl Rasterizer for FailingRasterizer {
        async fn rasterize(&self, _svg: String) -> Result<RasterImage, ExportError> {
            Err(ExportError::Rasterize("no pixels today".to_string()))
        }
    }

    /// Blocks until released.
    struct GatedRasterizer {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Rasterizer for GatedRasterizer {
        async fn rasterize(&self, _svg: String) -> Result<RasterImage, ExportError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(RasterImage::blank(10, 10))
        }
    }

    fn rendered() -> RenderedResume {
        render_resume(&ResumeDocument::default(), TemplateVariant::Default)
    }

    fn pipeline(rasterizer: Arc<dyn Rasterizer>) -> ExportPipeline {
        ExportPipeline::new(rasterizer, default_canvas_config(), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_download_scales_image_to_page_width() {
        let pipeline = pipeline(FixedRasterizer::new(1000, 1414));
        let file = pipeline
            .export_as_download(&rendered(), &ProvidedName(Some("ada".to_string())))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.file_name, "ada.pdf");
        assert!(file.bytes.starts_with(b"%PDF-"));
        assert!((file.placement.height_mm - 296.94).abs() < 0.1);
        assert_eq!(pipeline.state(), ExportState::Idle);
    }

    #[tokio::test]
    async fn test_empty_file_name_is_a_silent_abort() {
        let rasterizer = FixedRasterizer::new(10, 10);
        let pipeline = pipeline(rasterizer.clone());
        let mut states = pipeline.subscribe();

        for answer in [None, Some(String::new()), Some("   ".to_string())] {
            let out = pipeline
                .export_as_download(&rendered(), &ProvidedName(answer))
                .await
                .unwrap();
            assert!(out.is_none());
        }
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.state(), ExportState::Idle);
        assert!(!states.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_failure_returns_to_idle() {
        let pipeline = pipeline(Arc::new(FailingRasterizer));
        let err = pipeline
            .export_as_download(&rendered(), &ProvidedName(Some("x".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Rasterize(_)));
        assert_eq!(pipeline.state(), ExportState::Idle);
        // the guard is released, so the next attempt runs
        assert!(matches!(
            pipeline.export_as_download(&rendered(), &ProvidedName(None)).await,
            Ok(None)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_export_is_rejected() {
        let gate = Arc::new(GatedRasterizer {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let pipeline = pipeline(gate.clone());

        let first = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                pipeline
                    .export_as_download(&rendered(), &ProvidedName(Some("one".to_string())))
                    .await
            })
        };
        gate.entered.notified().await;
        assert_eq!(pipeline.state(), ExportState::Rasterizing);

        let second = pipeline
            .export_as_download(&rendered(), &ProvidedName(Some("two".to_string())))
            .await;
        assert!(matches!(second, Err(ExportError::Busy)));
        assert!(matches!(pipeline.export_as_print(&rendered(), Theme::Light), Err(ExportError::Busy)));

        gate.release.notify_one();
        let file = first.await.unwrap().unwrap().unwrap();
        assert_eq!(file.file_name, "one.pdf");
    }

    #[tokio::test]
    async fn test_stalled_rasterizer_times_out() {
        let gate = Arc::new(GatedRasterizer {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let pipeline = ExportPipeline::new(gate, default_canvas_config(), Duration::from_millis(50));
        let err = pipeline
            .export_as_download(&rendered(), &ProvidedName(Some("slow".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Timeout(_)));
        assert_eq!(pipeline.state(), ExportState::Idle);
    }

    #[tokio::test]
    async fn test_blank_name_during_running_export_is_still_a_silent_abort() {
        let gate = Arc::new(GatedRasterizer {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let pipeline = pipeline(gate.clone());
        let first = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                pipeline
                    .export_as_download(&rendered(), &ProvidedName(Some("one".to_string())))
                    .await
            })
        };
        gate.entered.notified().await;

        let out = pipeline
            .export_as_download(&rendered(), &ProvidedName(Some("  ".to_string())))
            .await;
        assert!(matches!(out, Ok(None)));
        assert_eq!(pipeline.state(), ExportState::Rasterizing);

        gate.release.notify_one();
        assert!(first.await.unwrap().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_timed_out_export_keeps_guard_until_work_stops() {
        let gate = Arc::new(GatedRasterizer {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let pipeline = ExportPipeline::new(gate.clone(), default_canvas_config(), Duration::from_millis(50));
        let err = pipeline
            .export_as_download(&rendered(), &ProvidedName(Some("slow".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Timeout(_)));
        assert_eq!(pipeline.state(), ExportState::Idle);

        // the abandoned render is still running
        let again = pipeline
            .export_as_download(&rendered(), &ProvidedName(Some("again".to_string())))
            .await;
        assert!(matches!(again, Err(ExportError::Busy)));

        let states = pipeline.subscribe();
        gate.release.notify_one();
        for _ in 0..200 {
            if !pipeline.guard.is_busy() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!pipeline.guard.is_busy());
        // the stale run stopped without publishing any state
        assert!(!states.has_changed().unwrap());
        assert_eq!(pipeline.state(), ExportState::Idle);
    }

    #[test]
    fn test_print_produces_print_page() {
        let pipeline = pipeline(FixedRasterizer::new(10, 10));
        let html = pipeline.export_as_print(&rendered(), Theme::Light).unwrap();
        assert!(html.contains("window.print()"));
        assert_eq!(pipeline.state(), ExportState::Idle);
    }
}
