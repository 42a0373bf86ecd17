// Capture layout: positions the visual tree on an A4-width canvas and emits SVG.
// Layout is CPU-bound; callers run it inside tokio::task::spawn_blocking.

pub mod engine;
pub mod font_metrics;
pub mod svg;

pub use engine::{default_canvas_config, layout_resume, CanvasConfig, LayoutResult};
pub use svg::render_svg;
