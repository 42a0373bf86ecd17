// Template rendering: one renderer, four variants expressed as style configuration.
// The visual tree feeds both the HTML emitter (display, print) and the layout engine (capture).

pub mod html;
pub mod template;
pub mod tree;
pub mod variant;

pub use html::{render_page, PageMode};
pub use template::render_resume;
pub use tree::{RenderedResume, Role, VisualNode};
pub use variant::TemplateVariant;
