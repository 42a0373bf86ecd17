pub mod resume;
pub mod section;

pub use resume::{normalize, ResumeDocument, DEFAULT_SUMMARY};
pub use section::{is_section_visible, SectionKey};
