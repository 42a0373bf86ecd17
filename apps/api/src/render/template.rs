//! Template renderer: maps `(ResumeDocument, TemplateVariant)` to a visual tree.
//!
//! One code path serves every variant. Section order is fixed:
//! sidebar = identity, contact, skills, certifications;
//! main = summary, experience, education, projects, achievements, languages, interests.
//! A collection section is left out of the tree entirely when it has nothing to show.

use crate::models::resume::{Flexible, Labelled, PersonalInformation, ProjectEntry};
use crate::models::{is_section_visible, ResumeDocument, SectionKey};
use crate::render::tree::{RenderedResume, Role, VisualNode};
use crate::render::variant::TemplateVariant;

pub const NAME_PLACEHOLDER: &str = "Your Name";
pub const LOCATION_PLACEHOLDER: &str = "City, Country";
const DEFAULT_FILE_NAME: &str = "resume";

/// Renders a document. Never fails: missing optional values render as empty text.
pub fn render_resume(document: &ResumeDocument, variant: TemplateVariant) -> RenderedResume {
    let sidebar = sidebar(document);
    let main = main_column(document);

    let full_name = document.personal_information.full_name.trim();
    let suggested_file_name = if full_name.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        full_name.to_string()
    };

    RenderedResume {
        variant,
        root: VisualNode::container(Role::Page, vec![sidebar, main]),
        suggested_file_name,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sidebar
// ────────────────────────────────────────────────────────────────────────────

fn sidebar(document: &ResumeDocument) -> VisualNode {
    let info = &document.personal_information;
    let mut children = Vec::new();

    if is_embeddable_image(&info.profile_photo) {
        children.push(VisualNode::image(Role::Photo, info.profile_photo.clone()));
    }

    children.push(VisualNode::container(
        Role::Identity,
        vec![
            VisualNode::text(Role::Name, or_placeholder(&info.full_name, NAME_PLACEHOLDER)),
            VisualNode::text(
                Role::Location,
                or_placeholder(&info.location, LOCATION_PLACEHOLDER),
            ),
        ],
    ));

    let contact = contact_items(info);
    if !contact.is_empty() {
        children.push(VisualNode::container(Role::ContactList, contact));
    }

    if is_section_visible(document, SectionKey::Skills) {
        let badges = document
            .skills
            .iter()
            .map(|s| VisualNode::text(Role::Badge, s.label()))
            .collect();
        children.push(section(
            SectionKey::Skills,
            vec![VisualNode::container(Role::BadgeList, badges)],
        ));
    }

    if is_section_visible(document, SectionKey::Certifications) {
        children.push(bullet_section(SectionKey::Certifications, &document.certifications));
    }

    VisualNode::container(Role::Sidebar, children)
}

fn contact_items(info: &PersonalInformation) -> Vec<VisualNode> {
    let mut items = Vec::new();
    if !info.email.is_empty() {
        items.push(VisualNode::text(Role::ContactItem, info.email.clone()));
    }
    if !info.phone_number.is_empty() {
        items.push(VisualNode::text(Role::ContactItem, info.phone_number.clone()));
    }
    for (href, label) in [
        (&info.git_hub, "GitHub"),
        (&info.linked_in, "LinkedIn"),
        (&info.portfolio, "Portfolio"),
    ] {
        if !href.is_empty() {
            items.push(link_or_text(Role::ContactItem, href, label));
        }
    }
    items
}

// ────────────────────────────────────────────────────────────────────────────
// Main column
// ────────────────────────────────────────────────────────────────────────────

fn main_column(document: &ResumeDocument) -> VisualNode {
    let mut children = vec![VisualNode::container(
        Role::SummarySection,
        vec![
            VisualNode::text(Role::SectionTitle, "Summary"),
            VisualNode::text(Role::Paragraph, document.summary_or_default()),
        ],
    )];

    if is_section_visible(document, SectionKey::Experience) {
        let cards = document
            .experience
            .iter()
            .map(|e| {
                card(vec![
                    VisualNode::text(Role::CardTitle, e.job_title.clone()),
                    VisualNode::text(Role::CardSubtitle, joined(&e.company, &e.location)),
                    VisualNode::text(Role::CardMeta, e.duration.clone()),
                    VisualNode::text(Role::CardBody, e.responsibility.clone()),
                ])
            })
            .collect();
        children.push(section(SectionKey::Experience, cards));
    }

    if is_section_visible(document, SectionKey::Education) {
        let cards = document
            .education
            .iter()
            .map(|e| {
                card(vec![
                    VisualNode::text(Role::CardTitle, e.degree.clone()),
                    VisualNode::text(Role::CardSubtitle, joined(&e.university, &e.location)),
                    VisualNode::text(
                        Role::CardMeta,
                        format!("Graduation: {}", e.graduation_year),
                    ),
                ])
            })
            .collect();
        children.push(section(SectionKey::Education, cards));
    }

    if is_section_visible(document, SectionKey::Projects) {
        let cards = document.projects.iter().map(project_card).collect();
        children.push(section(SectionKey::Projects, cards));
    }

    if is_section_visible(document, SectionKey::Achievements) {
        let cards = document
            .displayable_achievements()
            .map(|a| {
                let mut parts = vec![VisualNode::text(Role::CardTitle, a.title.clone())];
                if !a.year.is_empty() {
                    parts.push(VisualNode::text(Role::CardSubtitle, a.year.clone()));
                }
                if !a.extra_information.is_empty() {
                    parts.push(VisualNode::text(Role::CardBody, a.extra_information.clone()));
                }
                card(parts)
            })
            .collect();
        children.push(section(SectionKey::Achievements, cards));
    }

    if is_section_visible(document, SectionKey::Languages) {
        children.push(bullet_section(SectionKey::Languages, &document.languages));
    }

    if is_section_visible(document, SectionKey::Interests) {
        children.push(bullet_section(SectionKey::Interests, &document.interests));
    }

    VisualNode::container(Role::Main, children)
}

fn project_card(project: &Flexible<ProjectEntry>) -> VisualNode {
    let mut parts = vec![VisualNode::text(Role::CardTitle, project.label())];
    if let Some(p) = project.full() {
        parts.push(VisualNode::text(Role::CardBody, p.description.clone()));
        if !p.technologies_used.is_empty() {
            parts.push(VisualNode::text(Role::CardMeta, p.technologies_used.joined()));
        }
        if !p.github_link.is_empty() {
            parts.push(link_or_text(Role::CardSubtitle, &p.github_link, "GitHub"));
        }
    }
    card(parts)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn section(key: SectionKey, mut body: Vec<VisualNode>) -> VisualNode {
    let mut children = vec![VisualNode::text(Role::SectionTitle, key.title())];
    children.append(&mut body);
    VisualNode::container(Role::Section(key), children)
}

fn bullet_section<T: Labelled>(key: SectionKey, entries: &[Flexible<T>]) -> VisualNode {
    let bullets = entries
        .iter()
        .map(|e| VisualNode::text(Role::Bullet, e.label()))
        .collect();
    section(key, vec![VisualNode::container(Role::BulletList, bullets)])
}

fn card(children: Vec<VisualNode>) -> VisualNode {
    VisualNode::container(Role::Card, children)
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// `company • location`, dropping the separator when either side is empty.
fn joined(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (false, false) => format!("{left} • {right}"),
        (false, true) => left.to_string(),
        (true, false) => right.to_string(),
        (true, true) => String::new(),
    }
}

/// A link when `href` has a safe scheme, otherwise the raw value as plain text.
fn link_or_text(role: Role, href: &str, label: &str) -> VisualNode {
    if is_safe_link(href) {
        VisualNode::link(role, href.trim(), label)
    } else {
        VisualNode::text(role, href.trim())
    }
}

/// Only web and mail links become anchors.
fn is_safe_link(href: &str) -> bool {
    let href = href.trim().to_ascii_lowercase();
    href.starts_with("https://") || href.starts_with("http://") || href.starts_with("mailto:")
}

/// Remote URLs and inline image payloads are embeddable; anything else would be a broken reference.
fn is_embeddable_image(src: &str) -> bool {
    let src = src.trim();
    src.starts_with("data:image/") || src.starts_with("https://") || src.starts_with("http://")
}
