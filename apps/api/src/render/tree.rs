//! The rendered visual tree: what the template renderer produces and every emitter consumes.

use serde::Serialize;

use crate::models::SectionKey;
use crate::render::variant::{TemplateStyle, TemplateVariant};

/// Semantic role of a node. Emitters derive geometry and colour from the role,
/// the column it sits in, and the variant's `TemplateStyle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "role", content = "section")]
pub enum Role {
    Page,
    Sidebar,
    Main,
    Photo,
    Identity,
    Name,
    Location,
    ContactList,
    ContactItem,
    SummarySection,
    Section(SectionKey),
    SectionTitle,
    Paragraph,
    BadgeList,
    Badge,
    BulletList,
    Bullet,
    Card,
    CardTitle,
    CardSubtitle,
    CardMeta,
    CardBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Content {
    None,
    Text { text: String },
    Image { src: String },
    Link { href: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualNode {
    pub role: Role,
    pub content: Content,
    pub children: Vec<VisualNode>,
}

impl VisualNode {
    pub fn container(role: Role, children: Vec<VisualNode>) -> Self {
        Self {
            role,
            content: Content::None,
            children,
        }
    }

    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Content::Text { text: text.into() },
            children: Vec::new(),
        }
    }

    pub fn image(role: Role, src: impl Into<String>) -> Self {
        Self {
            role,
            content: Content::Image { src: src.into() },
            children: Vec::new(),
        }
    }

    pub fn link(role: Role, href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            role,
            content: Content::Link {
                href: href.into(),
                label: label.into(),
            },
            children: Vec::new(),
        }
    }

    /// Visible text carried by this node itself (not its children).
    pub fn own_text(&self) -> Option<&str> {
        match &self.content {
            Content::Text { text } => Some(text),
            Content::Link { label, .. } => Some(label),
            Content::None | Content::Image { .. } => None,
        }
    }

    /// Depth-first search for the first node with `role`.
    pub fn find(&self, role: Role) -> Option<&VisualNode> {
        if self.role == role {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(role))
    }
}

#[cfg(test)]
impl VisualNode {
    /// Every node with `role`, in document order.
    pub fn find_all(&self, role: Role) -> Vec<&VisualNode> {
        let mut out = Vec::new();
        self.collect(role, &mut out);
        out
    }

    fn collect<'a>(&'a self, role: Role, out: &mut Vec<&'a VisualNode>) {
        if self.role == role {
            out.push(self);
        }
        for child in &self.children {
            child.collect(role, out);
        }
    }

    /// All visible text under this node, joined by single spaces.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.walk_text(&mut parts);
        parts.join(" ")
    }

    fn walk_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if let Some(t) = self.own_text() {
            if !t.is_empty() {
                parts.push(t);
            }
        }
        for child in &self.children {
            child.walk_text(parts);
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(VisualNode::node_count).sum::<usize>()
    }
}

/// Output of the template renderer: the tree plus the variant it was rendered for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedResume {
    pub variant: TemplateVariant,
    pub root: VisualNode,
    /// Suggested export file name (full name, or "resume").
    pub suggested_file_name: String,
}

impl RenderedResume {
    pub fn style(&self) -> TemplateStyle {
        self.variant.style()
    }

    pub fn section(&self, key: SectionKey) -> Option<&VisualNode> {
        self.root.find(Role::Section(key))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Role styling
// ────────────────────────────────────────────────────────────────────────────

/// Which column a node sits in; the same role is styled differently per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Sidebar,
    Main,
}

/// Resolved presentation for one node. Shared by the HTML and SVG emitters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub font_size: f32,
    pub bold: bool,
    pub color: &'static str,
    pub background: Option<&'static str>,
    pub border: Option<&'static str>,
    /// Bottom rule under the node (sidebar headings).
    pub rule: Option<&'static str>,
    pub padding: f32,
    pub radius: f32,
    /// Space above the node when stacked after a sibling.
    pub gap_before: f32,
    pub centered: bool,
}

impl NodeStyle {
    fn plain(font_size: f32, color: &'static str) -> Self {
        Self {
            font_size,
            bold: false,
            color,
            background: None,
            border: None,
            rule: None,
            padding: 0.0,
            radius: 0.0,
            gap_before: 0.0,
            centered: false,
        }
    }
}

pub fn resolve_style(role: Role, column: Column, style: &TemplateStyle) -> NodeStyle {
    let p = &style.palette;
    let l = &style.layout;
    let (text, muted) = match column {
        Column::Sidebar => (p.sidebar_text, p.sidebar_muted),
        Column::Main => (p.text, p.body),
    };

    match role {
        Role::Page | Role::Sidebar | Role::Main | Role::Identity => NodeStyle::plain(l.body_size, text),
        Role::Photo => NodeStyle {
            border: Some(p.photo_ring),
            ..NodeStyle::plain(l.body_size, text)
        },
        Role::Name => NodeStyle {
            bold: true,
            centered: true,
            ..NodeStyle::plain(l.name_size, text)
        },
        Role::Location => NodeStyle {
            centered: true,
            gap_before: 4.0,
            ..NodeStyle::plain(l.body_size, muted)
        },
        Role::ContactList => NodeStyle {
            gap_before: l.section_gap,
            ..NodeStyle::plain(l.small_size, muted)
        },
        Role::ContactItem => NodeStyle {
            gap_before: 8.0,
            ..NodeStyle::plain(l.small_size, muted)
        },
        Role::SummarySection | Role::Section(_) => NodeStyle {
            gap_before: l.section_gap,
            ..NodeStyle::plain(l.body_size, text)
        },
        Role::SectionTitle => match column {
            Column::Sidebar => NodeStyle {
                bold: true,
                rule: Some(p.sidebar_rule),
                ..NodeStyle::plain(l.sidebar_heading_size, text)
            },
            Column::Main => NodeStyle {
                bold: true,
                ..NodeStyle::plain(l.heading_size, p.heading)
            },
        },
        Role::Paragraph => {
            if l.summary_boxed {
                NodeStyle {
                    background: Some(p.card_background),
                    padding: l.card_padding,
                    radius: l.card_radius,
                    gap_before: 8.0,
                    ..NodeStyle::plain(l.body_size, muted)
                }
            } else {
                NodeStyle {
                    gap_before: 8.0,
                    ..NodeStyle::plain(l.body_size, muted)
                }
            }
        }
        Role::BadgeList => NodeStyle {
            gap_before: 8.0,
            ..NodeStyle::plain(l.badge_size, p.badge_text)
        },
        Role::Badge => NodeStyle {
            background: Some(p.badge_background),
            padding: 6.0,
            radius: 999.0,
            ..NodeStyle::plain(l.badge_size, p.badge_text)
        },
        Role::BulletList => NodeStyle {
            gap_before: 8.0,
            ..NodeStyle::plain(list_size(column, l.small_size, l.body_size), muted)
        },
        Role::Bullet => NodeStyle {
            gap_before: 4.0,
            ..NodeStyle::plain(list_size(column, l.small_size, l.body_size), muted)
        },
        Role::Card => NodeStyle {
            background: Some(p.card_background),
            border: Some(p.card_border),
            padding: l.card_padding,
            radius: l.card_radius,
            gap_before: l.entry_gap,
            ..NodeStyle::plain(l.body_size, text)
        },
        Role::CardTitle => NodeStyle {
            bold: true,
            ..NodeStyle::plain(l.card_title_size, text)
        },
        Role::CardSubtitle => NodeStyle::plain(l.body_size, p.card_subtitle),
        Role::CardMeta => NodeStyle::plain(l.small_size, p.card_meta),
        Role::CardBody => NodeStyle {
            gap_before: 8.0,
            ..NodeStyle::plain(l.body_size, p.body)
        },
    }
}

fn list_size(column: Column, small: f32, body: f32) -> f32 {
    match column {
        Column::Sidebar => small,
        Column::Main => body,
    }
}
