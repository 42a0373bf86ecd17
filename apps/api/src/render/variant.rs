//! Template variants as configuration: one palette plus one set of layout tokens each.
//!
//! The renderer never branches on the variant. Everything that differs between
//! the four looks lives in `TemplateStyle`.

use std::fmt;
#[cfg(test)]
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Variant tag
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateVariant {
    /// Classic blue sidebar.
    #[default]
    #[serde(alias = "classic-blue")]
    Default,
    #[serde(alias = "template1")]
    ModernMinimal,
    #[serde(alias = "template2")]
    ElegantDark,
    #[serde(alias = "template3")]
    ProfessionalGray,
}

impl TemplateVariant {
    pub const ALL: [TemplateVariant; 4] = [
        TemplateVariant::Default,
        TemplateVariant::ModernMinimal,
        TemplateVariant::ElegantDark,
        TemplateVariant::ProfessionalGray,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateVariant::Default => "default",
            TemplateVariant::ModernMinimal => "modern-minimal",
            TemplateVariant::ElegantDark => "elegant-dark",
            TemplateVariant::ProfessionalGray => "professional-gray",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemplateVariant::Default => "Classic Blue (Default)",
            TemplateVariant::ModernMinimal => "Modern Minimal",
            TemplateVariant::ElegantDark => "Elegant Dark",
            TemplateVariant::ProfessionalGray => "Professional Gray",
        }
    }

    pub fn style(self) -> TemplateStyle {
        match self {
            TemplateVariant::Default => TemplateStyle {
                palette: Palette {
                    page_background: "#ffffff",
                    page_border: "#e5e7eb",
                    text: "#111827",
                    sidebar_from: "#2563eb",
                    sidebar_to: "#1e40af",
                    sidebar_text: "#ffffff",
                    sidebar_muted: "#dbeafe",
                    sidebar_rule: "#93c5fd",
                    badge_background: "#4f7df0",
                    badge_text: "#ffffff",
                    photo_ring: "#93c5fd",
                    heading: "#1d4ed8",
                    card_background: "#ffffff",
                    card_border: "#e5e7eb",
                    card_subtitle: "#6b7280",
                    card_meta: "#9ca3af",
                    body: "#374151",
                },
                layout: LayoutTokens {
                    summary_boxed: false,
                    section_gap: 24.0,
                    entry_gap: 12.0,
                    name_size: 30.0,
                    ..LayoutTokens::base()
                },
            },
            TemplateVariant::ModernMinimal => TemplateStyle {
                palette: Palette {
                    page_background: "#ffffff",
                    page_border: "#e5e7eb",
                    text: "#111827",
                    sidebar_from: "#dbeafe",
                    sidebar_to: "#93c5fd",
                    sidebar_text: "#111827",
                    sidebar_muted: "#1d4ed8",
                    sidebar_rule: "#93c5fd",
                    badge_background: "#bfdbfe",
                    badge_text: "#1e3a8a",
                    photo_ring: "#60a5fa",
                    heading: "#1e40af",
                    card_background: "#ffffff",
                    card_border: "#dbeafe",
                    card_subtitle: "#3b82f6",
                    card_meta: "#60a5fa",
                    body: "#374151",
                },
                layout: LayoutTokens::base(),
            },
            TemplateVariant::ElegantDark => TemplateStyle {
                palette: Palette {
                    page_background: "#111827",
                    page_border: "#1f2937",
                    text: "#ffffff",
                    sidebar_from: "#1f2937",
                    sidebar_to: "#374151",
                    sidebar_text: "#ffffff",
                    sidebar_muted: "#bfdbfe",
                    sidebar_rule: "#60a5fa",
                    badge_background: "#1e40af",
                    badge_text: "#dbeafe",
                    photo_ring: "#60a5fa",
                    heading: "#93c5fd",
                    card_background: "#1f2937",
                    card_border: "#1e3a8a",
                    card_subtitle: "#60a5fa",
                    card_meta: "#3b82f6",
                    body: "#dbeafe",
                },
                layout: LayoutTokens {
                    section_gap: 32.0,
                    ..LayoutTokens::base()
                },
            },
            TemplateVariant::ProfessionalGray => TemplateStyle {
                palette: Palette {
                    page_background: "#f3f4f6",
                    page_border: "#d1d5db",
                    text: "#111827",
                    sidebar_from: "#d1d5db",
                    sidebar_to: "#9ca3af",
                    sidebar_text: "#111827",
                    sidebar_muted: "#374151",
                    sidebar_rule: "#9ca3af",
                    badge_background: "#e5e7eb",
                    badge_text: "#1f2937",
                    photo_ring: "#6b7280",
                    heading: "#1f2937",
                    card_background: "#ffffff",
                    card_border: "#e5e7eb",
                    card_subtitle: "#6b7280",
                    card_meta: "#9ca3af",
                    body: "#374151",
                },
                layout: LayoutTokens::base(),
            },
        }
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
impl FromStr for TemplateVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown template variant '{s}'"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Style configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateStyle {
    pub palette: Palette,
    pub layout: LayoutTokens,
}

/// CSS hex colours. Every emitter reads colours from here and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub page_background: &'static str,
    pub page_border: &'static str,
    pub text: &'static str,
    pub sidebar_from: &'static str,
    pub sidebar_to: &'static str,
    pub sidebar_text: &'static str,
    pub sidebar_muted: &'static str,
    pub sidebar_rule: &'static str,
    pub badge_background: &'static str,
    pub badge_text: &'static str,
    pub photo_ring: &'static str,
    pub heading: &'static str,
    pub card_background: &'static str,
    pub card_border: &'static str,
    pub card_subtitle: &'static str,
    pub card_meta: &'static str,
    pub body: &'static str,
}

/// Geometry in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTokens {
    /// Fraction of the page width taken by the sidebar column.
    pub sidebar_ratio: f32,
    pub column_padding: f32,
    pub section_gap: f32,
    pub entry_gap: f32,
    pub card_padding: f32,
    pub card_radius: f32,
    pub photo_size: f32,
    pub photo_ring_width: f32,
    pub name_size: f32,
    pub sidebar_heading_size: f32,
    pub heading_size: f32,
    pub card_title_size: f32,
    pub body_size: f32,
    pub small_size: f32,
    pub badge_size: f32,
    pub line_height: f32,
    /// Summary drawn inside a card rather than as plain text.
    pub summary_boxed: bool,
}

impl LayoutTokens {
    /// Shared geometry; variants override individual tokens.
    pub fn base() -> Self {
        Self {
            sidebar_ratio: 1.0 / 3.0,
            column_padding: 24.0,
            section_gap: 24.0,
            entry_gap: 16.0,
            card_padding: 16.0,
            card_radius: 8.0,
            photo_size: 112.0,
            photo_ring_width: 4.0,
            name_size: 24.0,
            sidebar_heading_size: 18.0,
            heading_size: 24.0,
            card_title_size: 18.0,
            body_size: 16.0,
            small_size: 14.0,
            badge_size: 12.0,
            line_height: 1.5,
            summary_boxed: true,
        }
    }
}
