//! Block layout of a rendered resume onto a fixed-width canvas.
//!
//! The page is two columns (sidebar | main). Each column stacks its children
//! top-to-bottom; text is word-wrapped with the static metric tables; badge lists
//! flow left-to-right and wrap. The canvas height is whatever the taller column needs.

use serde::Serialize;

use crate::layout::font_metrics::{get_metrics, FontWeight};
use crate::render::tree::{resolve_style, Column, Content, NodeStyle, RenderedResume, Role, VisualNode};
use crate::render::variant::TemplateStyle;

/// A4 width at 96 dpi, in CSS pixels.
pub const A4_WIDTH_PX: f32 = 793.7;

/// Approximate ascent as a fraction of font size, used to place baselines.
const ASCENT: f32 = 0.8;
const BADGE_GAP: f32 = 8.0;
const BULLET_INDENT: f32 = 14.0;

#[derive(Debug, Clone, Serialize)]
pub struct CanvasConfig {
    pub width_px: f32,
    /// Lower bound on canvas height so near-empty resumes still fill a page.
    pub min_height_px: f32,
}

/// A4 portrait proportions at 96 dpi.
pub fn default_canvas_config() -> CanvasConfig {
    CanvasConfig {
        width_px: A4_WIDTH_PX,
        min_height_px: A4_WIDTH_PX * 297.0 / 210.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Paint operations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PaintOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: Option<&'static str>,
        stroke: Option<&'static str>,
        radius: f32,
    },
    /// Vertical linear gradient.
    Gradient {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        from: &'static str,
        to: &'static str,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: &'static str,
    },
    Text {
        x: f32,
        /// Baseline.
        y: f32,
        text: String,
        size: f32,
        bold: bool,
        color: &'static str,
        centered: bool,
        /// Target when the text is a hyperlink.
        href: Option<String>,
    },
    Dot {
        cx: f32,
        cy: f32,
        r: f32,
        color: &'static str,
    },
    /// Circular photo with a ring.
    Photo {
        cx: f32,
        cy: f32,
        r: f32,
        href: String,
        ring: &'static str,
        ring_width: f32,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutResult {
    pub width: f32,
    pub height: f32,
    pub background: &'static str,
    pub ops: Vec<PaintOp>,
}

#[cfg(test)]
impl LayoutResult {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Lays out the whole page.
pub fn layout_resume(rendered: &RenderedResume, config: &CanvasConfig) -> LayoutResult {
    let style = rendered.style();
    let tokens = &style.layout;
    let sidebar_w = (config.width_px * tokens.sidebar_ratio).round();
    let main_w = config.width_px - sidebar_w;

    let mut sidebar_ops = Vec::new();
    let mut main_ops = Vec::new();
    let mut sidebar_bottom = 0.0_f32;
    let mut main_bottom = 0.0_f32;

    for column_node in &rendered.root.children {
        match column_node.role {
            Role::Sidebar => {
                let mut engine = Engine::new(&style, Column::Sidebar, &mut sidebar_ops);
                sidebar_bottom = engine.stack(
                    &column_node.children,
                    tokens.column_padding,
                    tokens.column_padding,
                    sidebar_w - 2.0 * tokens.column_padding,
                );
            }
            Role::Main => {
                let mut engine = Engine::new(&style, Column::Main, &mut main_ops);
                main_bottom = engine.stack(
                    &column_node.children,
                    sidebar_w + tokens.column_padding,
                    tokens.column_padding,
                    main_w - 2.0 * tokens.column_padding,
                );
            }
            _ => {}
        }
    }

    let height = (sidebar_bottom.max(main_bottom) + tokens.column_padding)
        .max(config.min_height_px)
        .ceil();

    let mut ops = Vec::with_capacity(sidebar_ops.len() + main_ops.len() + 2);
    ops.push(PaintOp::Gradient {
        x: 0.0,
        y: 0.0,
        w: sidebar_w,
        h: height,
        from: style.palette.sidebar_from,
        to: style.palette.sidebar_to,
    });
    ops.extend(sidebar_ops);
    ops.extend(main_ops);

    LayoutResult {
        width: config.width_px,
        height,
        background: style.palette.page_background,
        ops,
    }
}

struct Engine<'a> {
    style: &'a TemplateStyle,
    column: Column,
    ops: &'a mut Vec<PaintOp>,
}

impl<'a> Engine<'a> {
    fn new(style: &'a TemplateStyle, column: Column, ops: &'a mut Vec<PaintOp>) -> Self {
        Self { style, column, ops }
    }

    fn resolve(&self, role: Role) -> NodeStyle {
        resolve_style(role, self.column, self.style)
    }

    fn line_height(&self, size: f32) -> f32 {
        size * self.style.layout.line_height
    }

    /// Stacks `nodes` vertically from `y`; returns the bottom edge.
    fn stack(&mut self, nodes: &[VisualNode], x: f32, y: f32, width: f32) -> f32 {
        let mut cursor = y;
        for (i, node) in nodes.iter().enumerate() {
            let s = self.resolve(node.role);
            if i > 0 {
                cursor += s.gap_before;
            }
            cursor = self.block(node, &s, x, cursor, width);
        }
        cursor
    }

    fn block(&mut self, node: &VisualNode, s: &NodeStyle, x: f32, y: f32, width: f32) -> f32 {
        match node.role {
            Role::Photo => return self.photo(node, y, x, width),
            Role::BadgeList => return self.badges(&node.children, x, y, width),
            Role::BulletList => return self.bullets(&node.children, x, y, width),
            _ => {}
        }

        let boxed = s.background.is_some() || s.border.is_some();
        let pad = if boxed { s.padding } else { 0.0 };
        let backdrop = boxed.then(|| {
            self.ops.push(PaintOp::Rect {
                x,
                y,
                w: width,
                h: 0.0,
                fill: s.background,
                stroke: s.border,
                radius: s.radius,
            });
            self.ops.len() - 1
        });

        let inner_x = x + pad;
        let inner_w = width - 2.0 * pad;
        let mut bottom = match &node.content {
            Content::Text { text } => self.text(text, None, s, inner_x, y + pad, inner_w),
            Content::Link { href, label } => {
                self.text(label, Some(href.clone()), s, inner_x, y + pad, inner_w)
            }
            Content::Image { .. } => y + pad,
            Content::None => self.stack(&node.children, inner_x, y + pad, inner_w),
        } + pad;

        if let Some(rule) = s.rule {
            bottom += 4.0;
            self.ops.push(PaintOp::Line {
                x1: x,
                y1: bottom,
                x2: x + width,
                y2: bottom,
                color: rule,
            });
            bottom += 8.0;
        }

        if let Some(idx) = backdrop {
            if let Some(PaintOp::Rect { h, .. }) = self.ops.get_mut(idx) {
                *h = bottom - y;
            }
        }
        bottom
    }

    fn text(
        &mut self,
        text: &str,
        href: Option<String>,
        s: &NodeStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> f32 {
        let weight = if s.bold { FontWeight::Bold } else { FontWeight::Regular };
        let lines = get_metrics(weight).wrap(text, s.font_size, width);
        let lh = self.line_height(s.font_size);
        let baseline_offset = (lh - s.font_size) / 2.0 + s.font_size * ASCENT;
        let anchor_x = if s.centered { x + width / 2.0 } else { x };

        for (i, line) in lines.iter().enumerate() {
            self.ops.push(PaintOp::Text {
                x: anchor_x,
                y: y + i as f32 * lh + baseline_offset,
                text: line.clone(),
                size: s.font_size,
                bold: s.bold,
                color: s.color,
                centered: s.centered,
                href: href.clone(),
            });
        }
        y + lines.len() as f32 * lh
    }

    fn photo(&mut self, node: &VisualNode, y: f32, x: f32, width: f32) -> f32 {
        let Content::Image { src } = &node.content else {
            return y;
        };
        let l = &self.style.layout;
        let r = l.photo_size / 2.0;
        self.ops.push(PaintOp::Photo {
            cx: x + width / 2.0,
            cy: y + r,
            r,
            href: src.clone(),
            ring: self.style.palette.photo_ring,
            ring_width: l.photo_ring_width,
        });
        y + l.photo_size + 16.0
    }

    /// Pills flow left to right and wrap to new rows. A label wider than the
    /// column wraps inside its pill, which grows taller.
    fn badges(&mut self, badges: &[VisualNode], x: f32, y: f32, width: f32) -> f32 {
        let metrics = get_metrics(FontWeight::Regular);
        let mut cursor_x = x;
        let mut row_y = y;
        let mut row_h = 0.0_f32;

        for badge in badges {
            let s = self.resolve(badge.role);
            let inset = 2.0 * s.padding;
            let label = badge.own_text().unwrap_or_default();
            let lines = metrics.wrap(label, s.font_size, width - 2.0 * inset);
            let text_w = lines
                .iter()
                .map(|l| metrics.measure_px(l, s.font_size))
                .fold(0.0_f32, f32::max)
                .min(width - 2.0 * inset);
            let w = text_w + 2.0 * inset;
            let lh = self.line_height(s.font_size);
            let h = lines.len().max(1) as f32 * lh + s.padding;

            if cursor_x > x && cursor_x + w > x + width {
                cursor_x = x;
                row_y += row_h + BADGE_GAP;
                row_h = 0.0;
            }

            self.ops.push(PaintOp::Rect {
                x: cursor_x,
                y: row_y,
                w,
                h,
                fill: s.background,
                stroke: None,
                radius: (lh + s.padding) / 2.0,
            });
            let baseline = row_y + s.padding / 2.0 + (lh - s.font_size) / 2.0 + s.font_size * ASCENT;
            for (i, line) in lines.into_iter().enumerate() {
                self.ops.push(PaintOp::Text {
                    x: cursor_x + w / 2.0,
                    y: baseline + i as f32 * lh,
                    text: line,
                    size: s.font_size,
                    bold: false,
                    color: s.color,
                    centered: true,
                    href: None,
                });
            }

            cursor_x += w + BADGE_GAP;
            row_h = row_h.max(h);
        }
        row_y + row_h
    }

    fn bullets(&mut self, items: &[VisualNode], x: f32, y: f32, width: f32) -> f32 {
        let mut cursor = y;
        for (i, item) in items.iter().enumerate() {
            let s = self.resolve(item.role);
            if i > 0 {
                cursor += s.gap_before;
            }
            let lh = self.line_height(s.font_size);
            self.ops.push(PaintOp::Dot {
                cx: x + 4.0,
                cy: cursor + lh / 2.0,
                r: 2.0,
                color: s.color,
            });
            let label = item.own_text().unwrap_or_default();
            let bottom = self.text(label, None, &s, x + BULLET_INDENT, cursor, width - BULLET_INDENT);
            cursor = bottom.max(cursor + lh);
        }
        cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{normalize, ResumeDocument};
    use crate::render::{render_resume, TemplateVariant};
    use serde_json::json;

    #[test]
    fn test_default_document_fills_at_least_one_page() {
        let rendered = render_resume(&ResumeDocument::default(), TemplateVariant::Default);
        let config = default_canvas_config();
        let result = layout_resume(&rendered, &config);
        assert_eq!(result.width, config.width_px);
        assert!(result.height >= config.min_height_px);
        assert!(result.texts().any(|t| t == "Your Name"));
    }

    #[test]
    fn test_long_content_grows_canvas() {
        let experience: Vec<_> = (0..30)
            .map(|i| json!({ "jobTitle": format!("Role {i}"), "responsibility": "Shipped things. ".repeat(20) }))
            .collect();
        let doc = normalize(&json!({ "experience": experience }));
        let config = default_canvas_config();
        let result = layout_resume(&render_resume(&doc, TemplateVariant::Default), &config);
        assert!(result.height > config.min_height_px * 2.0);
    }

    #[test]
    fn test_text_stays_inside_its_column() {
        let doc = normalize(&json!({
            "summary": "word ".repeat(200),
            "skills": (0..40)
                .map(|i| format!("Skill number {i}"))
                .chain(["Designing and operating large-scale distributed event-streaming systems".to_string()])
                .collect::<Vec<_>>()
        }));
        let config = default_canvas_config();
        let rendered = render_resume(&doc, TemplateVariant::ModernMinimal);
        let result = layout_resume(&rendered, &config);
        let sidebar_w = (config.width_px * rendered.style().layout.sidebar_ratio).round();
        let metrics = get_metrics(FontWeight::Regular);
        for op in &result.ops {
            if let PaintOp::Text { x, centered: false, .. } = op {
                assert!(*x >= 0.0 && *x < config.width_px);
            }
            if let PaintOp::Text { x, text, size, centered: true, bold: false, .. } = op {
                let half = metrics.measure_px(text, *size) / 2.0;
                let (left, right) = (x - half, x + half);
                assert!(left >= 0.0, "centred text starts off the page: {left}");
                if *x < sidebar_w {
                    assert!(right <= sidebar_w + 0.5, "centred text crosses into main: {right}");
                }
            }
            if let PaintOp::Rect { x, w, .. } = op {
                let right = x + w;
                assert!(right <= config.width_px + 0.5, "rect overflows page: {right}");
                if *x < sidebar_w {
                    assert!(right <= sidebar_w + 0.5, "sidebar rect overflows: {right}");
                }
            }
        }
    }

    #[test]
    fn test_photo_is_laid_out_when_present() {
        let doc = normalize(&json!({
            "personalInformation": { "profilePhoto": "data:image/png;base64,AAAA" }
        }));
        let result = layout_resume(
            &render_resume(&doc, TemplateVariant::ElegantDark),
            &default_canvas_config(),
        );
        assert!(result.ops.iter().any(|op| matches!(op, PaintOp::Photo { .. })));
    }
}
