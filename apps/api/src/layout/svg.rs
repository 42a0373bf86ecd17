//! SVG emission from a layout result. The SVG is the capture source for rasterization.

use std::fmt::Write;

use crate::layout::engine::{LayoutResult, PaintOp};
use crate::render::html::escape;

const FONT_FAMILY: &str = "Helvetica, Arial, 'Liberation Sans', 'DejaVu Sans', sans-serif";

/// Builds SVG markup incrementally.
struct SvgBuilder {
    defs: Vec<String>,
    elements: Vec<String>,
    next_id: usize,
}

impl SvgBuilder {
    fn new() -> Self {
        Self {
            defs: vec![],
            elements: vec![],
            next_id: 0,
        }
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn add(&mut self, op: &PaintOp) {
        match op {
            PaintOp::Rect {
                x,
                y,
                w,
                h,
                fill,
                stroke,
                radius,
            } => {
                let stroke_attr = stroke
                    .map(|s| format!(r#" stroke="{s}" stroke-width="1""#))
                    .unwrap_or_default();
                self.elements.push(format!(
                    r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" rx="{r:.2}" fill="{}"{stroke_attr}/>"#,
                    fill.unwrap_or("none"),
                    r = radius.min(h / 2.0),
                ));
            }
            PaintOp::Gradient { x, y, w, h, from, to } => {
                let id = self.fresh_id("grad");
                self.defs.push(format!(
                    r#"<linearGradient id="{id}" x1="0" y1="0" x2="0" y2="1"><stop offset="0" stop-color="{from}"/><stop offset="1" stop-color="{to}"/></linearGradient>"#
                ));
                self.elements.push(format!(
                    r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="url(#{id})"/>"#
                ));
            }
            PaintOp::Line { x1, y1, x2, y2, color } => {
                self.elements.push(format!(
                    r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{color}" stroke-width="1"/>"#
                ));
            }
            PaintOp::Text {
                x,
                y,
                text,
                size,
                bold,
                color,
                centered,
                href,
            } => {
                let mut el = format!(
                    r#"<text x="{x:.2}" y="{y:.2}" font-size="{size:.1}" fill="{color}""#
                );
                if *bold {
                    el.push_str(r#" font-weight="bold""#);
                }
                if *centered {
                    el.push_str(r#" text-anchor="middle""#);
                }
                let _ = write!(el, ">{}</text>", escape(text));
                if let Some(href) = href {
                    el = format!(r#"<a xlink:href="{}">{el}</a>"#, escape(href));
                }
                self.elements.push(el);
            }
            PaintOp::Dot { cx, cy, r, color } => {
                self.elements.push(format!(
                    r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="{color}"/>"#
                ));
            }
            PaintOp::Photo {
                cx,
                cy,
                r,
                href,
                ring,
                ring_width,
            } => {
                let clip = self.fresh_id("photo");
                self.defs.push(format!(
                    r#"<clipPath id="{clip}"><circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}"/></clipPath>"#
                ));
                self.elements.push(format!(
                    r#"<image x="{x:.2}" y="{y:.2}" width="{d:.2}" height="{d:.2}" preserveAspectRatio="xMidYMid slice" clip-path="url(#{clip})" xlink:href="{}"/>"#,
                    escape(href),
                    x = cx - r,
                    y = cy - r,
                    d = r * 2.0,
                ));
                self.elements.push(format!(
                    r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{rr:.2}" fill="none" stroke="{ring}" stroke-width="{ring_width:.1}"/>"#,
                    rr = r - ring_width / 2.0,
                ));
            }
        }
    }

    fn finish(self, width: f32, height: f32, background: &str) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width:.2}" height="{height:.2}" viewBox="0 0 {width:.2} {height:.2}" font-family="{FONT_FAMILY}">"#
        );
        out.push('\n');
        if !self.defs.is_empty() {
            out.push_str("  <defs>\n");
            for d in &self.defs {
                let _ = writeln!(out, "    {d}");
            }
            out.push_str("  </defs>\n");
        }
        let _ = writeln!(
            out,
            r#"  <rect x="0" y="0" width="{width:.2}" height="{height:.2}" fill="{background}"/>"#
        );
        for el in &self.elements {
            let _ = writeln!(out, "  {el}");
        }
        out.push_str("</svg>\n");
        out
    }
}

/// Serialises the laid-out page to a standalone SVG document.
pub fn render_svg(layout: &LayoutResult) -> String {
    let mut builder = SvgBuilder::new();
    for op in &layout.ops {
        builder.add(op);
    }
    builder.finish(layout.width, layout.height, layout.background)
}
