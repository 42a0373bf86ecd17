//! HTML emitter for on-screen preview and native printing.

use std::fmt::Write;

use crate::render::tree::{resolve_style, Column, Content, NodeStyle, RenderedResume, Role, VisualNode};
use crate::render::variant::TemplateStyle;
use crate::theme::Theme;

/// How the surrounding page behaves once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Preview,
    /// Opens the browser's print dialog on load.
    Print,
}

/// Renders the resume as a self-contained HTML fragment.
pub fn render_html(rendered: &RenderedResume) -> String {
    let style = rendered.style();
    let mut out = String::new();
    emit(&rendered.root, Column::Main, &style, &mut out);
    out
}

/// Wraps the fragment in a full HTML document.
pub fn render_page(rendered: &RenderedResume, theme: Theme, mode: PageMode) -> String {
    let title = escape(&rendered.suggested_file_name);
    let body = render_html(rendered);
    let script = match mode {
        PageMode::Preview => "",
        PageMode::Print => "<script>window.addEventListener('load', () => window.print());</script>",
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\nbody {{ margin: 0; padding: 40px; font-family: Helvetica, Arial, sans-serif; background: {chrome}; }}\n\
         @media print {{ body {{ padding: 0; background: #ffffff; }} .resume {{ box-shadow: none !important; border: 0 !important; }} }}\n\
         </style>\n</head>\n<body class=\"theme-{theme}\">\n{body}\n{script}\n</body>\n</html>\n",
        chrome = theme.chrome_background(),
        theme = theme.as_str(),
    )
}

fn emit(node: &VisualNode, column: Column, style: &TemplateStyle, out: &mut String) {
    let column = match node.role {
        Role::Sidebar => Column::Sidebar,
        Role::Main => Column::Main,
        _ => column,
    };
    let resolved = resolve_style(node.role, column, style);
    let (tag, class) = tag_for(node.role);
    let css = css_for(node, &resolved, style);

    match &node.content {
        Content::Image { src } => {
            let _ = write!(
                out,
                "<img class=\"{class}\" src=\"{}\" alt=\"Profile\" style=\"{css}\">",
                escape(src)
            );
            return;
        }
        Content::Link { href, label } => {
            let _ = write!(
                out,
                "<{tag} class=\"{class}\" style=\"{css}\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" style=\"color: inherit;\">{}</a></{tag}>",
                escape(href),
                escape(label)
            );
            return;
        }
        Content::Text { text } => {
            let _ = write!(out, "<{tag} class=\"{class}\" style=\"{css}\">{}</{tag}>", escape(text));
            return;
        }
        Content::None => {}
    }

    let _ = write!(out, "<{tag} class=\"{class}\" style=\"{css}\">");
    for child in &node.children {
        emit(child, column, style, out);
    }
    let _ = write!(out, "</{tag}>");
}

fn tag_for(role: Role) -> (&'static str, &'static str) {
    match role {
        Role::Page => ("div", "resume"),
        Role::Sidebar => ("aside", "resume-sidebar"),
        Role::Main => ("main", "resume-main"),
        Role::Photo => ("img", "resume-photo"),
        Role::Identity => ("div", "resume-identity"),
        Role::Name => ("h1", "resume-name"),
        Role::Location => ("p", "resume-location"),
        Role::ContactList => ("div", "resume-contact"),
        Role::ContactItem => ("div", "resume-contact-item"),
        Role::SummarySection | Role::Section(_) => ("section", "resume-section"),
        Role::SectionTitle => ("h2", "resume-section-title"),
        Role::Paragraph => ("p", "resume-summary"),
        Role::BadgeList => ("div", "resume-badges"),
        Role::Badge => ("span", "resume-badge"),
        Role::BulletList => ("ul", "resume-list"),
        Role::Bullet => ("li", "resume-list-item"),
        Role::Card => ("div", "resume-card"),
        Role::CardTitle => ("h3", "resume-card-title"),
        Role::CardSubtitle => ("p", "resume-card-subtitle"),
        Role::CardMeta => ("p", "resume-card-meta"),
        Role::CardBody => ("p", "resume-card-body"),
    }
}

fn css_for(node: &VisualNode, s: &NodeStyle, style: &TemplateStyle) -> String {
    let p = &style.palette;
    let l = &style.layout;
    let mut css = format!(
        "margin: {}px 0 0 0; font-size: {}px; line-height: {}; color: {};",
        s.gap_before, s.font_size, l.line_height, s.color
    );
    if s.bold {
        css.push_str(" font-weight: 700;");
    }
    if s.centered {
        css.push_str(" text-align: center;");
    }
    if let Some(bg) = s.background {
        let _ = write!(css, " background: {bg};");
    }
    if let Some(border) = s.border {
        let _ = write!(css, " border: 1px solid {border};");
    }
    if let Some(rule) = s.rule {
        let _ = write!(css, " border-bottom: 1px solid {rule}; padding-bottom: 4px;");
    }
    if s.padding > 0.0 {
        let _ = write!(css, " padding: {}px {}px;", s.padding / 2.0, s.padding);
    }
    if s.radius > 0.0 {
        let _ = write!(css, " border-radius: {}px;", s.radius);
    }

    match node.role {
        Role::Page => {
            let _ = write!(
                css,
                " max-width: 1024px; margin: 0 auto; display: grid; grid-template-columns: {:.4}fr {:.4}fr; \
                 background: {}; border: 1px solid {}; border-radius: 8px; overflow: hidden; \
                 box-shadow: 0 25px 50px -12px rgba(0,0,0,0.25);",
                l.sidebar_ratio,
                1.0 - l.sidebar_ratio,
                p.page_background,
                p.page_border
            );
        }
        Role::Sidebar => {
            let _ = write!(
                css,
                " background: linear-gradient(to bottom, {}, {}); padding: {}px;",
                p.sidebar_from, p.sidebar_to, l.column_padding
            );
        }
        Role::Main => {
            let _ = write!(css, " padding: {}px;", l.column_padding);
        }
        Role::Photo => {
            let _ = write!(
                css,
                " display: block; margin: 0 auto 16px auto; width: {0}px; height: {0}px; \
                 border-radius: 50%; object-fit: cover; border-width: {1}px;",
                l.photo_size, l.photo_ring_width
            );
        }
        Role::BadgeList => css.push_str(" display: flex; flex-wrap: wrap; gap: 8px;"),
        Role::Badge => css.push_str(" display: inline-block; margin: 0;"),
        Role::BulletList => css.push_str(" list-style: disc inside; padding: 0;"),
        _ => {}
    }
    css
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
