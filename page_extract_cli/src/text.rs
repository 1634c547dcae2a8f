//! HTML to readable plain text.
//!
//! Both converters render an immutable parse tree into a buffer and then
//! normalize it: every line is trimmed, blank lines are dropped and the rest
//! are joined with one empty line between them.

use scraper::{ElementRef, Html, Node};

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre", "hr",
    "table", "tr", "section", "article", "header", "footer", "nav", "aside",
];

const SIMPLE_BREAKS: &[&str] = &["br", "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li"];

const IMAGE_PLACEHOLDER: &str = "image";

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// Converts `html` to text keeping block structure, list bullets, link
/// targets, image captions and fenced code.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    render_children(fragment.root_element(), &mut out);
    normalize(&out)
}

fn render_children(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn render_element(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    match name {
        "script" | "style" => return,
        "img" => {
            let alt = el
                .value()
                .attr("alt")
                .filter(|a| !a.is_empty())
                .unwrap_or(IMAGE_PLACEHOLDER);
            let src = el.value().attr("src").unwrap_or_default();
            out.push_str(&format!("[{alt}: {src}]\n"));
            return;
        }
        "pre" | "code" => {
            out.push_str("\n```\n");
            out.push_str(&raw_text(el));
            out.push_str("\n```\n");
            if is_block(name) {
                out.push('\n');
            }
            return;
        }
        "li" => out.push_str("• "),
        _ => {}
    }

    render_children(el, out);

    if name == "a" {
        if let Some(href) = el.value().attr("href").filter(|h| !h.is_empty() && !h.starts_with('#')) {
            out.push_str(&format!(" ({href})"));
        }
    }
    if is_block(name) {
        out.push('\n');
    }
}

/// Descendant text as written, without script or style bodies.
fn raw_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if e.name() != "script" && e.name() != "style" => {
                if let Some(child) = ElementRef::wrap(child) {
                    out.push_str(&raw_text(child));
                }
            }
            _ => {}
        }
    }
    out
}

/// Converts `html` to text with line breaks only.
pub fn html_to_simple_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    render_simple(fragment.root_element(), &mut out);
    normalize(&out)
}

fn render_simple(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => {
                let name = e.name();
                if matches!(name, "script" | "style" | "iframe") {
                    continue;
                }
                if let Some(child) = ElementRef::wrap(child) {
                    render_simple(child, out);
                }
                if SIMPLE_BREAKS.contains(&name) {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn normalize(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
