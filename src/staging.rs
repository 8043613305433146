//! Standalone documents for rendering a single section.
//!
//! A staged page keeps the source deck's `<head>` (styles, fonts, scripts)
//! and replaces the body with one section wrapped in a `slide-container`.

use regex::{Captures, Regex};
use scraper::{ElementRef, Html};
use std::sync::OnceLock;

/// Style override appended to every staged head so hidden slides render.
pub const VISIBILITY_OVERRIDE: &str = r#"
            .slide {
                display: block !important;
            }
            .slide.active {
                display: block !important;
            }
        "#;

fn slide_class_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"class="(slide[^"]*)"|class='(slide[^']*)'"#).expect("valid slide class pattern")
    })
}

/// Append ` active` to every `class` value that starts with `slide`.
pub fn activate_slides(section_html: &str) -> String {
    slide_class_pattern()
        .replace_all(section_html, |caps: &Captures<'_>| {
            let (value, quote) = match (caps.get(1), caps.get(2)) {
                (Some(m), _) => (m.as_str(), '"'),
                (None, Some(m)) => (m.as_str(), '\''),
                (None, None) => return caps[0].to_string(),
            };
            if value.contains("active") {
                format!("class={q}{v}{q}", q = quote, v = value)
            } else {
                format!("class={q}{v} active{q}", q = quote, v = value)
            }
        })
        .into_owned()
}

/// Build a standalone page that renders `section_html` with the styling of
/// `source`.
///
/// `base_href`, when given, is emitted as the first `<head>` child so that
/// relative stylesheet and image URLs keep resolving against the source
/// document's directory.
pub fn stage_section(source: &Html, section_html: &str, base_href: Option<&str>) -> String {
    let root = source.root_element();
    let head = child_element(root, "head");
    let body = child_element(root, "body");

    let mut out = String::with_capacity(section_html.len() + 1024);
    out.push_str("<!DOCTYPE html>\n<html");
    push_attrs(&mut out, Some(root));
    out.push_str("><head>");
    if let Some(href) = base_href {
        out.push_str(&format!("<base href=\"{}\">", escape_attr(href)));
    }
    if let Some(head) = head {
        out.push_str(&head.inner_html());
    }
    out.push_str("<style>");
    out.push_str(VISIBILITY_OVERRIDE);
    out.push_str("</style></head><body");
    push_attrs(&mut out, body);
    out.push_str("><div class=\"slide-container\">");
    out.push_str(&activate_slides(section_html));
    out.push_str("</div></body></html>");
    out
}

fn child_element<'a>(parent: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == name)
}

fn push_attrs(out: &mut String, element: Option<ElementRef<'_>>) {
    let Some(element) = element else { return };
    for (name, value) in element.value().attrs() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
