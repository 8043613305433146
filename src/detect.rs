//! Slide boundary detection over a parsed HTML document.
//!
//! The detector owns the parsed tree for the duration of a conversion and
//! hands out [`ElementHandle`]s (document-order indices) instead of borrowed
//! node references, so candidates can outlive any single traversal.

use crate::{Error, Result};
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::fmt;

/// Class names that mark an element as a slide, in scan order.
pub const SLIDE_CLASSES: &[&str] = &["slide", "section", "page", "step", "slide-page"];

/// Data attributes that mark an element as a slide, in scan order.
pub const SLIDE_DATA_ATTRS: &[&str] = &["data-slide", "data-page", "data-section"];

/// Semantic container tags considered as weaker slide signals.
pub const SEMANTIC_TAGS: &[&str] = &["section", "article"];

/// Default length of text previews shown to the user.
pub const PREVIEW_LEN: usize = 100;

/// Opaque reference to an element of the detector's document.
///
/// Handles are document-order element indices and are only meaningful for
/// the [`BreakDetector`] that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ElementHandle(usize);

impl ElementHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Strength of a boundary signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Explicit slide marker (class name or data attribute)
    High,
    /// Generic semantic container
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        };
        f.write_str(label)
    }
}

/// A candidate slide boundary found by [`BreakDetector::detect`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakCandidate {
    /// Element that starts the section
    pub element: ElementHandle,
    /// Best-effort CSS selector for the element (not guaranteed unique)
    pub selector: String,
    pub confidence: Confidence,
    /// Human readable description of the matched signal
    pub reason: String,
}

/// Heuristic slide detector over one parsed HTML document
pub struct BreakDetector {
    document: Html,
}

impl BreakDetector {
    /// Parse `html` and take ownership of the resulting tree
    pub fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Scan the document for candidate slide boundaries.
    ///
    /// Class names are scanned first, then data attributes (both high
    /// confidence), then semantic tags (medium confidence, skipped when an
    /// earlier candidate already produced the same selector). The result is
    /// deduplicated on selector, keeping the first occurrence.
    pub fn detect(&self) -> Vec<BreakCandidate> {
        let mut breaks: Vec<BreakCandidate> = Vec::new();

        for class_name in SLIDE_CLASSES {
            for (handle, element) in self.indexed() {
                if class_list(element).contains(class_name) {
                    breaks.push(BreakCandidate {
                        element: handle,
                        selector: selector_for(element),
                        confidence: Confidence::High,
                        reason: format!("Found element with class '{}'", class_name),
                    });
                }
            }
        }

        for attr in SLIDE_DATA_ATTRS {
            for (handle, element) in self.indexed() {
                if element.value().attr(attr).is_some() {
                    breaks.push(BreakCandidate {
                        element: handle,
                        selector: selector_for(element),
                        confidence: Confidence::High,
                        reason: format!("Found element with attribute '{}'", attr),
                    });
                }
            }
        }

        for tag in SEMANTIC_TAGS {
            for (handle, element) in self.indexed() {
                if element.value().name() != *tag {
                    continue;
                }
                let selector = selector_for(element);
                if breaks.iter().any(|b| b.selector == selector) {
                    continue;
                }
                breaks.push(BreakCandidate {
                    element: handle,
                    selector,
                    confidence: Confidence::Medium,
                    reason: format!("Found semantic <{}> element", tag),
                });
            }
        }

        let mut unique: Vec<BreakCandidate> = Vec::with_capacity(breaks.len());
        for candidate in breaks {
            if unique.iter().any(|u| u.selector == candidate.selector) {
                debug!("Dropping duplicate selector {}", candidate.selector);
                continue;
            }
            unique.push(candidate);
        }
        unique
    }

    /// Resolve selectors to the elements they currently match.
    ///
    /// Matches are returned per selector in document order and concatenated
    /// in selector order; overlapping selectors yield duplicate handles.
    /// Selectors that fail to parse are logged and skipped.
    pub fn select(&self, selectors: &[String]) -> Vec<ElementHandle> {
        let all: Vec<ElementRef<'_>> = self.elements().collect();
        let mut handles = Vec::new();

        for selector in selectors {
            let parsed = match parse_selector(selector) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Could not parse selector: {}", e);
                    continue;
                }
            };
            for matched in self.document.select(&parsed) {
                if let Some(idx) = all.iter().position(|e| *e == matched) {
                    handles.push(ElementHandle(idx));
                }
            }
        }

        handles
    }

    /// Compute the selector for a single element
    pub fn selector(&self, handle: ElementHandle) -> Option<String> {
        self.element(handle).map(selector_for)
    }

    /// Whitespace-stripped text of an element, truncated to `max_len` chars
    pub fn preview(&self, handle: ElementHandle, max_len: usize) -> String {
        let Some(element) = self.element(handle) else {
            return String::new();
        };
        let text: String = element
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if text.chars().count() > max_len {
            let cut: String = text.chars().take(max_len).collect();
            format!("{}...", cut)
        } else {
            text
        }
    }

    /// Serialized HTML of an element and its subtree
    pub fn outer_html(&self, handle: ElementHandle) -> Option<String> {
        self.element(handle).map(|e| e.html())
    }

    /// Text of the document `<title>`, if any
    pub fn title(&self) -> Option<String> {
        self.elements()
            .find(|e| e.value().name() == "title")
            .map(|e| e.text().collect::<String>().trim().to_string())
    }

    /// The parsed document
    pub fn document(&self) -> &Html {
        &self.document
    }

    fn element(&self, handle: ElementHandle) -> Option<ElementRef<'_>> {
        self.elements().nth(handle.0)
    }

    // All elements in document order, starting at the root <html>.
    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    fn indexed(&self) -> impl Iterator<Item = (ElementHandle, ElementRef<'_>)> + '_ {
        self.elements()
            .enumerate()
            .map(|(idx, element)| (ElementHandle(idx), element))
    }
}

/// Parse a CSS selector, reporting failures as [`Error::Selector`]
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Classes of an element in attribute order
pub(crate) fn class_list<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    element
        .value()
        .attr("class")
        .map(|c| c.split_ascii_whitespace().collect())
        .unwrap_or_default()
}

/// Best-effort selector: `#id`, then `.class.list`, then `parent > tag`.
pub(crate) fn selector_for(element: ElementRef<'_>) -> String {
    let value = element.value();

    if let Some(id) = value.attr("id").filter(|id| !id.is_empty()) {
        return format!("#{}", id);
    }

    let classes = class_list(element);
    if !classes.is_empty() {
        return format!(".{}", classes.join("."));
    }

    match element.parent().and_then(ElementRef::wrap) {
        Some(parent) => format!("{} > {}", parent.value().name(), value.name()),
        None => value.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(candidates: &[BreakCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.selector.as_str()).collect()
    }

    #[test]
    fn slides_with_ids_are_distinct_high_candidates() {
        let html = r#"<html><body>
            <div class="slide" id="intro">One</div>
            <div class="slide" id="body">Two</div>
            <div class="slide" id="outro">Three</div>
        </body></html>"#;
        let detector = BreakDetector::new(html);
        let found = detector.detect();

        assert_eq!(selectors(&found), vec!["#intro", "#body", "#outro"]);
        assert!(found.iter().all(|c| c.confidence == Confidence::High));
        assert_eq!(found[0].reason, "Found element with class 'slide'");
    }

    #[test]
    fn slides_without_ids_collapse_to_one_candidate() {
        let html = r#"<body>
            <div class="slide">One</div>
            <div class="slide">Two</div>
            <div class="slide">Three</div>
        </body>"#;
        let found = BreakDetector::new(html).detect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].selector, ".slide");
    }

    #[test]
    fn class_selector_keeps_attribute_order() {
        let html = r#"<div class="slide  title-card dark">x</div>"#;
        let found = BreakDetector::new(html).detect();
        assert_eq!(found[0].selector, ".slide.title-card.dark");
    }

    #[test]
    fn class_scan_order_decides_reason() {
        // Matches both "page" and "slide"; "slide" is scanned first.
        let html = r#"<div class="page slide" id="p1">x</div>"#;
        let found = BreakDetector::new(html).detect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reason, "Found element with class 'slide'");
    }

    #[test]
    fn data_attributes_match_regardless_of_value() {
        let html = r#"<body>
            <div data-slide="1" id="a">A</div>
            <div data-page id="b">B</div>
            <div data-section="" id="c">C</div>
        </body>"#;
        let found = BreakDetector::new(html).detect();

        assert_eq!(selectors(&found), vec!["#a", "#b", "#c"]);
        assert!(found.iter().all(|c| c.confidence == Confidence::High));
        assert_eq!(found[1].reason, "Found element with attribute 'data-page'");
    }

    #[test]
    fn semantic_tags_are_medium_and_skip_known_selectors() {
        let html = r#"<body>
            <section class="slide" id="s1">Marked</section>
            <section id="s2">Plain</section>
            <article>Story</article>
        </body>"#;
        let found = BreakDetector::new(html).detect();

        assert_eq!(selectors(&found), vec!["#s1", "#s2", "body > article"]);
        assert_eq!(found[0].confidence, Confidence::High);
        assert_eq!(found[1].confidence, Confidence::Medium);
        assert_eq!(found[1].reason, "Found semantic <section> element");
        assert_eq!(found[2].reason, "Found semantic <article> element");
    }

    #[test]
    fn parent_context_selector_for_bare_elements() {
        let html = r#"<body><main><section>One</section><section>Two</section></main></body>"#;
        let found = BreakDetector::new(html).detect();
        assert_eq!(selectors(&found), vec!["main > section"]);
    }

    #[test]
    fn root_element_has_no_parent_context() {
        let html = r#"<html class="slide"><body></body></html>"#;
        let detector = BreakDetector::new(html);
        let found = detector.detect();
        assert_eq!(found[0].selector, ".slide");
        assert_eq!(detector.selector(ElementHandle(0)).as_deref(), Some(".slide"));

        let bare = BreakDetector::new("<p>x</p>");
        assert_eq!(bare.selector(ElementHandle(0)).as_deref(), Some("html"));
    }

    #[test]
    fn empty_id_falls_through_to_classes() {
        let html = r#"<div id="" class="slide">x</div>"#;
        let found = BreakDetector::new(html).detect();
        assert_eq!(found[0].selector, ".slide");
    }

    #[test]
    fn plain_document_has_no_candidates() {
        let html = "<html><head><title>t</title></head><body><p>Hello</p></body></html>";
        assert!(BreakDetector::new(html).detect().is_empty());
    }

    #[test]
    fn mixed_document_counts_and_uniqueness() {
        let html = r#"<body>
            <div class="slide" id="one">1</div>
            <div class="slide" id="two">2</div>
            <section id="three">3</section>
            <article id="four">4</article>
        </body>"#;
        let found = BreakDetector::new(html).detect();

        let high = found.iter().filter(|c| c.confidence == Confidence::High).count();
        let medium = found.iter().filter(|c| c.confidence == Confidence::Medium).count();
        assert_eq!(high, 2);
        assert_eq!(medium, 2);

        let mut seen = std::collections::HashSet::new();
        assert!(found.iter().all(|c| seen.insert(c.selector.clone())));
    }

    #[test]
    fn detection_is_deterministic() {
        let html = r#"<body><div class="step">a</div><section>b</section></body>"#;
        let detector = BreakDetector::new(html);
        assert_eq!(detector.detect(), detector.detect());
        assert_eq!(BreakDetector::new(html).detect(), detector.detect());
    }

    #[test]
    fn select_resolves_in_selector_order_with_duplicates() {
        let html = r#"<body>
            <div class="slide" id="a">A</div>
            <div class="slide" id="b">B</div>
        </body>"#;
        let detector = BreakDetector::new(html);
        let handles = detector.select(&["#b".to_string(), ".slide".to_string()]);

        assert_eq!(handles.len(), 3);
        assert_eq!(handles[0], handles[2]);
        assert_eq!(detector.selector(handles[1]).as_deref(), Some("#a"));
    }

    #[test]
    fn select_skips_invalid_and_unmatched_selectors() {
        let detector = BreakDetector::new(r#"<div class="slide">x</div>"#);
        let handles = detector.select(&["div[".to_string(), ".missing".to_string()]);
        assert!(handles.is_empty());
        assert!(parse_selector("div[").is_err());
    }

    #[test]
    fn preview_strips_and_truncates() {
        let html = r#"<div id="x">  Hello
            <b> world </b>  </div>"#;
        let detector = BreakDetector::new(html);
        let handle = detector.select(&["#x".to_string()])[0];
        assert_eq!(detector.preview(handle, PREVIEW_LEN), "Helloworld");
        assert_eq!(detector.preview(handle, 5), "Hello...");
    }

    #[test]
    fn outer_html_and_title() {
        let html = r#"<html><head><title> Deck </title></head><body><div class="slide">A</div></body></html>"#;
        let detector = BreakDetector::new(html);
        let found = detector.detect();
        assert_eq!(
            detector.outer_html(found[0].element).as_deref(),
            Some(r#"<div class="slide">A</div>"#)
        );
        assert_eq!(detector.title().as_deref(), Some("Deck"));
    }

    #[test]
    fn confidence_display_and_json() {
        assert_eq!(Confidence::High.to_string(), "HIGH");
        assert_eq!(serde_json::to_string(&Confidence::Medium).unwrap(), "\"medium\"");
    }
}
