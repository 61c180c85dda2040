//! Parsed HTML documents.
//!
//! A [`Document`] wraps a `scraper::Html` tree. The tree is not `Send`, so a
//! document is always built and consumed inside synchronous code and never
//! held across an `.await`.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// A parsed, queryable HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses page content.
    pub fn parse(content: &str) -> Self {
        Self {
            html: Html::parse_document(content),
        }
    }

    /// Returns the root element.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Returns every element matching `selector`, in document order.
    ///
    /// An invalid selector matches nothing.
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match parse_selector(selector) {
            Some(sel) => self.html.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    /// Returns true if anything matches `selector`.
    pub fn has_match(&self, selector: &str) -> bool {
        parse_selector(selector).is_some_and(|sel| self.html.select(&sel).next().is_some())
    }

    /// Returns the collapsed text of the whole document.
    pub fn text(&self) -> String {
        element_text(self.root())
    }

    /// Returns the collapsed text a reader would see.
    ///
    /// Text inside `script`, `style`, `noscript` and `template` elements is
    /// skipped, so inline JSON state never counts as rendered content.
    pub fn visible_text(&self) -> String {
        let parts = self.root().descendants().filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            (!hidden).then_some(&**text)
        });
        collapse_whitespace(parts)
    }
}

/// Elements whose text is never shown on the page.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

// ============================================================================
// Element helpers
// ============================================================================

pub(crate) fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(selector, error = %e, "Invalid CSS selector");
            None
        }
    }
}

/// Text of an element and all its descendants.
///
/// Text nodes are joined with a space and whitespace runs collapse to one
/// space, so `<p>06:05</p><p>08:50</p>` reads as `06:05 08:50`.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(element.text())
}

/// Text directly inside an element, excluding child elements.
pub fn own_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(
        element
            .children()
            .filter_map(|child| child.value().as_text().map(|t| &**t)),
    )
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in parts.flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Every descendant of `element` matching `selector`, in document order.
pub fn select_within<'a>(element: ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    match parse_selector(selector) {
        Some(sel) => element.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// First descendant of `element` matching `selector`.
pub fn first_within<'a>(element: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    parse_selector(selector).and_then(|sel| element.select(&sel).next())
}

/// Returns true if `inner` is a strict descendant of `outer`.
pub fn is_descendant(outer: ElementRef<'_>, inner: ElementRef<'_>) -> bool {
    inner.ancestors().any(|node| node.id() == outer.id())
}

/// Up to `max_depth` element ancestors of `element`, nearest first.
pub fn element_ancestors(element: ElementRef<'_>, max_depth: usize) -> Vec<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(max_depth)
        .collect()
}

/// Returns true if the element's `class` attribute contains every fragment.
pub fn class_contains_all(element: ElementRef<'_>, fragments: &[&str]) -> bool {
    let class = element.value().attr("class").unwrap_or_default();
    fragments.iter().all(|fragment| class.contains(fragment))
}

// ============================================================================
// Tests
// ============================================================================
