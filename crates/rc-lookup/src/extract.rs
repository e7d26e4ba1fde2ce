//! Label-driven value extraction from arbitrary HTML.
//!
//! Source pages have no stable structure, so a value is located by finding a
//! human-readable label ("Insurance Upto") and probing the markup around it.
//! Each probe is a pure function over the parsed document that either finds a
//! candidate or reports nothing. Probes run in a fixed order and the first
//! candidate that survives [`normalize`] wins:
//!
//! 1. tag-sibling: inline label element, value in its next sibling element
//! 2. parent-paragraph: first `<p>` inside the label element's parent
//! 3. table-cell-after: first `<td>` after the label element's parent
//! 4. definition-list: `<dt>` matching the label, value in the next `<dd>`
//! 5. table-row: `<tr>` whose first cell matches, value in the second cell
//! 6. flattened-text: `Label: value` regex over the whole page text
//!
//! All entry points are synchronous because `scraper::Html` is `!Send`.

use crate::normalize::normalize;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Inline elements that commonly carry a field label.
const LABEL_TAGS: &[&str] = &["span", "label", "b", "strong"];

/// A compiled field label.
///
/// Matching is a case-insensitive substring search on the literal label
/// text; regex metacharacters in the label are escaped.
#[derive(Debug, Clone)]
pub struct Label {
    text: String,
    matcher: Regex,
    inline: Regex,
}

impl Label {
    /// Compile a label matcher.
    pub fn new(text: &str) -> Result<Self, regex::Error> {
        let escaped = regex::escape(text);
        let matcher = Regex::new(&format!("(?i){escaped}"))?;
        let inline = Regex::new(&format!(
            r"(?i){escaped}\s*[:\-]{{0,2}}\s*([A-Za-z0-9\-/ ,#]+)"
        ))?;
        Ok(Self {
            text: text.to_string(),
            matcher,
            inline,
        })
    }

    /// The literal label text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether `haystack` contains the label, ignoring case.
    pub fn matches(&self, haystack: &str) -> bool {
        self.matcher.is_match(haystack)
    }
}

/// A single extraction strategy.
type Probe = fn(&Html, &Label) -> Option<String>;

/// Probes in evaluation order.
const PROBES: &[(&str, Probe)] = &[
    ("tag_sibling", tag_sibling),
    ("parent_paragraph", parent_paragraph),
    ("table_cell_after", table_cell_after),
    ("definition_list", definition_list),
    ("table_row", table_row),
    ("flattened_text", flattened_text),
];

/// Find the value paired with `label` in `document`.
///
/// Returns `None` when no probe yields a normalized value. That is the normal
/// "field not present" outcome, not an error.
pub fn extract(document: &Html, label: &str) -> Option<String> {
    match Label::new(label) {
        Ok(label) => extract_label(document, &label),
        Err(e) => {
            debug!(label, error = %e, "label did not compile");
            None
        }
    }
}

/// Like [`extract`], with a pre-compiled label.
pub fn extract_label(document: &Html, label: &Label) -> Option<String> {
    PROBES.iter().find_map(|(name, probe)| {
        let value = probe(document, label)?;
        debug!(label = label.text(), probe = *name, %value, "label matched");
        Some(value)
    })
}

// ── Probes ──────────────────────────────────────────────────────────────────

/// Value in the element right after an inline label element.
pub(crate) fn tag_sibling(document: &Html, label: &Label) -> Option<String> {
    let anchor = find_label_element(document, label)?;
    let sibling = anchor.next_siblings().find_map(ElementRef::wrap)?;
    normalized_text(sibling)
}

/// Value in the first paragraph inside the label element's container.
pub(crate) fn parent_paragraph(document: &Html, label: &Label) -> Option<String> {
    let anchor = find_label_element(document, label)?;
    let parent = anchor.parent().and_then(ElementRef::wrap)?;
    let sel = Selector::parse("p").ok()?;
    let paragraph = parent.select(&sel).next()?;
    normalized_text(paragraph)
}

/// Value in the first table cell following the label element's container.
pub(crate) fn table_cell_after(document: &Html, label: &Label) -> Option<String> {
    let anchor = find_label_element(document, label)?;
    let parent_id = anchor.parent()?.id();
    let cell = document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != parent_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "td")?;
    normalized_text(cell)
}

/// Value in the `<dd>` after the first matching `<dt>`.
pub(crate) fn definition_list(document: &Html, label: &Label) -> Option<String> {
    let sel = Selector::parse("dt").ok()?;
    document
        .select(&sel)
        .filter(|dt| label.matches(&element_text(*dt)))
        .find_map(|dt| {
            let dd = dt
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "dd")?;
            normalized_text(dd)
        })
}

/// Second cell of a table row whose first cell matches.
pub(crate) fn table_row(document: &Html, label: &Label) -> Option<String> {
    let row_sel = Selector::parse("tr").ok()?;
    let cell_sel = Selector::parse("th, td").ok()?;
    document.select(&row_sel).find_map(|row| {
        let mut cells = row.select(&cell_sel);
        let key = cells.next()?;
        let value = cells.next()?;
        if !label.matches(&element_text(key)) {
            return None;
        }
        normalized_text(value)
    })
}

/// `Label: value` anywhere in the flattened page text.
pub(crate) fn flattened_text(document: &Html, label: &Label) -> Option<String> {
    let text = element_text(document.root_element());
    let caps = label.inline.captures(&text)?;
    normalize(caps.get(1).map(|m| m.as_str()))
}

// ── Tree helpers ────────────────────────────────────────────────────────────

/// First inline element (document order) whose own string contains the label.
fn find_label_element<'a>(document: &'a Html, label: &Label) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| LABEL_TAGS.contains(&el.value().name()))
        .find(|el| own_string(*el).is_some_and(|s| label.matches(&s)))
}

/// The single string an element carries.
///
/// Defined only when the element has exactly one child and that child is a
/// text node, or an element that itself carries a single string.
fn own_string(el: ElementRef<'_>) -> Option<String> {
    let mut children = el.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    if let Some(text) = only.value().as_text() {
        return Some(text.to_string());
    }
    ElementRef::wrap(only).and_then(own_string)
}

/// Descendant text, each fragment trimmed, joined by single spaces.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn normalized_text(el: ElementRef<'_>) -> Option<String> {
    normalize(Some(element_text(el).as_str()))
}
