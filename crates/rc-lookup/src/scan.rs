//! Bulk field scanning over a parsed RC page.
//!
//! Three passes fill one [`Record`], each only adding keys not yet present:
//!
//! 1. every label in [`FIELD_CATALOG`] through the label extractor
//! 2. every two-column table row as a generic key → value pair
//! 3. `name` / `address` / `telephone` from embedded JSON-LD

use crate::catalog::FIELD_CATALOG;
use crate::extract::{element_text, extract_label, Label};
use crate::normalize::normalize;
use crate::record::Record;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

/// Table-derived keys at or above this length are treated as prose, not labels.
const MAX_TABLE_KEY_LEN: usize = 50;

/// JSON-LD properties copied into the record.
const JSONLD_KEYS: &[&str] = &["name", "address", "telephone"];

/// Parse `html` and scan it.
///
/// The parsed document never leaves this function, so callers on an async
/// runtime can hold the result across await points.
pub fn scan_html(html: &str) -> Record {
    let document = Html::parse_document(html);
    scan(&document)
}

/// Collect every recognizable field from `document`.
pub fn scan(document: &Html) -> Record {
    let mut record = Record::new();
    scan_catalog(document, &mut record);
    scan_tables(document, &mut record);
    scan_jsonld(document, &mut record);
    record
}

fn scan_catalog(document: &Html, record: &mut Record) {
    for text in FIELD_CATALOG {
        let label = match Label::new(text) {
            Ok(label) => label,
            Err(e) => {
                debug!(label = *text, error = %e, "skipping label");
                continue;
            }
        };
        if let Some(value) = extract_label(document, &label) {
            record.insert_if_absent(*text, value);
        }
    }
}

fn scan_tables(document: &Html, record: &mut Record) {
    let (Ok(table_sel), Ok(row_sel), Ok(cell_sel)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("td, th"),
    ) else {
        return;
    };

    for table in document.select(&table_sel) {
        for row in table.select(&row_sel) {
            let mut cells = row.select(&cell_sel).map(element_text);
            let (Some(key), Some(value)) = (cells.next(), cells.next()) else {
                continue;
            };
            let (Some(key), Some(value)) = (
                normalize(Some(key.as_str())),
                normalize(Some(value.as_str())),
            ) else {
                continue;
            };
            if key.chars().count() < MAX_TABLE_KEY_LEN {
                record.insert_if_absent(key, value);
            }
        }
    }
}

fn scan_jsonld(document: &Html, record: &mut Record) {
    let Ok(sel) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return;
    };
    for element in document.select(&sel) {
        let text: String = element.text().collect();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => process_jsonld_value(&value, record),
            Err(e) => debug!(error = %e, "ignoring malformed JSON-LD block"),
        }
    }
}

fn process_jsonld_value(value: &Value, record: &mut Record) {
    if let Some(items) = value.as_array() {
        for item in items {
            process_jsonld_value(item, record);
        }
    } else if let Some(graph) = value.get("@graph").and_then(|g| g.as_array()) {
        for item in graph {
            copy_jsonld_keys(item, record);
        }
    } else {
        copy_jsonld_keys(value, record);
    }
}

fn copy_jsonld_keys(value: &Value, record: &mut Record) {
    if !value.is_object() {
        return;
    }
    for key in JSONLD_KEYS {
        if let Some(text) = value.get(*key).and_then(jsonld_text) {
            record.insert_if_absent(*key, text);
        }
    }
}

/// Render a JSON-LD property as display text.
///
/// Objects such as `PostalAddress` become their string fields joined by
/// ", ", skipping `@`-prefixed keywords.
fn jsonld_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize(Some(s.as_str())),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter(|(k, _)| !k.starts_with('@'))
                .filter_map(|(_, v)| v.as_str().and_then(|s| normalize(Some(s))))
                .collect();
            normalize(Some(parts.join(", ").as_str()))
        }
        Value::Array(items) => items.iter().find_map(jsonld_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_row_outside_catalog() {
        let record = scan_html(
            r#"<html><body><table>
                 <tr><td>Norms Type</td><td>BHARAT STAGE VI</td></tr>
               </table></body></html>"#,
        );
        assert_eq!(record.get("Norms Type"), Some("BHARAT STAGE VI"));
    }

    #[test]
    fn test_single_cell_rows_are_skipped() {
        let record = scan_html(r#"<table><tr><td>Vehicle Details</td></tr></table>"#);
        assert!(record.is_empty());
    }

    #[test]
    fn test_long_table_keys_are_skipped() {
        let key = "x".repeat(MAX_TABLE_KEY_LEN);
        let short = "y".repeat(MAX_TABLE_KEY_LEN - 1);
        let record = scan_html(&format!(
            "<table><tr><td>{key}</td><td>v1</td></tr><tr><td>{short}</td><td>v2</td></tr></table>"
        ));
        assert!(!record.contains_key(&key));
        assert_eq!(record.get(&short), Some("v2"));
    }

    #[test]
    fn test_placeholder_table_values_are_skipped() {
        let record = scan_html(r#"<table><tr><td>Hypothecation</td><td>NA</td></tr></table>"#);
        assert!(!record.contains_key("Hypothecation"));
    }

    #[test]
    fn test_catalog_value_wins_over_table_value() {
        let record = scan_html(
            r#"<div><span>Insurance Upto</span><span>01-Jan-2030</span></div>
               <table><tr><td>Insurance Upto</td><td>02-Feb-2031</td></tr></table>"#,
        );
        assert_eq!(record.get("Insurance Upto"), Some("01-Jan-2030"));
    }

    #[test]
    fn test_synonym_labels_stay_separate() {
        let record = scan_html(
            r#"<div><span>Owner Name</span><span>JOHN DOE</span></div>
               <div><span>Owner's Name</span><span>J. DOE</span></div>"#,
        );
        assert_eq!(record.get("Owner Name"), Some("JOHN DOE"));
        assert_eq!(record.get("Owner's Name"), Some("J. DOE"));
    }

    #[test]
    fn test_jsonld_keys() {
        let record = scan_html(
            r#"<html><head><script type="application/ld+json">
               {"@type": "LocalBusiness", "name": "RTO Pune",
                "telephone": "+91-20-1234",
                "address": {"@type": "PostalAddress", "streetAddress": "Sangam Bridge",
                            "addressLocality": "Pune"}}
               </script></head><body></body></html>"#,
        );
        assert_eq!(record.get("name"), Some("RTO Pune"));
        assert_eq!(record.get("telephone"), Some("+91-20-1234"));
        let address = record.get("address").unwrap();
        assert!(address.contains("Sangam Bridge"));
        assert!(address.contains("Pune"));
        assert!(!address.contains("PostalAddress"));
    }

    #[test]
    fn test_jsonld_text_is_not_entity_escaped() {
        let record = scan_html(
            r#"<script type="application/ld+json">
               {"name": "Tom & Jerry Motors <RTO>", "telephone": "020 \"A\" line"}
               </script>"#,
        );
        assert_eq!(record.get("name"), Some("Tom & Jerry Motors <RTO>"));
        assert_eq!(record.get("telephone"), Some("020 \"A\" line"));
    }

    #[test]
    fn test_jsonld_graph() {
        let record = scan_html(
            r#"<script type="application/ld+json">
               {"@graph": [{"@type": "WebSite"}, {"@type": "Organization", "name": "Vahan Info"}]}
               </script>"#,
        );
        assert_eq!(record.get("name"), Some("Vahan Info"));
    }

    #[test]
    fn test_malformed_jsonld_is_ignored() {
        let record = scan_html(
            r#"<script type="application/ld+json">{"name": </script>
               <table><tr><td>Colour</td><td>WHITE</td></tr></table>"#,
        );
        assert_eq!(record.get("Colour"), Some("WHITE"));
        assert!(!record.contains_key("name"));
    }

    #[test]
    fn test_empty_page() {
        assert!(scan_html("").is_empty());
        assert!(scan_html("<html><body></body></html>").is_empty());
    }
}
