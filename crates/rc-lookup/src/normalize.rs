//! Text normalization shared by every probe.

/// Placeholder tokens that stand for "no value" on source pages.
const PLACEHOLDERS: &[&str] = &["na", "n/a", "none", "null"];

/// Collapse whitespace runs to a single space and trim.
///
/// Returns `None` for missing, blank, or placeholder input (`na`, `n/a`,
/// `none`, `null`, any case).
pub fn normalize(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if PLACEHOLDERS
        .iter()
        .any(|p| collapsed.eq_ignore_ascii_case(p))
    {
        return None;
    }
    Some(collapsed)
}

/// Canonical form of a user-supplied RC number: no whitespace, upper-case.
pub fn normalize_rc_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
