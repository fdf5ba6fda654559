//! Free-text filtering applied before anything reaches storage.
//!
//! Descriptions, tags, licenses and archive names are stored as single-line
//! values: every whitespace character other than the plain space is dropped.
//! This also keeps tabs and newlines out of the tab-separated manifest.

/// Removes all whitespace except U+0020.
///
/// Covers the ASCII control whitespace (tab, line feed, vertical tab, form
/// feed, carriage return), NEL, the Unicode space separators, the line and
/// paragraph separators and the byte order mark.
pub fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|&c| !is_stripped(c)).collect()
}

/// Sanitizes an optional field, mapping values that end up empty to `None`.
pub fn non_empty(input: Option<&str>) -> Option<String> {
    let cleaned = strip_whitespace(input?);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn is_stripped(c: char) -> bool {
    c != ' ' && (c.is_whitespace() || c == '\u{feff}')
}
