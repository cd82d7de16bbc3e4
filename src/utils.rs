//! Text helpers used by the parsers and the HTTP layer.
//!
//! - Field sanitization for the `|`-delimited output
//! - Element text extraction for `scraper` nodes
//! - String truncation for log previews

use itertools::Itertools;
use scraper::ElementRef;

/// Make a value safe to join with `|`.
///
/// Commas are deleted (downstream consumers treat the output as CSV-like),
/// then the value is made [`delimiter_safe`].
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_field("Hop, Skip"), "Hop Skip");
/// assert_eq!(sanitize_field("A|B"), "AB");
/// ```
pub fn sanitize_field(s: &str) -> String {
    delimiter_safe(&s.replace(',', ""))
}

/// Drop `|` and collapse every whitespace run (newlines included) to one
/// space, so the value can neither split a field nor a row.
pub fn delimiter_safe(s: &str) -> String {
    s.replace('|', "").split_whitespace().join(" ")
}

/// All descendant text of an element, concatenated with whitespace runs
/// collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (on a char boundary)
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max)
        .last()
        .unwrap_or(0);
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
