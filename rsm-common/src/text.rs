//! Review text cleaning

/// Normalize raw review text before storage and inference.
///
/// Any run of whitespace (spaces, tabs, newlines, other Unicode whitespace)
/// collapses to a single space; leading and trailing whitespace is removed.
/// Absent input yields an empty string.
pub fn clean_text(raw: Option<&str>) -> String {
    match raw {
        Some(text) => text.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}
