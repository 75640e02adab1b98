//! Tag string normalization [MB-TAG]
//!
//! Users type tags as one free-text field. Names are separated by an ASCII
//! comma or the Japanese reading point `、`.

/// Characters that separate tag names
pub const TAG_SEPARATORS: [char; 2] = [',', '、'];

/// Longest tag name accepted, in characters
pub const MAX_TAG_LEN: usize = 50;

/// Split a raw tag field into distinct tag names
///
/// Whitespace around each name (including the full-width space U+3000) is
/// trimmed, empty names are dropped, and repeated names keep only their first
/// occurrence.
///
/// # Examples
/// ```
/// use anicolle_common::tags::normalize_tags;
///
/// assert_eq!(normalize_tags("tag,tag、 other ,"), vec!["tag", "other"]);
/// ```
pub fn normalize_tags(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for part in raw.split(&TAG_SEPARATORS[..]) {
        let name = part.trim();
        if name.is_empty() {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Check names produced by [`normalize_tags`] against the length limit
pub fn validate_tag_names(names: &[String]) -> Result<(), String> {
    match names.iter().find(|n| n.chars().count() > MAX_TAG_LEN) {
        Some(name) => Err(format!(
            "tag '{}' is longer than {} characters",
            name, MAX_TAG_LEN
        )),
        None => Ok(()),
    }
}
