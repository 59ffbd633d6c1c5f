//! Slug derivation for catalog display names.

/// Derive a URL-safe slug from a display name.
///
/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single hyphen; leading and trailing separators are
/// dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}
