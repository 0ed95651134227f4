//! Shared text helpers for name search queries.

/// ## Summary
/// Escapes `LIKE`/`ILIKE` wildcards so a search term matches literally.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// ## Summary
/// Builds a substring `ILIKE` pattern from a raw search term.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}
