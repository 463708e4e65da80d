//! Item text normalization.

/// Normalize free-text item names for cache keys and keyword matching.
///
/// Trims, lower-cases (Unicode aware) and collapses whitespace runs into a
/// single space, so `"  Fresh   Apple "` and `"fresh apple"` share a key.
pub fn normalize_item_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
