/// Folds a free-form label into its comparison form.
///
/// Lowercases and strips whitespace, hyphens and underscores. Punctuation that
/// carries meaning in department names (such as the `&` in "P&L Market") is kept.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns true when `needle` appears inside `haystack` after both are normalized.
///
/// An empty needle never matches.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    let needle = normalize(needle);
    !needle.is_empty() && normalize(haystack).contains(&needle)
}
