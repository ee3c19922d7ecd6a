//! Text canonicalization for comparisons: case, punctuation, whitespace.

/// Punctuation stripped before any comparison.
const STRIPPED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"'];

/// Canonicalizes text for comparison: lower-cases, strips the fixed
/// punctuation set, collapses whitespace runs to one space, trims ends.
/// Total on any input; never fails.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
