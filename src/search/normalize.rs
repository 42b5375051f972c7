use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical form used for every text comparison: lower-cased, diacritics
/// removed ("é" -> "e"), trimmed, internal whitespace collapsed to one space.
///
/// Folding runs twice so that lower-casing can never reintroduce a combining
/// mark or a compatibility character; this keeps the function idempotent.
pub fn normalize(text: &str) -> String {
    let folded = fold(fold(text.chars()).chars());
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold(chars: impl Iterator<Item = char>) -> String {
    chars
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
