//! Trigram similarity, computed the way PostgreSQL's `pg_trgm` does: each
//! alphanumeric word is lower-cased and padded with two leading blanks and
//! one trailing blank, and the score is the Jaccard index of the two trigram
//! sets.

use std::collections::HashSet;

/// Listings scoring below this are not offered as approximate matches
pub const DEFAULT_THRESHOLD: f64 = 0.20;

pub const FUZZY_CHIP_KEY: &str = "fuzzy";
pub const FUZZY_CHIP_LABEL: &str = "Coincidencias aproximadas";

pub fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars().flat_map(char::to_lowercase))
            .chain(" ".chars())
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

/// 0.0 (nothing shared) to 1.0 (same trigram set)
pub fn similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;
    shared as f64 / union as f64
}
