use std::collections::BTreeSet;

use serde::Serialize;

use super::normalize::normalize;
use super::synonyms;

/// One word of the user's query plus every spelling that satisfies it.
/// A listing matches the query when each group has at least one alternative
/// present in the searched fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenGroup {
    pub token: String,
    pub alternatives: Vec<String>,
}

/// Split `query` on whitespace, normalize each word and attach its synonym.
/// Repeated words collapse into a single group.
pub fn expand_query(query: &str) -> Vec<TokenGroup> {
    let mut groups: Vec<TokenGroup> = Vec::new();
    for word in query.split_whitespace() {
        let token = normalize(word);
        if token.is_empty() || groups.iter().any(|g| g.token == token) {
            continue;
        }
        let mut alternatives = vec![token.clone()];
        if let Some(canonical) = synonyms::lookup(&token) {
            if canonical != token {
                alternatives.push(canonical.to_string());
            }
        }
        groups.push(TokenGroup { token, alternatives });
    }
    groups
}

/// Flat set of match terms: normalized tokens united with their expansions
pub fn expand_tokens(query: &str) -> BTreeSet<String> {
    expand_query(query)
        .into_iter()
        .flat_map(|g| g.alternatives)
        .collect()
}
