use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::normalize::normalize;

/// Informal term -> the word listings are written with. Either side may carry
/// accents or capitals; both are normalized when the table is built.
const RAW_SYNONYMS: &[(&str, &str)] = &[
    ("depto", "apartamento"),
    ("dpto", "apartamento"),
    ("dto", "apartamento"),
    ("ph", "apartamento"),
    ("galpon", "galpón"),
    ("galpón", "galpón"),
    ("garage", "cochera"),
    ("garaje", "cochera"),
    ("banio", "baño"),
    ("banios", "baños"),
    ("banos", "baños"),
    ("bano", "baño"),
    ("lanus", "lanus"),
    ("lanús", "lanus"),
];

static SYNONYMS: Lazy<HashMap<String, String>> = Lazy::new(|| {
    RAW_SYNONYMS
        .iter()
        .map(|(alias, canonical)| (normalize(alias), normalize(canonical)))
        .collect()
});

/// Canonical term for one normalized token, if the table knows it
pub fn lookup(token: &str) -> Option<&'static str> {
    SYNONYMS.get(token).map(String::as_str)
}
