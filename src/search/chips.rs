use serde::Serialize;

/// One active filter as shown above the results, with a link that drops it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub key: String,
    pub label: String,
    pub remove_url: String,
}

/// Re-serialize `pairs` in order, skipping every key listed in `without`
pub fn query_string(pairs: &[(String, String)], without: &[&str]) -> String {
    pairs
        .iter()
        .filter(|(k, _)| !without.contains(&k.as_str()))
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// `path?rest` with the given keys removed, or the bare path when nothing is left
pub fn remove_url(path: &str, pairs: &[(String, String)], without: &[&str]) -> String {
    let query = query_string(pairs, without);
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Collects chips for one request
pub struct ChipBuilder<'a> {
    path: &'a str,
    pairs: &'a [(String, String)],
    chips: Vec<Chip>,
}

impl<'a> ChipBuilder<'a> {
    pub fn new(path: &'a str, pairs: &'a [(String, String)]) -> Self {
        Self {
            path,
            pairs,
            chips: Vec::new(),
        }
    }

    /// Chip whose link drops only `key`
    pub fn add(&mut self, key: &str, label: impl Into<String>) {
        self.add_removing(key, label, &[key]);
    }

    /// Chip whose link drops every key in `removes`
    pub fn add_removing(&mut self, key: &str, label: impl Into<String>, removes: &[&str]) {
        self.chips.push(Chip {
            key: key.to_string(),
            label: label.into(),
            remove_url: remove_url(self.path, self.pairs, removes),
        });
    }

    pub fn finish(self) -> Vec<Chip> {
        self.chips
    }
}
