//! Typed view of the search page's query string.
//!
//! Every recognized parameter has its own parsing rule. Values that fail to
//! parse are treated as if they had not been sent; nothing here reports an
//! error to the visitor.

use serde::Serialize;

use super::normalize::normalize;

/// Query-string keys that count as search criteria, in pipeline order
pub const FILTER_KEYS: &[&str] = &[
    "q",
    "tipo",
    "tipo_operacion",
    "localidad",
    "provincia",
    "currency",
    "price_min",
    "price_max",
    "usd_min",
    "usd_max",
    "ars_min",
    "ars_max",
    "dormitorios",
    "banios",
    "cocheras",
];

/// Keys dropped together by the price-range chip
pub const PRICE_KEYS: &[&str] = &[
    "price_min",
    "price_max",
    "usd_min",
    "usd_max",
    "ars_min",
    "ars_max",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Ars,
}

impl Currency {
    /// `usd` (any case) selects dollars; any other non-empty value means pesos
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw.eq_ignore_ascii_case("usd") {
            Some(Currency::Usd)
        } else {
            Some(Currency::Ars)
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Ars => "$",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchParams {
    /// Free text, trimmed, never empty
    pub q: Option<String>,
    pub category: Option<String>,
    pub transaction: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub currency: Option<Currency>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub usd_min: Option<f64>,
    pub usd_max: Option<f64>,
    pub ars_min: Option<f64>,
    pub ars_max: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub garages: Option<i64>,
    /// Raw `page` value; the paginator decides what it means
    pub page: Option<String>,
    /// Request pairs in their original order, used to rebuild links
    #[serde(skip)]
    pub raw: Vec<(String, String)>,
}

impl SearchParams {
    /// Build from decoded query-string pairs. With repeated keys the last
    /// value wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let get = |key: &str| {
            pairs
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        Self {
            q: get("q").and_then(parse_search_text),
            category: get("tipo").and_then(parse_text),
            transaction: get("tipo_operacion").and_then(parse_text),
            locality: get("localidad").and_then(parse_search_text),
            region: get("provincia").and_then(parse_search_text),
            currency: get("currency").and_then(Currency::parse),
            price_min: get("price_min").and_then(parse_price),
            price_max: get("price_max").and_then(parse_price),
            usd_min: get("usd_min").and_then(parse_price),
            usd_max: get("usd_max").and_then(parse_price),
            ars_min: get("ars_min").and_then(parse_price),
            ars_max: get("ars_max").and_then(parse_price),
            bedrooms: get("dormitorios").and_then(parse_int),
            bathrooms: get("banios").and_then(parse_int),
            garages: get("cocheras").and_then(parse_int),
            page: get("page").map(str::to_string),
            raw: pairs,
        }
    }

    /// True when at least one criterion survived parsing
    pub fn has_filters(&self) -> bool {
        self.q.is_some()
            || self.category.is_some()
            || self.transaction.is_some()
            || self.locality.is_some()
            || self.region.is_some()
            || self.currency.is_some()
            || self.has_price_range()
            || self.usd_min.is_some()
            || self.usd_max.is_some()
            || self.ars_min.is_some()
            || self.ars_max.is_some()
            || self.bedrooms.is_some()
            || self.bathrooms.is_some()
            || self.garages.is_some()
    }

    pub fn has_price_range(&self) -> bool {
        self.price_min.is_some() || self.price_max.is_some()
    }

    /// Currency the generic price range applies to; pesos unless told otherwise
    pub fn range_currency(&self) -> Currency {
        self.currency.unwrap_or(Currency::Ars)
    }

    /// Last raw value sent for `key`, empty when absent
    pub fn raw_value(&self, key: &str) -> &str {
        self.raw
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }
}

/// Trimmed text, absent when blank
pub fn parse_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trimmed text matched against folded fields; absent when nothing is left
/// after folding (a lone combining accent, for instance)
pub fn parse_search_text(raw: &str) -> Option<String> {
    parse_text(raw).filter(|text| !normalize(text).is_empty())
}

/// Whole number, absent when it does not parse
pub fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Lenient price parser.
///
/// Accepts `$`, `ars` and `usd` markers anywhere, spaces, `.` or `,` as
/// thousands separators and a trailing `k` (thousands) or `m` (millions).
/// With a multiplier, a single separator followed by one or two digits is a
/// decimal point, so `1.5m` is 1 500 000 while `1.500k` is 1 500 000 too.
pub fn parse_price(raw: &str) -> Option<f64> {
    let mut text = raw.trim().to_lowercase();
    for marker in ["usd", "ars", "$"] {
        text = text.replace(marker, "");
    }
    text.retain(|c| !c.is_whitespace());

    let (body, multiplier) = match text.chars().last()? {
        'k' => (&text[..text.len() - 1], 1_000.0),
        'm' => (&text[..text.len() - 1], 1_000_000.0),
        _ => (text.as_str(), 1.0),
    };

    if body.is_empty()
        || !body.chars().any(|c| c.is_ascii_digit())
        || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let separators: Vec<usize> = body
        .char_indices()
        .filter(|(_, c)| *c == '.' || *c == ',')
        .map(|(i, _)| i)
        .collect();

    let number = match separators.as_slice() {
        [at] if multiplier > 1.0 && (1..=2).contains(&(body.len() - at - 1)) => {
            format!("{}.{}", &body[..*at], &body[at + 1..])
        }
        _ => body.replace(['.', ','], ""),
    };

    number.parse::<f64>().ok().map(|n| n * multiplier)
}
