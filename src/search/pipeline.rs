//! Turns typed search parameters into query restrictions and chips.

use crate::models::{category_label, format_thousands, transaction_label};

use super::chips::{remove_url, Chip, ChipBuilder};
use super::fuzzy::{FUZZY_CHIP_KEY, FUZZY_CHIP_LABEL};
use super::normalize::normalize;
use super::params::{Currency, SearchParams, PRICE_KEYS};
use super::query::{Clause, Column, ListingQuery};
use super::tokens::expand_query;

/// Fields the free-text query is matched against
pub const TEXT_FIELDS: &[Column] = &[
    Column::Title,
    Column::Description,
    Column::Locality,
    Column::Region,
    Column::Amenities,
    Column::Code,
];

/// Fields compared by the approximate fallback
pub const FUZZY_FIELDS: &[Column] = &[Column::Title, Column::Locality, Column::Region];

/// The free-text part of a search, kept apart so the fallback can replace it
#[derive(Debug, Clone)]
pub struct TextFilter {
    pub raw: String,
    pub normalized: String,
    clauses: Vec<Clause>,
}

/// Outcome of running the pipeline over one request
#[derive(Debug, Clone)]
pub struct AppliedFilters {
    pub text: Option<TextFilter>,
    /// Every non-text restriction, in the order they were applied
    pub others: Vec<Clause>,
    pub chips: Vec<Chip>,
    path: String,
    raw: Vec<(String, String)>,
}

impl AppliedFilters {
    /// Published listings narrowed by every active filter
    pub fn exact_query(&self) -> ListingQuery {
        let mut query = ListingQuery::published();
        if let Some(text) = &self.text {
            query.extend(text.clauses.iter().cloned());
        }
        query.extend(self.others.iter().cloned());
        query
    }

    /// Similarity-ranked query for when the exact pass found nothing.
    /// `None` without a free-text criterion.
    ///
    /// With `keep_filters` off the fallback starts again from every published
    /// listing; the other chips stay on screen but do not restrict it.
    pub fn fuzzy_query(&self, keep_filters: bool, threshold: f64) -> Option<ListingQuery> {
        let text = self.text.as_ref()?;
        let mut query = ListingQuery::published();
        if keep_filters {
            query.extend(self.others.iter().cloned());
        }
        query.rank_by(
            Clause::best_similarity(FUZZY_FIELDS, &text.normalized),
            threshold,
        );
        Some(query)
    }

    /// Chip announcing approximate results; its link drops the text query
    pub fn fuzzy_chip(&self) -> Chip {
        Chip {
            key: FUZZY_CHIP_KEY.to_string(),
            label: FUZZY_CHIP_LABEL.to_string(),
            remove_url: remove_url(&self.path, &self.raw, &["q"]),
        }
    }
}

/// Apply every recognized parameter in turn. Returns `None` when no
/// criterion is present, in which case no results should be shown.
pub fn apply(params: &SearchParams, path: &str) -> Option<AppliedFilters> {
    if !params.has_filters() {
        return None;
    }

    let mut chips = ChipBuilder::new(path, &params.raw);
    let mut others = Vec::new();

    let text = params.q.as_ref().and_then(|q| {
        let groups = expand_query(q);
        if groups.is_empty() {
            return None;
        }
        let clauses = groups
            .into_iter()
            .map(|group| Clause::contains_any(TEXT_FIELDS, &group.alternatives))
            .collect();
        chips.add("q", format!("“{q}”"));
        Some(TextFilter {
            raw: q.clone(),
            normalized: normalize(q),
            clauses,
        })
    });

    if let Some(category) = &params.category {
        others.push(Clause::eq(Column::Category, category.as_str()));
        chips.add("tipo", format!("Tipo: {}", category_label(category)));
    }

    if let Some(transaction) = &params.transaction {
        others.push(Clause::eq(Column::Transaction, transaction.as_str()));
        chips.add(
            "tipo_operacion",
            format!("Operación: {}", transaction_label(transaction)),
        );
    }

    if let Some(locality) = &params.locality {
        others.push(Clause::contains(Column::Locality, &normalize(locality)));
        chips.add("localidad", format!("Localidad: {locality}"));
    }

    if let Some(region) = &params.region {
        others.push(Clause::contains(Column::Region, &normalize(region)));
        chips.add("provincia", format!("Provincia: {region}"));
    }

    apply_price(params, &mut others, &mut chips);

    for (value, column, key, label) in [
        (params.bedrooms, Column::Bedrooms, "dormitorios", "Dormitorios"),
        (params.bathrooms, Column::Bathrooms, "banios", "Baños"),
        (params.garages, Column::Garages, "cocheras", "Cocheras"),
    ] {
        if let Some(n) = value {
            others.push(Clause::gte(column, n));
            chips.add(key, format!("{label}: {n}"));
        }
    }

    Some(AppliedFilters {
        text,
        others,
        chips: chips.finish(),
        path: path.to_string(),
        raw: params.raw.clone(),
    })
}

fn price_column(currency: Currency) -> Column {
    match currency {
        Currency::Usd => Column::PriceUsd,
        Currency::Ars => Column::PriceArs,
    }
}

/// `price_min`/`price_max` apply to the selected currency's field and only
/// listings priced in it qualify. The per-currency legacy bounds are used
/// only when no generic range was sent.
fn apply_price(params: &SearchParams, others: &mut Vec<Clause>, chips: &mut ChipBuilder<'_>) {
    if params.has_price_range() {
        let currency = params.range_currency();
        let column = price_column(currency);
        others.push(Clause::not_null(column));
        if let Some(min) = params.price_min {
            others.push(Clause::gte(column, min));
        }
        if let Some(max) = params.price_max {
            others.push(Clause::lte(column, max));
        }
        let label = format!(
            "{} {}–{}",
            currency.symbol(),
            params.price_min.map(format_thousands).unwrap_or_else(|| "0".into()),
            params.price_max.map(format_thousands).unwrap_or_else(|| "∞".into()),
        );
        chips.add_removing("price_range", label, PRICE_KEYS);
        return;
    }

    if let Some(currency) = params.currency {
        others.push(Clause::not_null(price_column(currency)));
        chips.add("currency", format!("Moneda: {}", currency.symbol()));
    }

    for (value, column, key, label) in [
        (params.usd_min, Column::PriceUsd, "usd_min", "USD mín"),
        (params.usd_max, Column::PriceUsd, "usd_max", "USD máx"),
        (params.ars_min, Column::PriceArs, "ars_min", "$ mín"),
        (params.ars_max, Column::PriceArs, "ars_max", "$ máx"),
    ] {
        if let Some(bound) = value {
            let clause = if key.ends_with("_min") {
                Clause::gte(column, bound)
            } else {
                Clause::lte(column, bound)
            };
            others.push(clause);
            chips.add(key, format!("{label}: {}", format_thousands(bound)));
        }
    }
}
