//! Advanced listing search.
//!
//! Request parameters are parsed into [`SearchParams`], turned into query
//! restrictions and chips by [`pipeline::apply`], executed against the store,
//! retried with trigram similarity when free text found nothing, and finally
//! paginated.

pub mod chips;
pub mod fuzzy;
mod normalize;
pub mod paginate;
pub mod params;
pub mod pipeline;
pub mod query;
mod synonyms;
pub mod tokens;

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::db::listings;
use crate::models::Listing;

pub use chips::Chip;
pub use normalize::normalize;
pub use paginate::{Page, PageInfo, Paginator};
pub use params::SearchParams;
pub use tokens::{expand_query, expand_tokens, TokenGroup};

/// Tunables for one search run
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub page_size: u64,
    pub fuzzy_threshold: f64,
    /// Re-apply non-text filters during the approximate pass
    pub fuzzy_keeps_filters: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page_size: paginate::SEARCH_PAGE_SIZE,
            fuzzy_threshold: fuzzy::DEFAULT_THRESHOLD,
            fuzzy_keeps_filters: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub page: Page<Listing>,
    pub chips: Vec<Chip>,
    /// Results come from the similarity fallback
    pub fuzzy: bool,
    /// Current query string without `page`, for pagination links
    pub base_query: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// No criterion given; show the prompt instead of the whole catalog
    NoFilters,
    Results(SearchResults),
}

/// Run a search for the request at `path` with the given parameters
pub fn run(
    conn: &Connection,
    params: &SearchParams,
    path: &str,
    options: &SearchOptions,
) -> Result<SearchOutcome> {
    let Some(applied) = pipeline::apply(params, path) else {
        debug!("Search without criteria, nothing to show");
        return Ok(SearchOutcome::NoFilters);
    };

    let mut chips = applied.chips.clone();
    let mut query = applied.exact_query();
    let mut total = listings::count(conn, &query)?;
    let mut fuzzy = false;

    if total == 0 {
        if let Some(fallback) =
            applied.fuzzy_query(options.fuzzy_keeps_filters, options.fuzzy_threshold)
        {
            let fallback_total = listings::count(conn, &fallback)?;
            info!(
                "🔎 No exact match for {:?}; {} approximate result(s)",
                params.q.as_deref().unwrap_or_default(),
                fallback_total
            );
            query = fallback;
            total = fallback_total;
            fuzzy = true;
            chips.push(applied.fuzzy_chip());
        }
    }

    let info = Paginator::new(total, options.page_size).page(params.page.as_deref());
    let items = listings::fetch(conn, &query, info.per_page, info.offset())?;
    debug!(
        "Search matched {} listing(s), page {}/{}",
        total, info.number, info.num_pages
    );

    Ok(SearchOutcome::Results(SearchResults {
        page: Page { items, info },
        chips,
        fuzzy,
        base_query: chips::query_string(&params.raw, &["page"]),
    }))
}
