use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use minijinja::context;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use super::views::{ChoiceView, ListingCard, ListingDetail};
use super::{templates, AppState, LIST_PATH, SEARCH_PATH};
use crate::contact::ContactPrefill;
use crate::db::listings;
use crate::error::{AppError, AppResult};
use crate::models::{Category, TransactionType};
use crate::search::params::FILTER_KEYS;
use crate::search::query::ListingQuery;
use crate::search::{self, Paginator, SearchOutcome, SearchParams};
use crate::storage;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    propiedad_id: Option<String>,
}

pub async fn home(State(state): State<AppState>) -> AppResult<Html<String>> {
    let limit = state.settings.search.home_featured;
    let featured = state
        .db
        .call(move |conn| listings::featured(conn, limit))
        .await
        .map_err(AppError::Database)?;

    let cards = ListingCard::many(&featured, state.storage.as_ref());
    Ok(Html(templates::render(
        "home.html",
        context! { title => "Inicio", listings => cards },
    )?))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let per_page = state.settings.search.list_page_size;
    let page = state
        .db
        .call(move |conn| {
            let published = ListingQuery::published();
            let total = listings::count(conn, &published)?;
            let info = Paginator::new(total, per_page).page(query.page.as_deref());
            let items = listings::fetch(conn, &published, info.per_page, info.offset())?;
            Ok(search::Page { items, info })
        })
        .await
        .map_err(AppError::Database)?;

    let cards = ListingCard::many(&page.items, state.storage.as_ref());
    Ok(Html(templates::render(
        "list.html",
        context! {
            title => "Propiedades",
            listings => cards,
            page => page.info,
            path => LIST_PATH,
            base_query => "",
        },
    )?))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id: i64 = id.parse().map_err(|_| AppError::NotFound)?;
    let found = state
        .db
        .call(move |conn| {
            let Some(listing) = listings::get_published(conn, id)? else {
                return Ok(None);
            };
            let gallery = listings::gallery(conn, id)?;
            Ok(Some((listing, gallery)))
        })
        .await
        .map_err(AppError::Database)?;

    let (listing, gallery) = found.ok_or(AppError::NotFound)?;
    let view = ListingDetail::new(&listing, &gallery, state.storage.as_ref());
    Ok(Html(templates::render(
        "detail.html",
        context! { title => listing.title, listing => view },
    )?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Html<String>> {
    let params = SearchParams::from_pairs(pairs);
    let options = state.settings.search.options();

    let run_params = params.clone();
    let outcome = state
        .db
        .call(move |conn| search::run(conn, &run_params, SEARCH_PATH, &options))
        .await
        .map_err(|e| {
            error!("❌ Search failed for {:?}: {:#}", params.raw, e);
            AppError::Database(e)
        })?;

    let val: BTreeMap<&str, &str> = FILTER_KEYS
        .iter()
        .map(|key| (*key, params.raw_value(key)))
        .collect();
    let categories: Vec<ChoiceView> = Category::ALL
        .iter()
        .map(|c| ChoiceView { code: c.code(), label: c.label() })
        .collect();
    let transactions: Vec<ChoiceView> = TransactionType::ALL
        .iter()
        .map(|t| ChoiceView { code: t.code(), label: t.label() })
        .collect();

    let html = match outcome {
        SearchOutcome::NoFilters => templates::render(
            "search.html",
            context! {
                title => "Búsqueda",
                show_results => false,
                path => SEARCH_PATH,
                val,
                categories,
                transactions,
            },
        )?,
        SearchOutcome::Results(results) => {
            let cards = ListingCard::many(&results.page.items, state.storage.as_ref());
            templates::render(
                "search.html",
                context! {
                    title => "Búsqueda",
                    show_results => true,
                    listings => cards,
                    page => results.page.info,
                    chips => results.chips,
                    fuzzy => results.fuzzy,
                    base_query => results.base_query,
                    path => SEARCH_PATH,
                    val,
                    categories,
                    transactions,
                },
            )?
        }
    };
    Ok(Html(html))
}

pub async fn contact(
    State(state): State<AppState>,
    Query(query): Query<ContactQuery>,
) -> AppResult<Html<String>> {
    let id = query
        .propiedad_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok());

    let listing = match id {
        Some(id) => {
            let found = state
                .db
                .call(move |conn| listings::get_published(conn, id))
                .await
                .map_err(AppError::Database)?;
            if found.is_none() {
                debug!("Contact page for unknown listing {}", id);
                return Err(AppError::NotFound);
            }
            found
        }
        None => None,
    };

    let prefill = listing.as_ref().map(ContactPrefill::for_listing);
    let card = listing
        .as_ref()
        .map(|l| ListingCard::new(l, state.storage.as_ref()));
    Ok(Html(templates::render(
        "contact.html",
        context! {
            title => "Contacto",
            listing => card,
            prefill,
            emailjs => &state.settings.contact,
        },
    )?))
}

pub async fn media(State(state): State<AppState>, Path(path): Path<String>) -> AppResult<Response> {
    match state.storage.read(&path).await {
        Ok(Some(bytes)) => Ok((
            [(header::CONTENT_TYPE, storage::content_type(&path))],
            bytes,
        )
            .into_response()),
        Ok(None) => Err(AppError::NotFound),
        Err(e) => {
            warn!("Refused media request {:?}: {:#}", path, e);
            Err(AppError::NotFound)
        }
    }
}

pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let published = state
        .db
        .call(|conn| listings::count(conn, &ListingQuery::published()))
        .await
        .map_err(AppError::Database)?;
    Ok(Json(json!({
        "status": "healthy",
        "published_listings": published,
        "storage": state.storage.backend_name(),
    })))
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
