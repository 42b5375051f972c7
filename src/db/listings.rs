//! Listing and gallery repository. Plain functions over a borrowed
//! connection; callers pick the thread (see [`super::Database::call`]).

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::models::{
    Category, GalleryImage, Listing, Location, NewListing, PetType, Price, PublicationState,
    TransactionType,
};
use crate::search::query::{Clause, Column, ListingQuery, LISTING_COLUMNS};

fn parse_choice<T>(value: String, parse: fn(&str) -> Option<T>, what: &str) -> rusqlite::Result<T> {
    parse(&value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown {what} code {value:?}").into(),
        )
    })
}

/// Map a row selected with [`LISTING_COLUMNS`] (columns are read by name)
pub fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<Listing> {
    Ok(Listing {
        id: row.get("id")?,
        code: row.get::<_, Option<String>>("code")?.unwrap_or_default(),
        title: row.get("title")?,
        description: row.get("description")?,
        category: parse_choice(row.get("category")?, Category::from_code, "category")?,
        transaction: parse_choice(
            row.get("transaction_type")?,
            TransactionType::from_code,
            "transaction",
        )?,
        price: Price {
            usd: row.get("price_usd")?,
            ars: row.get("price_ars")?,
        },
        location: Location {
            address: row.get("address")?,
            locality: row.get("locality")?,
            region: row.get("region")?,
            country: row.get("country")?,
        },
        accepts_pets: row.get("accepts_pets")?,
        pet_type: parse_choice(row.get("pet_type")?, PetType::from_code, "pet type")?,
        total_area: row.get("total_area")?,
        covered_area: row.get("covered_area")?,
        bedrooms: row.get("bedrooms")?,
        bathrooms: row.get("bathrooms")?,
        garages: row.get("garages")?,
        age_years: row.get("age_years")?,
        amenities: row.get("amenities")?,
        main_image: row.get("main_image")?,
        featured: row.get("featured")?,
        state: parse_choice(row.get("state")?, PublicationState::from_code, "publication state")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Code given to listings created without one
pub fn generated_code(id: i64) -> String {
    format!("PROP-{id:05}")
}

/// Insert a listing stamped with the current time; returns its id
pub fn insert_listing(conn: &mut Connection, listing: &NewListing) -> Result<i64> {
    let now = Utc::now();
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO listings (code, title, description, category, transaction_type, \
         price_usd, price_ars, address, locality, region, country, accepts_pets, pet_type, \
         total_area, covered_area, bedrooms, bathrooms, garages, age_years, amenities, \
         main_image, featured, state, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
         ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?24)",
        params![
            listing.code.as_deref().filter(|c| !c.trim().is_empty()),
            listing.title,
            listing.description,
            listing.category.code(),
            listing.transaction.code(),
            listing.price.usd,
            listing.price.ars,
            listing.location.address,
            listing.location.locality,
            listing.location.region,
            listing.location.country,
            listing.accepts_pets,
            listing.pet_type.code(),
            listing.total_area,
            listing.covered_area,
            listing.bedrooms,
            listing.bathrooms,
            listing.garages,
            listing.age_years,
            listing.amenities,
            listing.main_image,
            listing.featured,
            listing.state.code(),
            now,
        ],
    )
    .context("Failed to insert listing")?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE listings SET code = ?1 WHERE id = ?2 AND code IS NULL",
        params![generated_code(id), id],
    )?;
    tx.commit()?;
    Ok(id)
}

/// Overwrite every editable field; `updated_at` is refreshed
pub fn update_listing(conn: &Connection, id: i64, listing: &NewListing) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE listings SET code = COALESCE(?1, code), title = ?2, description = ?3, \
             category = ?4, transaction_type = ?5, price_usd = ?6, price_ars = ?7, address = ?8, \
             locality = ?9, region = ?10, country = ?11, accepts_pets = ?12, pet_type = ?13, \
             total_area = ?14, covered_area = ?15, bedrooms = ?16, bathrooms = ?17, \
             garages = ?18, age_years = ?19, amenities = ?20, main_image = ?21, featured = ?22, \
             state = ?23, updated_at = max(?24, created_at) WHERE id = ?25",
            params![
                listing.code.as_deref().filter(|c| !c.trim().is_empty()),
                listing.title,
                listing.description,
                listing.category.code(),
                listing.transaction.code(),
                listing.price.usd,
                listing.price.ars,
                listing.location.address,
                listing.location.locality,
                listing.location.region,
                listing.location.country,
                listing.accepts_pets,
                listing.pet_type.code(),
                listing.total_area,
                listing.covered_area,
                listing.bedrooms,
                listing.bathrooms,
                listing.garages,
                listing.age_years,
                listing.amenities,
                listing.main_image,
                listing.featured,
                listing.state.code(),
                Utc::now(),
                id,
            ],
        )
        .context("Failed to update listing")?;
    if changed == 0 {
        return Err(anyhow!("listing {id} does not exist"));
    }
    Ok(())
}

/// Point the listing at a stored primary image; also a modification
pub fn set_main_image(conn: &Connection, id: i64, image: &str) -> Result<()> {
    conn.execute(
        "UPDATE listings SET main_image = ?1, updated_at = max(?2, created_at) WHERE id = ?3",
        params![image, Utc::now(), id],
    )
    .context("Failed to set main image")?;
    Ok(())
}

/// Move `updated_at`; values earlier than `created_at` are raised to it
pub fn touch(conn: &Connection, id: i64, at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE listings SET updated_at = max(?1, created_at) WHERE id = ?2",
        params![at, id],
    )
    .context("Failed to touch listing")?;
    Ok(())
}

/// Delete a listing; its gallery goes with it. Returns whether it existed.
pub fn delete_listing(conn: &Connection, id: i64) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM listings WHERE id = ?1", params![id])
        .context("Failed to delete listing")?;
    Ok(removed > 0)
}

/// Remove every listing and gallery image; returns the listing count
pub fn delete_all(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM listings", [])
        .context("Failed to delete listings")
}

pub fn add_gallery_image(conn: &Connection, listing_id: i64, image: &str, caption: &str) -> Result<i64> {
    let caption: String = caption.chars().take(100).collect();
    conn.execute(
        "INSERT INTO gallery_images (listing_id, image, caption) VALUES (?1, ?2, ?3)",
        params![listing_id, image, caption],
    )
    .context("Failed to insert gallery image")?;
    Ok(conn.last_insert_rowid())
}

pub fn gallery(conn: &Connection, listing_id: i64) -> Result<Vec<GalleryImage>> {
    let mut stmt = conn.prepare(
        "SELECT id, listing_id, image, caption FROM gallery_images WHERE listing_id = ?1 ORDER BY id",
    )?;
    let images = stmt
        .query_map(params![listing_id], |row| {
            Ok(GalleryImage {
                id: row.get(0)?,
                listing_id: row.get(1)?,
                image: row.get(2)?,
                caption: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(images)
}

/// Any listing by id, whatever its publication state
pub fn get_listing(conn: &Connection, id: i64) -> Result<Option<Listing>> {
    conn.query_row(
        &format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?1"),
        params![id],
        listing_from_row,
    )
    .optional()
    .context("Failed to load listing")
}

/// A listing only if it is published
pub fn get_published(conn: &Connection, id: i64) -> Result<Option<Listing>> {
    Ok(get_listing(conn, id)?.filter(Listing::is_published))
}

/// Number of rows matched by `query`
pub fn count(conn: &Connection, query: &ListingQuery) -> Result<u64> {
    let (sql, params) = query.count_sql();
    let n: i64 = conn
        .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))
        .context("Failed to count listings")?;
    Ok(n.max(0) as u64)
}

/// One ordered slice of `query`
pub fn fetch(conn: &Connection, query: &ListingQuery, limit: u64, offset: u64) -> Result<Vec<Listing>> {
    let (sql, params) = query.select_sql(limit as i64, offset as i64);
    let mut stmt = conn.prepare(&sql).context("Failed to prepare listing query")?;
    let listings = stmt
        .query_map(params_from_iter(params.iter()), listing_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read listings")?;
    Ok(listings)
}

/// Featured, published listings, most recently updated first
pub fn featured(conn: &Connection, limit: u64) -> Result<Vec<Listing>> {
    let mut query = ListingQuery::published();
    query.filter(Clause::eq(Column::Featured, 1_i64));
    fetch(conn, &query, limit, 0)
}

/// Listings by id order for maintenance tools: the given ids, or the
/// first `limit` rows
pub fn by_ids_or_first(conn: &Connection, ids: Option<&[i64]>, limit: u64) -> Result<Vec<Listing>> {
    let listings = match ids {
        Some(ids) => {
            let mut found = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(listing) = get_listing(conn, *id)? {
                    found.push(listing);
                }
            }
            found
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LISTING_COLUMNS} FROM listings ORDER BY id LIMIT ?1"
            ))?;
            let rows = stmt
                .query_map(params![limit as i64], listing_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::Duration;

    fn sample(title: &str, state: PublicationState) -> NewListing {
        NewListing {
            title: title.to_string(),
            description: format!("{title}. Publicación de ejemplo."),
            category: Category::House,
            transaction: TransactionType::Sale,
            price: Price { usd: Some(100_000.0), ars: None },
            location: Location {
                address: "Calle 12".into(),
                locality: "Bernal".into(),
                region: "Buenos Aires".into(),
                ..Location::default()
            },
            state,
            ..NewListing::default()
        }
    }

    async fn with_db<F, R>(f: F) -> R
    where
        F: FnOnce(&mut Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        Database::open_in_memory().unwrap().call(f).await.unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_code_and_timestamps() {
        let listing = with_db(|conn| {
            let id = insert_listing(conn, &sample("Casa quinta", PublicationState::Published))?;
            Ok(get_listing(conn, id)?.unwrap())
        })
        .await;
        assert_eq!(listing.code, generated_code(listing.id));
        assert_eq!(listing.location.country, "Argentina");
        assert!(listing.updated_at >= listing.created_at);
        assert_eq!(listing.price.display(), "USD 100.000");
    }

    #[tokio::test]
    async fn explicit_codes_are_kept() {
        let code = with_db(|conn| {
            let mut new = sample("Oficina", PublicationState::Draft);
            new.code = Some("OF-1".into());
            let id = insert_listing(conn, &new)?;
            Ok(get_listing(conn, id)?.unwrap().code)
        })
        .await;
        assert_eq!(code, "OF-1");
    }

    #[tokio::test]
    async fn update_refreshes_timestamp_and_touch_never_goes_back() {
        let (before, after, touched) = with_db(|conn| {
            let id = insert_listing(conn, &sample("Depósito", PublicationState::Draft))?;
            let before = get_listing(conn, id)?.unwrap();
            let mut changed = sample("Depósito amplio", PublicationState::Published);
            changed.bedrooms = Some(0);
            update_listing(conn, id, &changed)?;
            let after = get_listing(conn, id)?.unwrap();
            touch(conn, id, before.created_at - Duration::days(30))?;
            let touched = get_listing(conn, id)?.unwrap();
            Ok((before, after, touched))
        })
        .await;
        assert_eq!(after.title, "Depósito amplio");
        assert_eq!(after.code, before.code);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(touched.updated_at, touched.created_at);
    }

    #[tokio::test]
    async fn updating_missing_listing_fails() {
        let db = Database::open_in_memory().unwrap();
        let result = db
            .call(|conn| update_listing(conn, 404, &sample("x", PublicationState::Draft)))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn deleting_a_listing_deletes_its_gallery() {
        let (remaining, other) = with_db(|conn| {
            let id = insert_listing(conn, &sample("Casa", PublicationState::Published))?;
            let keep = insert_listing(conn, &sample("Terreno", PublicationState::Published))?;
            add_gallery_image(conn, id, "propiedades/galeria/1.webp", "Frente")?;
            add_gallery_image(conn, id, "propiedades/galeria/2.webp", "Patio")?;
            add_gallery_image(conn, keep, "propiedades/galeria/3.webp", "Lote")?;
            assert!(delete_listing(conn, id)?);
            let remaining: i64 = conn.query_row(
                "SELECT COUNT(*) FROM gallery_images WHERE listing_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            Ok((remaining, gallery(conn, keep)?))
        })
        .await;
        assert_eq!(remaining, 0);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].caption, "Lote");
    }

    #[tokio::test]
    async fn unpublished_listings_are_hidden_from_public_reads() {
        let (draft, archived, published, featured_titles) = with_db(|conn| {
            let draft = insert_listing(conn, &sample("Borrador", PublicationState::Draft))?;
            let archived = insert_listing(conn, &sample("Vieja", PublicationState::Archived))?;
            let mut star = sample("Destacada", PublicationState::Published);
            star.featured = true;
            let published = insert_listing(conn, &star)?;
            let mut hidden_star = sample("Destacada oculta", PublicationState::Draft);
            hidden_star.featured = true;
            insert_listing(conn, &hidden_star)?;
            let titles: Vec<String> = featured(conn, 6)?.into_iter().map(|l| l.title).collect();
            Ok((
                get_published(conn, draft)?,
                get_published(conn, archived)?,
                get_published(conn, published)?,
                titles,
            ))
        })
        .await;
        assert!(draft.is_none());
        assert!(archived.is_none());
        assert!(published.is_some());
        assert_eq!(featured_titles, vec!["Destacada"]);
    }

    #[tokio::test]
    async fn fetch_orders_by_most_recent_update() {
        let titles = with_db(|conn| {
            let old = insert_listing(conn, &sample("Primera", PublicationState::Published))?;
            insert_listing(conn, &sample("Segunda", PublicationState::Published))?;
            touch(conn, old, Utc::now() + Duration::hours(1))?;
            let query = ListingQuery::published();
            Ok(fetch(conn, &query, 10, 0)?
                .into_iter()
                .map(|l| l.title)
                .collect::<Vec<_>>())
        })
        .await;
        assert_eq!(titles, vec!["Primera", "Segunda"]);
    }

    #[tokio::test]
    async fn maintenance_lookup_by_ids() {
        let titles = with_db(|conn| {
            for title in ["a", "b", "c"] {
                insert_listing(conn, &sample(title, PublicationState::Draft))?;
            }
            let picked = by_ids_or_first(conn, Some(&[3, 1, 99]), 50)?;
            let first = by_ids_or_first(conn, None, 2)?;
            Ok((picked, first))
        })
        .await;
        let picked: Vec<&str> = titles.0.iter().map(|l| l.title.as_str()).collect();
        let first: Vec<&str> = titles.1.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(picked, vec!["c", "a"]);
        assert_eq!(first, vec!["a", "b"]);
    }
}
