//! Template-facing shapes of the domain models.

use serde::Serialize;

use crate::models::{format_thousands, GalleryImage, Listing, TransactionType};
use crate::storage::MediaStorage;

/// Listing as shown on cards (home, list, search)
#[derive(Debug, Clone, Serialize)]
pub struct ListingCard {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub category: &'static str,
    pub transaction: &'static str,
    pub price: String,
    pub address: String,
    pub locality: String,
    pub region: String,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub garages: Option<i64>,
    pub covered_area: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub url: String,
    pub contact_url: String,
}

impl ListingCard {
    pub fn new(listing: &Listing, storage: &dyn MediaStorage) -> Self {
        Self {
            id: listing.id,
            code: listing.code.clone(),
            title: listing.title.clone(),
            category: listing.category.label(),
            transaction: listing.transaction.label(),
            price: price_with_period(listing),
            address: listing.location.address.clone(),
            locality: listing.location.locality.clone(),
            region: listing.location.region.clone(),
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            garages: listing.garages,
            covered_area: listing.covered_area.map(|m| format!("{} m²", format_thousands(m))),
            image_url: listing.main_image.as_deref().map(|name| storage.url(name)),
            featured: listing.featured,
            url: detail_url(listing.id),
            contact_url: format!("/contacto/?propiedad_id={}", listing.id),
        }
    }

    pub fn many(listings: &[Listing], storage: &dyn MediaStorage) -> Vec<Self> {
        listings.iter().map(|l| Self::new(l, storage)).collect()
    }
}

/// Full listing for the detail page
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub card: ListingCard,
    pub description: String,
    pub country: String,
    pub total_area: Option<String>,
    pub age_years: Option<i64>,
    pub amenities: Vec<String>,
    pub pets: String,
    pub gallery: Vec<GalleryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryView {
    pub url: String,
    pub caption: String,
}

impl ListingDetail {
    pub fn new(listing: &Listing, gallery: &[GalleryImage], storage: &dyn MediaStorage) -> Self {
        let pets = if listing.accepts_pets {
            format!("Sí ({})", listing.pet_type.label())
        } else {
            "No".to_string()
        };
        Self {
            card: ListingCard::new(listing, storage),
            description: listing.description.clone(),
            country: listing.location.country.clone(),
            total_area: listing.total_area.map(|m| format!("{} m²", format_thousands(m))),
            age_years: listing.age_years,
            amenities: listing.amenity_list(),
            pets,
            gallery: gallery
                .iter()
                .map(|img| GalleryView {
                    url: storage.url(&img.image),
                    caption: img.caption.clone(),
                })
                .collect(),
        }
    }
}

pub fn detail_url(id: i64) -> String {
    format!("/propiedades/{id}/")
}

/// Rentals read better with a period
fn price_with_period(listing: &Listing) -> String {
    let price = listing.price.display();
    let priced = listing.price.usd.is_some() || listing.price.ars.is_some();
    if priced && listing.transaction == TransactionType::Rental {
        format!("{price} / mes")
    } else {
        price
    }
}

/// Choice lists for the search form selects
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceView {
    pub code: &'static str,
    pub label: &'static str,
}
