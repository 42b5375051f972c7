use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod choices;

pub use choices::{
    category_label, transaction_label, Category, PetType, PublicationState, TransactionType,
};

/// Location information for a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub address: String,
    pub locality: String,
    pub region: String,
    pub country: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            address: String::new(),
            locality: String::new(),
            region: String::new(),
            country: "Argentina".to_string(),
        }
    }
}

/// Asking price; at most one currency is expected but both are allowed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub usd: Option<f64>,
    pub ars: Option<f64>,
}

impl Price {
    /// "USD 150.000", "$ 95.000.000" or "A consultar" when no price is set.
    /// USD wins when both fields are populated.
    pub fn display(&self) -> String {
        match (self.usd, self.ars) {
            (Some(usd), _) => format!("USD {}", format_thousands(usd)),
            (None, Some(ars)) => format!("$ {}", format_thousands(ars)),
            (None, None) => "A consultar".to_string(),
        }
    }
}

/// Core listing data model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub transaction: TransactionType,
    pub price: Price,
    pub location: Location,
    pub accepts_pets: bool,
    pub pet_type: PetType,
    pub total_area: Option<f64>,
    pub covered_area: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub garages: Option<i64>,
    pub age_years: Option<i64>,
    /// Comma separated, unstructured
    pub amenities: String,
    pub main_image: Option<String>,
    pub featured: bool,
    pub state: PublicationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn amenity_list(&self) -> Vec<String> {
        self.amenities
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_published(&self) -> bool {
        self.state == PublicationState::Published
    }
}

/// Extra picture attached to a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub listing_id: i64,
    pub image: String,
    pub caption: String,
}

/// Fields accepted when creating or updating a listing.
/// Timestamps and the id are owned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    /// Left empty to get a generated `PROP-00042` style code
    pub code: Option<String>,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub transaction: TransactionType,
    pub price: Price,
    pub location: Location,
    pub accepts_pets: bool,
    pub pet_type: PetType,
    pub total_area: Option<f64>,
    pub covered_area: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub garages: Option<i64>,
    pub age_years: Option<i64>,
    pub amenities: String,
    pub main_image: Option<String>,
    pub featured: bool,
    pub state: PublicationState,
}

impl Default for NewListing {
    fn default() -> Self {
        Self {
            code: None,
            title: String::new(),
            description: String::new(),
            category: Category::Other,
            transaction: TransactionType::Sale,
            price: Price::default(),
            location: Location::default(),
            accepts_pets: false,
            pet_type: PetType::Unspecified,
            total_area: None,
            covered_area: None,
            bedrooms: None,
            bathrooms: None,
            garages: None,
            age_years: None,
            amenities: String::new(),
            main_image: None,
            featured: false,
            state: PublicationState::Draft,
        }
    }
}

/// Integer part of `n` with `.` as thousands separator: 1500000.0 -> "1.500.000"
pub fn format_thousands(n: f64) -> String {
    let whole = n.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
