//! Message pre-filled on the contact page when a visitor arrives from a listing.

use serde::Serialize;

use crate::models::Listing;

/// Descriptions longer than this are cut
const EXCERPT_LIMIT: usize = 420;
/// Characters kept when cutting
const EXCERPT_KEEP: usize = 400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactPrefill {
    pub listing_id: i64,
    pub subject: String,
    pub message: String,
}

impl ContactPrefill {
    pub fn for_listing(listing: &Listing) -> Self {
        let subject = format!("Consulta por {} - {}", listing.code, listing.title);

        let mut message = format!(
            "Hola, quisiera recibir más información sobre la siguiente propiedad:\n\n\
             Código: {}\n\
             Título: {}\n\
             Precio: {}\n\
             Dirección: {}\n\
             Localidad: {}\n\
             Provincia: {}\n",
            listing.code,
            listing.title,
            listing.price.display(),
            listing.location.address,
            listing.location.locality,
            listing.location.region,
        );
        let excerpt = excerpt(&listing.description);
        if !excerpt.is_empty() {
            message.push_str("\nDescripción: ");
            message.push_str(&excerpt);
            message.push('\n');
        }
        message.push_str("\n¡Muchas gracias!");

        Self {
            listing_id: listing.id,
            subject,
            message,
        }
    }
}

/// Description shortened for the message body; long texts keep their first
/// 400 characters followed by an ellipsis
pub fn excerpt(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= EXCERPT_LIMIT {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_KEEP).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Location, Price, PublicationState, TransactionType, PetType};
    use chrono::Utc;

    fn listing(description: &str, price: Price) -> Listing {
        Listing {
            id: 7,
            code: "PROP-00007".into(),
            title: "Casa quinta con pileta".into(),
            description: description.into(),
            category: Category::House,
            transaction: TransactionType::Sale,
            price,
            location: Location {
                address: "Calle 123".into(),
                locality: "Ezpeleta".into(),
                region: "Buenos Aires".into(),
                ..Location::default()
            },
            accepts_pets: true,
            pet_type: PetType::Dogs,
            total_area: Some(600.0),
            covered_area: Some(180.0),
            bedrooms: Some(3),
            bathrooms: Some(2),
            garages: Some(1),
            age_years: Some(15),
            amenities: "Pileta, Parque".into(),
            main_image: None,
            featured: false,
            state: PublicationState::Published,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn short_descriptions_are_kept() {
        assert_eq!(excerpt("  Amplio lote.  "), "Amplio lote.");
        let exactly = "a".repeat(420);
        assert_eq!(excerpt(&exactly), exactly);
    }

    #[test]
    fn long_descriptions_are_cut_with_ellipsis() {
        let long = "á".repeat(500);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), 401);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn prefill_interpolates_listing_fields() {
        let prefill = ContactPrefill::for_listing(&listing(
            "Hermosa casa quinta.",
            Price { usd: Some(185_000.0), ars: None },
        ));
        assert_eq!(prefill.subject, "Consulta por PROP-00007 - Casa quinta con pileta");
        assert!(prefill.message.contains("Código: PROP-00007"));
        assert!(prefill.message.contains("Precio: USD 185.000"));
        assert!(prefill.message.contains("Dirección: Calle 123"));
        assert!(prefill.message.contains("Localidad: Ezpeleta"));
        assert!(prefill.message.contains("Provincia: Buenos Aires"));
        assert!(prefill.message.contains("Descripción: Hermosa casa quinta."));
    }

    #[test]
    fn prefill_without_price_asks_for_it() {
        let prefill = ContactPrefill::for_listing(&listing("", Price::default()));
        assert!(prefill.message.contains("Precio: A consultar"));
        assert!(!prefill.message.contains("Descripción:"));
    }
}
