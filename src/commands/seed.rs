//! Synthetic catalog data for demos and local development.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::db::{listings, Database};
use crate::models::{
    Category, Location, NewListing, PetType, Price, PublicationState, TransactionType,
};
use crate::storage::MediaStorage;

const TITLES: &[&str] = &[
    "Casa en zona céntrica",
    "Departamento moderno con balcón",
    "Terreno ideal para inversión",
    "Local comercial sobre avenida principal",
    "Oficina amoblada en el centro",
    "Galpón industrial",
    "Depósito amplio",
    "Casa quinta con pileta",
];
const LOCALITIES: &[&str] = &[
    "Quilmes",
    "Bernal",
    "Ezpeleta",
    "Avellaneda",
    "Lanús",
    "Lomas de Zamora",
];
const REGIONS: &[&str] = &["Buenos Aires"];
const AMENITIES: &[&str] = &[
    "Pileta",
    "Parque",
    "Gimnasio",
    "Parrilla",
    "Terraza",
    "Seguridad 24hs",
    "Cochera cubierta",
];

/// Pesos per dollar used to derive ARS prices
pub const USD_ARS: f64 = 1300.0;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const PLACEHOLDER_SIZE: (u32, u32) = (640, 400);

pub const MAIN_IMAGE_DIR: &str = "propiedades/imagenes_principal";
pub const GALLERY_DIR: &str = "propiedades/galeria";
pub const MEDIA_PREFIX: &str = "propiedades";
const GALLERY_CAPTION: &str = "Imagen ilustrativa";

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub count: usize,
    /// Delete every listing first
    pub truncate: bool,
    /// Share of listings priced in USD
    pub usd_ratio: f64,
    /// Fixed RNG seed for reproducible data
    pub seed: Option<u64>,
    /// Source pictures; placeholders are drawn when absent or empty
    pub images_dir: Option<PathBuf>,
    /// Delete stored media under `propiedades/` first
    pub purge_media: bool,
    /// Share of listings left as drafts
    pub draft_ratio: f64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            count: 50,
            truncate: false,
            usd_ratio: 0.30,
            seed: None,
            images_dir: None,
            purge_media: false,
            draft_ratio: 0.0,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub deleted: usize,
    pub purged: usize,
    pub created: usize,
    pub images: usize,
}

pub async fn run(
    db: &Database,
    storage: &dyn MediaStorage,
    options: &SeedOptions,
) -> Result<SeedSummary> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut summary = SeedSummary::default();

    if options.purge_media {
        for name in storage.list(MEDIA_PREFIX).await? {
            storage.delete(&name).await?;
            summary.purged += 1;
        }
        info!("🧹 Purged {} media file(s) under {}/", summary.purged, MEDIA_PREFIX);
    }

    if options.truncate {
        summary.deleted = db.call(|conn| listings::delete_all(conn)).await?;
        info!("🧹 Deleted {} existing listing(s)", summary.deleted);
    }

    let sources = match &options.images_dir {
        Some(dir) => collect_images(dir)?,
        None => Vec::new(),
    };
    if sources.is_empty() {
        info!("No source images, drawing placeholders");
    } else {
        info!("Using {} source image(s)", sources.len());
    }

    info!("🌱 Seeding {} listing(s)...", options.count);
    for _ in 0..options.count {
        let listing = random_listing(&mut rng, options.usd_ratio, options.draft_ratio);
        let id = db
            .call(move |conn| listings::insert_listing(conn, &listing))
            .await?;

        let main = picture(&mut rng, &sources)?;
        let main_name = storage
            .save(&format!("{MAIN_IMAGE_DIR}/{id}_principal.webp"), &main)
            .await?;
        db.call(move |conn| listings::set_main_image(conn, id, &main_name))
            .await?;
        summary.images += 1;

        for _ in 0..rng.gen_range(2..=4) {
            let bytes = picture(&mut rng, &sources)?;
            let suffix: u32 = rng.gen_range(1..=9999);
            let name = storage
                .save(&format!("{GALLERY_DIR}/{id}_{suffix}.webp"), &bytes)
                .await?;
            db.call(move |conn| listings::add_gallery_image(conn, id, &name, GALLERY_CAPTION))
                .await?;
            summary.images += 1;
        }

        summary.created += 1;
        debug!("Seeded listing {}", id);
    }

    info!(
        "✅ {} listing(s) seeded with {} image(s)",
        summary.created, summary.images
    );
    Ok(summary)
}

/// One listing drawn from the sample pools
pub fn random_listing(rng: &mut impl Rng, usd_ratio: f64, draft_ratio: f64) -> NewListing {
    let title = pick(rng, TITLES);
    let transaction = *pick(rng, TransactionType::ALL);

    let price = if rng.gen_bool(usd_ratio.clamp(0.0, 1.0)) {
        Price {
            usd: Some(rng.gen_range(400..=2000) as f64),
            ars: None,
        }
    } else {
        let reference_usd: f64 = match transaction {
            TransactionType::Rental => rng.gen_range(200..=1200) as f64,
            TransactionType::Sale => rng.gen_range(30_000..=250_000) as f64,
        };
        let step = if rng.gen_bool(0.5) { 500.0 } else { 1000.0 };
        Price {
            usd: None,
            ars: Some(round_to_step(reference_usd * USD_ARS, step)),
        }
    };

    let mut amenities: Vec<&str> = AMENITIES.to_vec();
    amenities.shuffle(rng);
    amenities.truncate(rng.gen_range(2..=5));

    let state = if rng.gen_bool(draft_ratio.clamp(0.0, 1.0)) {
        PublicationState::Draft
    } else {
        PublicationState::Published
    };

    NewListing {
        title: title.to_string(),
        description: format!(
            "{title}. Los datos mostrados son ilustrativos y solo para pruebas. \
             Esta publicación es de ejemplo."
        ),
        category: *pick(rng, Category::ALL),
        transaction,
        price,
        location: Location {
            address: format!("Calle {}", rng.gen_range(1..=999)),
            locality: pick(rng, LOCALITIES).to_string(),
            region: pick(rng, REGIONS).to_string(),
            ..Location::default()
        },
        accepts_pets: rng.gen_bool(0.5),
        pet_type: *pick(rng, PetType::ALL),
        total_area: Some(rng.gen_range(120..=900) as f64),
        covered_area: Some(rng.gen_range(40..=500) as f64),
        bedrooms: Some(rng.gen_range(1..=5)),
        bathrooms: Some(rng.gen_range(1..=3)),
        garages: Some(rng.gen_range(0..=3)),
        age_years: Some(rng.gen_range(0..=50)),
        amenities: amenities.join(", "),
        featured: rng.gen_bool(0.5),
        state,
        ..NewListing::default()
    }
}

fn pick<'a, T>(rng: &mut impl Rng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Nearest multiple of `step`, halves rounded up
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value.round();
    }
    (value / step).round() * step
}

/// Image files directly or recursively below `dir`
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if !dir.exists() {
        warn!("Images directory {} does not exist", dir.display());
        return Ok(found);
    }
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current)
            .with_context(|| format!("Failed to read {}", current.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if has_image_extension(&path) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// WebP bytes for a random source picture, or a placeholder. Unreadable
/// sources fall back to a placeholder too.
fn picture(rng: &mut impl Rng, sources: &[PathBuf]) -> Result<Vec<u8>> {
    if let Some(path) = sources.choose(rng) {
        match convert_to_webp(path) {
            Ok(bytes) => return Ok(bytes),
            Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
        }
    }
    placeholder(rng)
}

pub fn convert_to_webp(path: &Path) -> Result<Vec<u8>> {
    let img = image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    encode_webp(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Diagonal gradient between two random colors
pub fn placeholder(rng: &mut impl Rng) -> Result<Vec<u8>> {
    let from: [u8; 3] = rng.gen();
    let to: [u8; 3] = rng.gen();
    let (w, h) = PLACEHOLDER_SIZE;
    let span = (w + h) as f32;
    let img = RgbImage::from_fn(w, h, |x, y| {
        let t = (x + y) as f32 / span;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2])])
    });
    encode_webp(DynamicImage::ImageRgb8(img))
}

fn encode_webp(img: DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::WebP)
        .context("Failed to encode WebP")?;
    Ok(bytes)
}
