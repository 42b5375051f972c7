//! Listing media report: which stored files each listing points at, whether
//! they exist and where they are served from.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::db::{listings, Database};
use crate::models::{GalleryImage, Listing};
use crate::storage::MediaStorage;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Listings shown when no ids are given
    pub limit: u64,
    /// Id expression such as `1,2,10-15`
    pub ids: Option<String>,
    /// Include gallery images
    pub related: bool,
    pub csv: Option<PathBuf>,
    /// Print rows as JSON instead of text
    pub json: bool,
    /// Shown in the environment header
    pub database: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            limit: 50,
            ids: None,
            related: false,
            csv: None,
            json: false,
            database: String::new(),
        }
    }
}

/// One inspected file reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub listing_id: i64,
    pub title: String,
    pub is_main: bool,
    pub file_name: String,
    pub exists: bool,
    pub url: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub listings: usize,
    pub files: usize,
    pub rows: Vec<ReportRow>,
}

/// Expand `"1,2,10-15"` into sorted, unique ids; reversed ranges are accepted
pub fn parse_ids(expr: &str) -> Result<Vec<i64>> {
    let mut ids = BTreeSet::new();
    for part in expr.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let parse = |s: &str| {
            s.trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid id {s:?} in {expr:?}"))
        };
        match part.split_once('-') {
            Some((a, b)) => {
                let (a, b) = (parse(a)?, parse(b)?);
                ids.extend(a.min(b)..=a.max(b));
            }
            None => {
                ids.insert(parse(part)?);
            }
        }
    }
    if ids.is_empty() {
        bail!("No ids in {expr:?}");
    }
    Ok(ids.into_iter().collect())
}

pub async fn run(
    db: &Database,
    storage: &dyn MediaStorage,
    options: &ReportOptions,
    out: &mut dyn Write,
) -> Result<ReportSummary> {
    let ids = options.ids.as_deref().map(parse_ids).transpose()?;
    let limit = options.limit;
    let related = options.related;

    let found: Vec<(Listing, Vec<GalleryImage>)> = db
        .call(move |conn| {
            let selected = listings::by_ids_or_first(conn, ids.as_deref(), limit)?;
            selected
                .into_iter()
                .map(|listing| {
                    let gallery = if related {
                        listings::gallery(conn, listing.id)?
                    } else {
                        Vec::new()
                    };
                    Ok((listing, gallery))
                })
                .collect()
        })
        .await?;

    if !options.json {
        writeln!(out, "=== ENTORNO ===")?;
        writeln!(out, "Fecha: {}", Utc::now().to_rfc3339())?;
        writeln!(out, "Base de datos: SQLite | {}", options.database)?;
        writeln!(out, "Storage: {}\n", storage.backend_name())?;
    }

    let mut summary = ReportSummary {
        listings: found.len(),
        ..ReportSummary::default()
    };

    for (listing, gallery) in &found {
        if !options.json {
            writeln!(out, "Propiedad #{} - {}", listing.id, listing.title)?;
        }

        match &listing.main_image {
            Some(name) => {
                let row = inspect(storage, listing, name, true).await;
                if !options.json {
                    writeln!(
                        out,
                        "  - imagen_principal: name='{}' | exists={} | url={}",
                        row.file_name, row.exists, row.url
                    )?;
                }
                summary.files += 1;
                summary.rows.push(row);
            }
            None => {
                if !options.json {
                    writeln!(out, "  - imagen_principal: (sin asignar)")?;
                }
                summary.rows.push(ReportRow {
                    listing_id: listing.id,
                    title: listing.title.clone(),
                    is_main: true,
                    file_name: String::new(),
                    exists: false,
                    url: String::new(),
                });
            }
        }

        for image in gallery {
            let row = inspect(storage, listing, &image.image, false).await;
            if !options.json {
                writeln!(
                    out,
                    "  - [galeria#{}] imagen: name='{}' | exists={} | url={}",
                    image.id, row.file_name, row.exists, row.url
                )?;
            }
            summary.files += 1;
            summary.rows.push(row);
        }

        if !options.json {
            writeln!(out)?;
        }
    }

    if let Some(path) = &options.csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(file, &summary.rows)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 CSV written to {} ({} rows)", path.display(), summary.rows.len());
    }

    if options.json {
        serde_json::to_writer_pretty(&mut *out, &summary.rows)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Propiedades listadas: {}", summary.listings)?;
        writeln!(out, "Registros de archivos inspeccionados: {}", summary.files)?;
    }

    Ok(summary)
}

async fn inspect(storage: &dyn MediaStorage, listing: &Listing, name: &str, is_main: bool) -> ReportRow {
    ReportRow {
        listing_id: listing.id,
        title: listing.title.clone(),
        is_main,
        file_name: name.to_string(),
        exists: storage.exists(name).await.unwrap_or(false),
        url: storage.url(name),
    }
}

/// Rows as CSV with a header line
pub fn write_csv<W: Write>(out: W, rows: &[ReportRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["prop_id", "titulo", "es_principal", "file_name", "exists", "url"])?;
    for row in rows {
        writer.write_record([
            row.listing_id.to_string().as_str(),
            row.title.as_str(),
            if row.is_main { "true" } else { "false" },
            row.file_name.as_str(),
            if row.exists { "true" } else { "false" },
            row.url.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
