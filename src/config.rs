//! Application settings.
//!
//! Layered as: built-in defaults, then an optional `housing-catalog.toml`
//! (or the file given with `--config`), then `HOUSING__*` environment
//! variables, e.g. `HOUSING__SERVER__BIND=0.0.0.0:8000`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::search::{fuzzy, paginate, SearchOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub media: MediaSettings,
    pub search: SearchSettings,
    pub contact: ContactSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSettings {
    pub root: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    pub page_size: u64,
    pub list_page_size: u64,
    pub home_featured: u64,
    pub fuzzy_threshold: f64,
    /// Re-apply category/price/etc. filters to the approximate pass
    pub fuzzy_keeps_filters: bool,
}

/// EmailJS identifiers rendered into the contact page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSettings {
    pub emailjs_public_key: String,
    pub emailjs_service_id: String,
    pub emailjs_template_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerSettings {
                bind: "127.0.0.1:8000".to_string(),
            },
            database: DatabaseSettings {
                path: PathBuf::from("data/catalog.sqlite3"),
            },
            media: MediaSettings {
                root: PathBuf::from("media"),
                url: "/media/".to_string(),
            },
            search: SearchSettings {
                page_size: paginate::SEARCH_PAGE_SIZE,
                list_page_size: paginate::LIST_PAGE_SIZE,
                home_featured: paginate::HOME_FEATURED,
                fuzzy_threshold: fuzzy::DEFAULT_THRESHOLD,
                fuzzy_keeps_filters: false,
            },
            contact: ContactSettings::default(),
        }
    }
}

impl SearchSettings {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            page_size: self.page_size,
            fuzzy_threshold: self.fuzzy_threshold,
            fuzzy_keeps_filters: self.fuzzy_keeps_filters,
        }
    }
}

impl Settings {
    /// Load settings; a missing default file is fine, a missing explicit one is not
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Settings::default())
            .context("Failed to serialize default settings")?;

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("housing-catalog").required(false),
        };

        Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(Environment::with_prefix("HOUSING").separator("__"))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_page_sizes() {
        let settings = Settings::default();
        assert_eq!(settings.search.page_size, 12);
        assert_eq!(settings.search.list_page_size, 18);
        assert_eq!(settings.search.home_featured, 6);
        assert!(!settings.search.fuzzy_keeps_filters);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nbind = \"0.0.0.0:9000\"\n\n[search]\nfuzzy_keeps_filters = true\n\n[contact]\nemailjs_public_key = \"pk\""
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.server.bind, "0.0.0.0:9000");
        assert!(settings.search.fuzzy_keeps_filters);
        assert_eq!(settings.search.page_size, 12);
        assert_eq!(settings.contact.emailjs_public_key, "pk");
        assert_eq!(settings.media.url, "/media/");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }
}
