//! SQLite-backed listing store.
//!
//! Every connection gets two scalar functions the search queries rely on:
//! `norm(text)` (accent/case folding) and `similarity(a, b)` (trigram score).

pub mod listings;
mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::search::{fuzzy, normalize};

/// Shared handle to the database; cheap to clone
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (creating if needed) the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        info!("📦 Opened database at {}", path.display());
        Self::from_connection(conn)
    }

    /// Private in-memory database, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        configure(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| anyhow!("database connection lock poisoned"))?;
            f(&mut guard)
        })
        .await
        .context("Database task panicked")?
    }
}

fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)
        .context("Failed to enable foreign keys")?;
    register_functions(conn)?;
    conn.execute_batch(schema::SCHEMA)
        .context("Failed to create schema")?;
    debug!("Schema ready");
    Ok(())
}

fn register_functions(conn: &Connection) -> Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("norm", 1, flags, |ctx| {
        let text: Option<String> = ctx.get(0)?;
        Ok(normalize(text.as_deref().unwrap_or("")))
    })
    .context("Failed to register norm()")?;

    conn.create_scalar_function("similarity", 2, flags, |ctx| {
        let a: Option<String> = ctx.get(0)?;
        let b: Option<String> = ctx.get(1)?;
        Ok(fuzzy::similarity(
            a.as_deref().unwrap_or(""),
            b.as_deref().unwrap_or(""),
        ))
    })
    .context("Failed to register similarity()")?;

    Ok(())
}
