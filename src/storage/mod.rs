pub mod local;

use anyhow::Result;
use async_trait::async_trait;

pub use local::LocalStorage;

/// Common trait for media backends holding listing images.
/// Names are relative, `/`-separated paths such as `propiedades/galeria/7_1.webp`.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `bytes` under `name`; returns the name actually used, which gets
    /// a numeric suffix when `name` is taken
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// File contents, or `None` when nothing is stored under `name`
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    async fn exists(&self, name: &str) -> Result<bool>;

    async fn delete(&self, name: &str) -> Result<()>;

    /// Every stored name below `prefix`, recursively, sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Public URL for `name`
    fn url(&self, name: &str) -> String;

    /// Get the name of the storage backend
    fn backend_name(&self) -> &'static str;
}

/// Content type served for a stored file, by extension
pub fn content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "webp" => "image/webp",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
