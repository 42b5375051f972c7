use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::MediaStorage;

/// Media kept in a directory on the local filesystem
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// `base_url` is the public prefix files are served under, e.g. `/media/`
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    /// Resolve a storage name below the root, refusing anything that could
    /// escape it
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name.trim_start_matches('/'));
        if name.trim().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("invalid media name {name:?}");
        }
        Ok(self.root.join(relative))
    }

    async fn is_taken(&self, name: &str) -> Result<bool> {
        let path = self.resolve(name)?;
        tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check {}", path.display()))
    }

    async fn available_name(&self, name: &str) -> Result<String> {
        if !self.is_taken(name).await? {
            return Ok(name.to_string());
        }
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => (stem, Some(ext)),
            _ => (name, None),
        };
        let mut n = 1u64;
        loop {
            let candidate = match ext {
                Some(ext) => format!("{stem}_{n}.{ext}"),
                None => format!("{stem}_{n}"),
            };
            if !self.is_taken(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

#[async_trait]
impl MediaStorage for LocalStorage {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let final_name = self.available_name(name).await?;
        let path = self.resolve(&final_name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Stored {} ({} bytes)", final_name, bytes.len());
        Ok(final_name)
    }

    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.resolve(name)?;
        Ok(tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let start = self.resolve(prefix)?;
        let mut found = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to list {}", dir.display()))
                }
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let name = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    found.push(name);
                }
            }
        }
        found.sort();
        Ok(found)
    }

    fn url(&self, name: &str) -> String {
        format!("{}{}", self.base_url, name.trim_start_matches('/'))
    }

    fn backend_name(&self) -> &'static str {
        "LocalStorage"
    }
}
