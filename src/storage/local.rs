//! Local filesystem seen-set store.
//!
//! The set is kept as a flat UTF-8 JSON array of combination identifiers.
//! Entries are written sorted so the file diffs cleanly between runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::SeenSet;
use crate::storage::SeenStore;

/// Seen-set stored in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonSeenStore {
    path: PathBuf,
}

impl JsonSeenStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SeenStore for JsonSeenStore {
    async fn load(&self) -> Result<SeenSet> {
        let Some(bytes) = self.read_bytes().await? else {
            log::info!("No seen-set at {}, starting empty", self.path.display());
            return Ok(SeenSet::new());
        };

        let ids: Vec<String> = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::corruption(self.path.display().to_string(), e))?;
        let seen: SeenSet = ids.into_iter().collect();

        log::debug!(
            "Loaded {} seen combinations from {}",
            seen.len(),
            self.path.display()
        );
        Ok(seen)
    }

    async fn save(&self, seen: &SeenSet) -> Result<()> {
        let mut ids: Vec<&str> = seen.iter().map(String::as_str).collect();
        ids.sort_unstable();

        let bytes = serde_json::to_vec(&ids)?;
        self.write_bytes(&bytes).await?;

        log::debug!(
            "Saved {} seen combinations to {}",
            ids.len(),
            self.path.display()
        );
        Ok(())
    }
}
