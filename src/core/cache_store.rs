//! Persistence of the [`CacheDocument`].
//!
//! The cache file is also read directly by display collaborators, so it is only ever
//! replaced whole: the document is written to a uniquely named sibling temp file,
//! flushed, and renamed over the target. A reader sees either the previous document or the new one.
//!
//! Loading never fails. A missing or corrupt file yields an empty document and the next
//! reconciliation pass rebuilds it from the catalog.

use crate::core::error::{AddonSyncError, Result};
use crate::core::state::CacheDocument;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> CacheDocument {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No cache file at {}, starting empty", self.path.display());
                return CacheDocument::new();
            }
            Err(e) => {
                log::warn!(
                    "Failed to read cache file '{}', starting empty: {}",
                    self.path.display(),
                    e
                );
                return CacheDocument::new();
            }
        };

        match serde_json::from_str::<CacheDocument>(&content) {
            Ok(doc) => {
                log::debug!(
                    "Loaded {} cached entries from {}",
                    doc.entries.len(),
                    self.path.display()
                );
                doc
            }
            Err(e) => {
                log::warn!(
                    "Cache file '{}' is corrupt, starting empty: {}",
                    self.path.display(),
                    e
                );
                CacheDocument::new()
            }
        }
    }

    pub fn save(&self, doc: &CacheDocument) -> Result<()> {
        debug_assert!(doc.is_consistent());

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| {
                    log::error!("Failed to create cache directory '{}': {}", dir.display(), e);
                    AddonSyncError::cache_directory_creation_failed(dir, e)
                })?;
            }
        }

        let json = serde_json::to_string_pretty(doc).map_err(|e| {
            log::error!("Failed to serialize cache data: {e}");
            AddonSyncError::cache_serialization_failed(e)
        })?;

        write_atomic(&self.path, json.as_bytes()).map_err(|e| {
            log::error!(
                "Failed to write cache file '{}': {}",
                self.path.display(),
                e
            );
            AddonSyncError::cache_write_failed(&self.path, e)
        })?;

        log::debug!(
            "Saved {} cached entries to {}",
            doc.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Delete the cache file. Returns whether there was one.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AddonSyncError::cache_remove_failed(&self.path, e)),
        }
    }
}

/// Write `bytes` to a uniquely named sibling temp file and rename it over `path`.
/// Concurrent writers never share a temp file, so the last rename wins whole.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "addon-sync".to_string());

    // Dropped on error, which deletes the temp file
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
