//! Test workspace setup
//!
//! Provides an isolated directory holding an add-on list and its cache file,
//! plus helpers to edit the list and build engines over it.

#![allow(dead_code)]

use super::catalog::FakeCatalog;
use addon_sync::core::{
    active_set::ActiveSetReader,
    cache_store::CacheStore,
    config::Settings,
    error::Result,
    reconcile::ReconciliationEngine,
    state::{AddonId, CacheDocument},
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// The TempDir must be kept alive for the duration of the test
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
    pub cache_path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("addons.lua");
        let cache_path = temp_dir.path().join("addon_cache.json");
        Ok(Self {
            temp_dir,
            config_path,
            cache_path,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn settings(&self) -> Settings {
        Settings {
            debounce_ms: 50,
            request_pacing_ms: 0,
            ..Settings::default()
        }
        .with_base_dir(Some(self.path().to_path_buf()))
    }

    /// Replace the add-on list with these active ids
    pub fn write_active(&self, ids: &[AddonId]) -> Result<()> {
        let content: String = ids.iter().map(|id| format!("addappid({id})\n")).collect();
        self.write_config(&content)
    }

    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(&self.config_path, content)?;
        Ok(())
    }

    pub fn engine(&self, catalog: &Arc<FakeCatalog>) -> ReconciliationEngine<Arc<FakeCatalog>> {
        ReconciliationEngine::new(
            ActiveSetReader::new(&self.config_path),
            CacheStore::new(&self.cache_path),
            Arc::clone(catalog),
        )
    }

    pub fn load_cache(&self) -> CacheDocument {
        CacheStore::new(&self.cache_path).load()
    }

    pub fn cache_bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.cache_path)?)
    }
}

/// Catalog with two roots, one group of three add-ons and one unreachable id
pub fn standard_catalog() -> Arc<FakeCatalog> {
    Arc::new(
        FakeCatalog::new()
            .root(100, "Game A")
            .root(200, "Game B")
            .group(999, "Base Game", &[300, 301, 302])
            .unreleased(302)
            .timing_out(400),
    )
}
