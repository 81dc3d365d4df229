use crate::core::cache_store::write_atomic;
use crate::core::dirs::{get_config_directory, get_data_directory};
use crate::core::error::{AddonSyncError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "addons.lua";
pub const DEFAULT_CACHE_FILE: &str = "addon_cache.json";
pub const DEFAULT_CATALOG_URL: &str = "https://store.steampowered.com/api/appdetails";

const SETTINGS_FILE: &str = "settings.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the add-on list; the cache file is written beside it
    pub base_dir: Option<PathBuf>,
    pub config_file_name: String,
    pub cache_file_name: String,
    pub catalog_url: String,
    pub request_timeout_secs: u64,
    pub request_pacing_ms: u64,
    pub max_retries: u32,
    pub group_ttl_secs: u64,
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: None,
            config_file_name: DEFAULT_CONFIG_FILE.to_string(),
            cache_file_name: DEFAULT_CACHE_FILE.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            request_timeout_secs: 10,
            request_pacing_ms: 1500,
            max_retries: 1,
            group_ttl_secs: 60 * 60,
            debounce_ms: 500,
        }
    }
}

impl Settings {
    pub fn settings_path() -> Result<PathBuf> {
        Ok(get_config_directory()?.join(SETTINGS_FILE))
    }

    /// Load the settings file, falling back to defaults when it does not exist.
    /// Never writes.
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| AddonSyncError::settings_parse_failed(path, e))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path, content.as_bytes())?;
        Ok(())
    }

    /// Apply a command-line base directory on top of the stored one
    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        if base_dir.is_some() {
            self.base_dir = base_dir;
        }
        self
    }

    pub fn base_dir(&self) -> PathBuf {
        self.base_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir().join(&self.config_file_name)
    }

    /// Beside the configuration file, or in the application-data directory
    /// when the base directory is unavailable
    pub fn cache_file_path(&self) -> PathBuf {
        let base = self.base_dir();
        if base.is_dir() {
            base.join(&self.cache_file_name)
        } else {
            log::warn!(
                "Base directory {} is unavailable, caching in the data directory",
                base.display()
            );
            get_data_directory().join(&self.cache_file_name)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_pacing(&self) -> Duration {
        Duration::from_millis(self.request_pacing_ms)
    }

    pub fn group_ttl(&self) -> Duration {
        Duration::from_secs(self.group_ttl_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
