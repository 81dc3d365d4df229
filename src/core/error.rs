//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`AddonSyncError`], the error type for everything that can end a
//! reconciliation pass or a CLI command, and [`CatalogError`], the error type for a single
//! catalog lookup. Catalog errors are always contained inside a pass: the engine turns them
//! into placeholder entries instead of propagating them.
//!
//! # Public API
//! - [`AddonSyncError`]: Main error enum covering pass-level and command-level failures
//! - [`CatalogError`]: Per-lookup failures from the external catalog
//! - [`Result<T>`]: Type alias for `std::result::Result<T, AddonSyncError>`
//!
//! # Error Categories
//! - **Read errors**: Configuration file exists but cannot be read
//! - **Write errors**: Cache directory or file cannot be written
//! - **Settings errors**: Settings file unreadable or invalid
//! - **Watch errors**: OS file-event primitive failures, coordinator shutdown

use crate::core::state::AddonId;
use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for addon-sync
#[derive(Error, Debug)]
pub enum AddonSyncError {
    // Read errors
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // Write errors
    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cache data: {source}")]
    CacheSerializationFailed { source: serde_json::Error },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove cache file '{path}': {source}")]
    CacheRemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // Settings errors
    #[error("Could not find configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to parse settings file '{path}': {source}")]
    SettingsParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Base directory does not exist: {path}")]
    BaseDirectoryNotFound { path: PathBuf },

    #[error("Failed to build catalog client: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Watch errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Coordinator is no longer running")]
    CoordinatorStopped,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using AddonSyncError
pub type Result<T> = std::result::Result<T, AddonSyncError>;

impl AddonSyncError {
    /// Create a configuration read failed error
    pub fn config_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache serialization failed error
    pub fn cache_serialization_failed(source: serde_json::Error) -> Self {
        Self::CacheSerializationFailed { source }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache remove failed error
    pub fn cache_remove_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheRemoveFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a settings parse failed error
    pub fn settings_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::SettingsParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a base directory not found error
    pub fn base_directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BaseDirectoryNotFound { path: path.into() }
    }

    /// True when the configuration file could not be read
    pub fn is_read_error(&self) -> bool {
        matches!(self, Self::ConfigReadFailed { .. })
    }

    /// True when the cache document could not be persisted
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            Self::CacheDirectoryCreationFailed { .. }
                | Self::CacheSerializationFailed { .. }
                | Self::CacheWriteFailed { .. }
        )
    }
}

/// Failure of one catalog lookup
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request for {id} timed out")]
    Timeout { id: AddonId },

    #[error("Catalog request for {id} failed: {source}")]
    Network { id: AddonId, source: reqwest::Error },

    #[error("Catalog returned HTTP {status} for {id}")]
    HttpStatus { id: AddonId, status: u16 },

    #[error("Malformed catalog response for {id}: {source}")]
    Malformed {
        id: AddonId,
        source: serde_json::Error,
    },

    #[error("Catalog reported no data for {id}")]
    Unsuccessful { id: AddonId },

    #[error("Catalog response did not contain a record for {id}")]
    MissingRecord { id: AddonId },
}

impl CatalogError {
    /// Wrap a transport error, separating timeouts from other failures
    pub fn from_transport(id: AddonId, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { id }
        } else {
            Self::Network { id, source }
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed { .. } | Self::Unsuccessful { .. } | Self::MissingRecord { .. } => {
                false
            }
        }
    }

    pub fn id(&self) -> AddonId {
        match self {
            Self::Timeout { id }
            | Self::Network { id, .. }
            | Self::HttpStatus { id, .. }
            | Self::Malformed { id, .. }
            | Self::Unsuccessful { id }
            | Self::MissingRecord { id } => *id,
        }
    }
}
