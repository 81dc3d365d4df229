//! Core functionality for the addon-sync tool.
//!
//! This module provides the reconciliation engine and its collaborators: parsing the
//! add-on list, persisting the metadata cache, querying the catalog, and scheduling
//! passes in response to file changes.

pub mod active_set;
pub mod cache_store;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod dirs;
pub mod error;
pub mod output;
pub mod reconcile;
pub mod state;
pub mod watcher;

// === Error handling ===
// Pass-level errors, per-lookup catalog errors and the crate result type
pub use error::{AddonSyncError, CatalogError, Result};

// === Data model ===
// Cache records, the persisted document and ephemeral group info
pub use state::{
    AddonId, CacheDocument, CachedEntry, EntryDetails, ParentGroupInfo, ReleaseInfo,
    UNKNOWN_PARENT,
};

// === Leaves ===
// Add-on list parsing, cache persistence and catalog access
pub use active_set::{ActiveEntry, ActiveSetReader};
pub use cache_store::CacheStore;
pub use catalog::{Catalog, CatalogClient, HttpTransport, Transport};

// === Settings ===
pub use config::Settings;

// === Reconciliation ===
// One pass: diff, evict, resolve with group coalescing, save
pub use reconcile::{ActiveSetDiff, Reconcile, ReconciliationEngine, ReconciliationReport};

// === Scheduling ===
// Debounced single-worker coordinator and the OS file watcher feeding it
pub use coordinator::{CacheEvent, Coordinator, CoordinatorHandle, CoordinatorState, Trigger};
pub use watcher::ChangeWatcher;

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{print_error, print_info, print_section_header, print_success, print_warning};
