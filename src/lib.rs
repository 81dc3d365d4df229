//! Addon Sync - keeps a catalog-enriched metadata cache in step with a locally edited add-on list.
//!
//! The add-on list is edited out of process, so the cache is reconciled against it on every
//! change: removed identifiers are evicted, new ones are resolved through a rate-limited
//! catalog with one lookup per parent group, and the result is saved atomically.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - Add-on list parsing and cache persistence
//! - The catalog client with TTL caching and request pacing
//! - The reconciliation engine and the debounced coordinator
//! - Error handling and result types

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    ActiveSetReader,
    AddonId,
    AddonSyncError,
    CacheDocument,
    CacheEvent,
    CacheStore,
    CachedEntry,
    Catalog,
    CatalogClient,
    CatalogError,
    ChangeWatcher,
    Coordinator,
    CoordinatorHandle,
    ReconciliationEngine,
    ReconciliationReport,
    Result,
    Settings,
};
