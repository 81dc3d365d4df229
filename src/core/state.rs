//! Cache data structures shared by the reconciliation engine and its collaborators.
//!
//! # Public API
//! - [`CachedEntry`]: Catalog metadata for one active identifier
//! - [`CacheDocument`]: The persisted unit, entries plus the active-set snapshot
//! - [`ParentGroupInfo`]: Ephemeral, TTL-cached member list of a parent
//! - [`EntryDetails`]: Display metadata returned by the catalog for one identifier
//!
//! # Cache Strategy
//! - **Canonical JSON**: `BTreeMap`/`BTreeSet` keep serialization byte-stable
//! - **Snapshot diffing**: `last_known_active_ids` is what the next pass diffs against
//! - **Subset invariant**: every entry key is also in `last_known_active_ids`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Identifier of an add-on or root entry, as used by the configuration file and the catalog
pub type AddonId = u32;

/// Parent id used when the catalog cannot tell us which group an entry belongs to
pub const UNKNOWN_PARENT: AddonId = 0;

pub const UNKNOWN_PARENT_NAME: &str = "Unknown group";

/// Display name given to an entry whose catalog lookup failed
pub fn placeholder_name(id: AddonId) -> String {
    format!("Unknown {id}")
}

/// Parent name used when a parent id is known but its record could not be loaded
pub fn placeholder_parent_name(parent_id: AddonId) -> String {
    if parent_id == UNKNOWN_PARENT {
        UNKNOWN_PARENT_NAME.to_string()
    } else {
        format!("{UNKNOWN_PARENT_NAME} {parent_id}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub coming_soon: bool,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub id: AddonId,
    pub parent_id: AddonId,
    pub parent_name: String,
    pub display_name: String,
    #[serde(default)]
    pub artwork_ref: Option<String>,
    #[serde(default)]
    pub release_info: ReleaseInfo,
    pub cached_at: DateTime<Utc>,
}

impl CachedEntry {
    pub fn resolved(
        id: AddonId,
        parent_id: AddonId,
        parent_name: impl Into<String>,
        details: EntryDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            parent_id,
            parent_name: parent_name.into(),
            display_name: details.display_name,
            artwork_ref: details.artwork_ref,
            release_info: details.release_info,
            cached_at: now,
        }
    }

    /// Minimal record for an identifier whose details could not be fetched
    pub fn placeholder(
        id: AddonId,
        parent_id: AddonId,
        parent_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            parent_id,
            parent_name: parent_name.into(),
            display_name: placeholder_name(id),
            artwork_ref: None,
            release_info: ReleaseInfo::default(),
            cached_at: now,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.display_name == placeholder_name(self.id)
    }

    /// Root entries are their own parent
    pub fn is_root(&self) -> bool {
        self.parent_id == self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(default)]
    pub entries: BTreeMap<AddonId, CachedEntry>,
    #[serde(default)]
    pub last_known_active_ids: BTreeSet<AddonId>,
    pub updated_at: DateTime<Utc>,
}

impl CacheDocument {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            last_known_active_ids: BTreeSet::new(),
            updated_at: Utc::now(),
        }
    }

    /// `entries.keys() ⊆ last_known_active_ids`
    pub fn is_consistent(&self) -> bool {
        self.entries
            .keys()
            .all(|id| self.last_known_active_ids.contains(id))
    }

    pub fn placeholder_ids(&self) -> BTreeSet<AddonId> {
        self.entries
            .values()
            .filter(|entry| entry.is_placeholder())
            .map(|entry| entry.id)
            .collect()
    }
}

impl Default for CacheDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Member list of a parent, as last seen in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentGroupInfo {
    pub parent_id: AddonId,
    pub parent_name: String,
    pub member_ids: BTreeSet<AddonId>,
    pub resolved_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDetails {
    pub display_name: String,
    pub artwork_ref: Option<String>,
    pub release_info: ReleaseInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str) -> EntryDetails {
        EntryDetails {
            display_name: name.to_string(),
            artwork_ref: Some("https://cdn.example/header.jpg".to_string()),
            release_info: ReleaseInfo {
                coming_soon: true,
                date: Some("Coming soon".to_string()),
            },
        }
    }

    #[test]
    fn test_placeholder_entry() {
        let entry = CachedEntry::placeholder(400, UNKNOWN_PARENT, UNKNOWN_PARENT_NAME, Utc::now());
        assert_eq!(entry.display_name, "Unknown 400");
        assert!(entry.is_placeholder());
        assert!(entry.artwork_ref.is_none());
        assert!(!entry.release_info.coming_soon);
    }

    #[test]
    fn test_resolved_entry_is_not_placeholder() {
        let entry = CachedEntry::resolved(300, 999, "Base Game", details("Soundtrack"), Utc::now());
        assert!(!entry.is_placeholder());
        assert!(!entry.is_root());
        assert!(entry.release_info.coming_soon);
    }

    #[test]
    fn test_placeholder_parent_name() {
        assert_eq!(placeholder_parent_name(UNKNOWN_PARENT), "Unknown group");
        assert_eq!(placeholder_parent_name(999), "Unknown group 999");
    }

    #[test]
    fn test_document_consistency() {
        let now = Utc::now();
        let mut doc = CacheDocument::new();
        doc.entries
            .insert(100, CachedEntry::resolved(100, 100, "Game", details("Game"), now));
        assert!(!doc.is_consistent());

        doc.last_known_active_ids.insert(100);
        doc.last_known_active_ids.insert(200);
        assert!(doc.is_consistent());
    }

    #[test]
    fn test_document_json_roundtrip_is_stable() -> std::result::Result<(), serde_json::Error> {
        let now = Utc::now();
        let mut doc = CacheDocument::new();
        for id in [300, 100, 200] {
            doc.entries
                .insert(id, CachedEntry::placeholder(id, UNKNOWN_PARENT, "Unknown group", now));
            doc.last_known_active_ids.insert(id);
        }

        let first = serde_json::to_string_pretty(&doc)?;
        let reparsed: CacheDocument = serde_json::from_str(&first)?;
        let second = serde_json::to_string_pretty(&reparsed)?;

        assert_eq!(reparsed, doc);
        assert_eq!(first, second);
        assert_eq!(doc.placeholder_ids().len(), 3);
        Ok(())
    }
}
