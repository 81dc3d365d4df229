//! One reconciliation pass between the add-on list and the metadata cache.
//!
//! # Algorithm
//! 1. Read the active set and load the cache document
//! 2. Diff the active set against `last_known_active_ids`
//! 3. Evict entries that are no longer active (no catalog calls)
//! 4. Resolve new identifiers, coalesced by parent: one parent lookup resolves every
//!    pending member of that parent
//! 5. Record the new snapshot and save atomically
//!
//! Catalog failures never abort a pass; they become placeholder entries. Only a read
//! failure on the configuration file or a write failure on the cache file propagates.

use crate::core::active_set::ActiveSetReader;
use crate::core::cache_store::CacheStore;
use crate::core::catalog::Catalog;
use crate::core::config::Settings;
use crate::core::error::Result;
use crate::core::state::{
    placeholder_parent_name, AddonId, CachedEntry, ParentGroupInfo, UNKNOWN_PARENT,
    UNKNOWN_PARENT_NAME,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Something that can run a reconciliation pass
pub trait Reconcile {
    fn run(&self) -> Result<ReconciliationReport>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSetDiff {
    pub added: BTreeSet<AddonId>,
    pub removed: BTreeSet<AddonId>,
    pub unchanged: BTreeSet<AddonId>,
}

impl ActiveSetDiff {
    pub fn compute(previous: &BTreeSet<AddonId>, current: &BTreeSet<AddonId>) -> Self {
        Self {
            added: current.difference(previous).copied().collect(),
            removed: previous.difference(current).copied().collect(),
            unchanged: current.intersection(previous).copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// Entries deleted from the cache, including strays never in the snapshot
    pub evicted: usize,
    /// Entries written this pass, placeholders included
    pub resolved: usize,
    pub placeholders: BTreeSet<AddonId>,
    pub changed: bool,
}

impl ReconciliationReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} added, {} removed, {} unchanged",
            self.added, self.removed, self.unchanged
        );
        if !self.placeholders.is_empty() {
            let ids: Vec<String> = self.placeholders.iter().map(|id| id.to_string()).collect();
            summary.push_str(&format!(", unresolved: {}", ids.join(", ")));
        }
        summary
    }
}

pub struct ReconciliationEngine<C> {
    reader: ActiveSetReader,
    store: CacheStore,
    catalog: C,
}

impl<C: Catalog> ReconciliationEngine<C> {
    pub fn new(reader: ActiveSetReader, store: CacheStore, catalog: C) -> Self {
        Self {
            reader,
            store,
            catalog,
        }
    }

    pub fn from_settings(settings: &Settings, catalog: C) -> Self {
        Self::new(
            ActiveSetReader::new(settings.config_file_path()),
            CacheStore::new(settings.cache_file_path()),
            catalog,
        )
    }

    pub fn reader(&self) -> &ActiveSetReader {
        &self.reader
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn run(&self) -> Result<ReconciliationReport> {
        let current = self.reader.read().map_err(|e| {
            log::error!("Reconciliation aborted, cache left untouched: {e}");
            e
        })?;
        let mut doc = self.store.load();
        let now = Utc::now();

        let diff = ActiveSetDiff::compute(&doc.last_known_active_ids, &current);
        log::debug!(
            "Diff: {} added, {} removed, {} unchanged",
            diff.added.len(),
            diff.removed.len(),
            diff.unchanged.len()
        );

        let before = doc.entries.len();
        doc.entries.retain(|id, _| current.contains(id));
        let evicted = before - doc.entries.len();

        // Unchanged ids that lost their entry are healed alongside the new ones
        let mut pending = diff.added.clone();
        pending.extend(
            diff.unchanged
                .iter()
                .filter(|id| !doc.entries.contains_key(id))
                .copied(),
        );

        let resolved = pending.len();
        let placeholders = if pending.is_empty() {
            BTreeSet::new()
        } else {
            self.resolve_pending(pending, &mut doc.entries, now)
        };

        let changed = evicted > 0 || resolved > 0 || doc.last_known_active_ids != current;
        doc.last_known_active_ids = current;
        if changed {
            doc.updated_at = now;
        }

        self.store.save(&doc)?;

        let report = ReconciliationReport {
            added: diff.added.len(),
            removed: diff.removed.len(),
            unchanged: diff.unchanged.len(),
            evicted,
            resolved,
            placeholders,
            changed,
        };
        log::info!("Reconciliation complete: {}", report.summary());
        Ok(report)
    }

    /// Resolve `pending` into `entries`, returning the ids that fell back to placeholders
    fn resolve_pending(
        &self,
        mut remaining: BTreeSet<AddonId>,
        entries: &mut BTreeMap<AddonId, CachedEntry>,
        now: DateTime<Utc>,
    ) -> BTreeSet<AddonId> {
        let mut groups: HashMap<AddonId, Option<ParentGroupInfo>> = HashMap::new();
        let mut placeholders = BTreeSet::new();

        while let Some(id) = remaining.pop_first() {
            let parent_id = match self.catalog.resolve_parent(id) {
                Ok(parent_id) => parent_id,
                Err(e) => {
                    log::warn!("Could not resolve parent of {id}, using placeholder: {e}");
                    entries.insert(
                        id,
                        CachedEntry::placeholder(id, UNKNOWN_PARENT, UNKNOWN_PARENT_NAME, now),
                    );
                    placeholders.insert(id);
                    continue;
                }
            };

            let Some(parent_id) = parent_id else {
                let entry = match self.catalog.fetch_entry_details(id) {
                    Ok(details) => {
                        let name = details.display_name.clone();
                        CachedEntry::resolved(id, id, name, details, now)
                    }
                    Err(e) => {
                        log::warn!("Could not fetch details of {id}, using placeholder: {e}");
                        placeholders.insert(id);
                        CachedEntry::placeholder(id, id, placeholder_parent_name(id), now)
                    }
                };
                entries.insert(id, entry);
                continue;
            };

            let group = groups.entry(parent_id).or_insert_with(|| {
                self.catalog
                    .fetch_group_members(parent_id)
                    .map_err(|e| {
                        log::warn!("Could not load members of parent {parent_id}: {e}");
                    })
                    .ok()
            });

            let (parent_name, siblings): (String, Vec<AddonId>) = match group {
                Some(group) => (
                    group.parent_name.clone(),
                    group.member_ids.intersection(&remaining).copied().collect(),
                ),
                None => (placeholder_parent_name(parent_id), Vec::new()),
            };

            for sibling in &siblings {
                remaining.remove(sibling);
            }
            if !siblings.is_empty() {
                log::debug!(
                    "Coalesced {} pending members of parent {}",
                    siblings.len() + 1,
                    parent_id
                );
            }

            for member in std::iter::once(id).chain(siblings) {
                let entry = match self.catalog.fetch_entry_details(member) {
                    Ok(details) => {
                        CachedEntry::resolved(member, parent_id, parent_name.as_str(), details, now)
                    }
                    Err(e) => {
                        log::warn!("Could not fetch details of {member}, using placeholder: {e}");
                        placeholders.insert(member);
                        CachedEntry::placeholder(member, parent_id, parent_name.as_str(), now)
                    }
                };
                entries.insert(member, entry);
            }
        }

        placeholders
    }
}

impl<C: Catalog> Reconcile for ReconciliationEngine<C> {
    fn run(&self) -> Result<ReconciliationReport> {
        ReconciliationEngine::run(self)
    }
}
