//! In-memory catalog that records every lookup
//!
//! Lets tests assert exactly which catalog calls a reconciliation pass made,
//! and inject failures for specific identifiers or parents.

#![allow(dead_code)]

use addon_sync::core::catalog::Catalog;
use addon_sync::core::error::CatalogError;
use addon_sync::core::state::{AddonId, EntryDetails, ParentGroupInfo, ReleaseInfo};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogCall {
    ResolveParent(AddonId),
    FetchGroupMembers(AddonId),
    FetchEntryDetails(AddonId),
}

impl CatalogCall {
    pub fn id(&self) -> AddonId {
        match self {
            Self::ResolveParent(id) | Self::FetchGroupMembers(id) | Self::FetchEntryDetails(id) => {
                *id
            }
        }
    }
}

#[derive(Debug, Clone)]
struct FakeRecord {
    name: String,
    parent: Option<AddonId>,
    members: BTreeSet<AddonId>,
    coming_soon: bool,
}

#[derive(Default)]
pub struct FakeCatalog {
    records: HashMap<AddonId, FakeRecord>,
    timeouts: HashSet<AddonId>,
    detail_failures: HashSet<AddonId>,
    calls: Mutex<Vec<CatalogCall>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A standalone entry with no parent
    pub fn root(mut self, id: AddonId, name: &str) -> Self {
        self.records.insert(
            id,
            FakeRecord {
                name: name.to_string(),
                parent: None,
                members: BTreeSet::new(),
                coming_soon: false,
            },
        );
        self
    }

    /// A parent and its members; members are named "Addon <id>"
    pub fn group(mut self, parent: AddonId, name: &str, members: &[AddonId]) -> Self {
        self.records.insert(
            parent,
            FakeRecord {
                name: name.to_string(),
                parent: None,
                members: members.iter().copied().collect(),
                coming_soon: false,
            },
        );
        for member in members {
            self.records.insert(
                *member,
                FakeRecord {
                    name: format!("Addon {member}"),
                    parent: Some(parent),
                    members: BTreeSet::new(),
                    coming_soon: false,
                },
            );
        }
        self
    }

    /// A member that names `parent` but is missing from the parent's member list
    pub fn unlisted_member(mut self, parent: AddonId, id: AddonId) -> Self {
        self.records.insert(
            id,
            FakeRecord {
                name: format!("Addon {id}"),
                parent: Some(parent),
                members: BTreeSet::new(),
                coming_soon: false,
            },
        );
        self
    }

    /// A member whose parent lists it, but which is not released yet
    pub fn unreleased(mut self, id: AddonId) -> Self {
        if let Some(record) = self.records.get_mut(&id) {
            record.coming_soon = true;
        }
        self
    }

    /// Every lookup involving `id` times out
    pub fn timing_out(mut self, id: AddonId) -> Self {
        self.timeouts.insert(id);
        self
    }

    /// Parent lookups for `id` succeed, detail lookups time out
    pub fn details_timing_out(mut self, id: AddonId) -> Self {
        self.detail_failures.insert(id);
        self
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: CatalogCall) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    pub fn calls_involving(&self, id: AddonId) -> usize {
        self.calls.lock().iter().filter(|c| c.id() == id).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    fn lookup(&self, call: CatalogCall) -> Result<&FakeRecord, CatalogError> {
        self.calls.lock().push(call);
        let id = call.id();
        if self.timeouts.contains(&id) {
            return Err(CatalogError::Timeout { id });
        }
        self.records
            .get(&id)
            .ok_or(CatalogError::Unsuccessful { id })
    }
}

impl Catalog for FakeCatalog {
    fn resolve_parent(&self, id: AddonId) -> Result<Option<AddonId>, CatalogError> {
        Ok(self.lookup(CatalogCall::ResolveParent(id))?.parent)
    }

    fn fetch_group_members(&self, parent_id: AddonId) -> Result<ParentGroupInfo, CatalogError> {
        let record = self.lookup(CatalogCall::FetchGroupMembers(parent_id))?;
        Ok(ParentGroupInfo {
            parent_id,
            parent_name: record.name.clone(),
            member_ids: record.members.clone(),
            resolved_at: Instant::now(),
        })
    }

    fn fetch_entry_details(&self, id: AddonId) -> Result<EntryDetails, CatalogError> {
        let record = self.lookup(CatalogCall::FetchEntryDetails(id))?;
        if self.detail_failures.contains(&id) {
            return Err(CatalogError::Timeout { id });
        }
        Ok(EntryDetails {
            display_name: record.name.clone(),
            artwork_ref: Some(format!("https://cdn.example/{id}/header.jpg")),
            release_info: ReleaseInfo {
                coming_soon: record.coming_soon,
                date: None,
            },
        })
    }
}
