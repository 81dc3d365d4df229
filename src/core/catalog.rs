//! Client for the external catalog service.
//!
//! The catalog answers one lookup per identifier. A record says whether the identifier
//! is an add-on (`fullgame.appid` names its parent), lists the add-ons of a parent
//! (`dlc`), and carries display metadata. Responses are validated into
//! [`CatalogEntryData`] at the boundary; nothing downstream touches raw JSON.
//!
//! # Public API
//! - [`Catalog`]: The three lookups the reconciliation engine depends on
//! - [`CatalogClient`]: Paced, retrying, TTL-caching implementation over a [`Transport`]
//! - [`HttpTransport`]: Blocking `reqwest` transport with a per-request timeout
//!
//! # Caching
//! - **Group cache**: parent member lists are kept for `group_ttl` (one hour by default)
//! - **Record memo**: raw records are kept for a minute so that resolving a root entry
//!   and then fetching its details costs a single request
//!
//! # Pacing
//! Every request waits until at least `pacing` has passed since the previous request
//! started. The pacer lock is held while waiting, so at most one request is in flight.

use crate::core::config::Settings;
use crate::core::error::{AddonSyncError, CatalogError};
use crate::core::state::{
    placeholder_name, AddonId, EntryDetails, ParentGroupInfo, ReleaseInfo, UNKNOWN_PARENT,
};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

const RECORD_TTL: Duration = Duration::from_secs(60);

/// Lookups the reconciliation engine needs from the catalog
pub trait Catalog {
    /// Parent of `id`, or `None` when `id` is a root entry
    fn resolve_parent(&self, id: AddonId) -> Result<Option<AddonId>, CatalogError>;

    fn fetch_group_members(&self, parent_id: AddonId) -> Result<ParentGroupInfo, CatalogError>;

    fn fetch_entry_details(&self, id: AddonId) -> Result<EntryDetails, CatalogError>;
}

impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    fn resolve_parent(&self, id: AddonId) -> Result<Option<AddonId>, CatalogError> {
        (**self).resolve_parent(id)
    }

    fn fetch_group_members(&self, parent_id: AddonId) -> Result<ParentGroupInfo, CatalogError> {
        (**self).fetch_group_members(parent_id)
    }

    fn fetch_entry_details(&self, id: AddonId) -> Result<EntryDetails, CatalogError> {
        (**self).fetch_entry_details(id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntryResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<CatalogEntryData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntryData {
    pub name: String,
    #[serde(default)]
    pub header_image: Option<String>,
    #[serde(default)]
    pub fullgame: Option<FullGame>,
    #[serde(default)]
    pub dlc: Option<Vec<AddonId>>,
    #[serde(default)]
    pub release_date: Option<ReleaseDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FullGame {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub appid: AddonId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseDate {
    #[serde(default)]
    pub coming_soon: bool,
    #[serde(default)]
    pub date: Option<String>,
}

// The catalog sends parent ids as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleId {
    Number(AddonId),
    Text(String),
}

fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<AddonId, D::Error>
where
    D: Deserializer<'de>,
{
    match FlexibleId::deserialize(deserializer)? {
        FlexibleId::Number(id) => Ok(id),
        FlexibleId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Validate a raw response body for `id`
pub fn parse_response(id: AddonId, body: &str) -> Result<CatalogEntryData, CatalogError> {
    let mut records: HashMap<String, CatalogEntryResponse> =
        serde_json::from_str(body).map_err(|source| CatalogError::Malformed { id, source })?;

    let record = records
        .remove(&id.to_string())
        .ok_or(CatalogError::MissingRecord { id })?;

    if !record.success {
        return Err(CatalogError::Unsuccessful { id });
    }
    record.data.ok_or(CatalogError::Unsuccessful { id })
}

impl CatalogEntryData {
    pub fn parent_id(&self, id: AddonId) -> Option<AddonId> {
        self.fullgame
            .as_ref()
            .map(|fullgame| fullgame.appid)
            .filter(|parent| *parent != id && *parent != UNKNOWN_PARENT)
    }

    pub fn member_ids(&self) -> BTreeSet<AddonId> {
        self.dlc.iter().flatten().copied().collect()
    }

    pub fn details(&self, id: AddonId) -> EntryDetails {
        let release = self.release_date.clone().unwrap_or_default();
        let display_name = if self.name.trim().is_empty() {
            placeholder_name(id)
        } else {
            self.name.clone()
        };

        EntryDetails {
            display_name,
            artwork_ref: self.header_image.clone().filter(|url| !url.is_empty()),
            release_info: ReleaseInfo {
                coming_soon: release.coming_soon,
                date: release.date.filter(|date| !date.is_empty()),
            },
        }
    }
}

/// Fetches the raw response body for one identifier
pub trait Transport {
    fn get(&self, id: AddonId) -> Result<String, CatalogError>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AddonSyncError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("addon-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, id: AddonId) -> Result<String, CatalogError> {
        log::debug!("GET {}?appids={}", self.base_url, id);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("appids", id.to_string())])
            .send()
            .map_err(|e| CatalogError::from_transport(id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                id,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .map_err(|e| CatalogError::from_transport(id, e))
    }
}

/// Enforces a minimum delay between request starts
pub struct Pacer {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub fn wait(&self) {
        let mut last = self.last.lock();
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

pub struct CatalogClient<T = HttpTransport> {
    transport: T,
    pacer: Pacer,
    max_retries: u32,
    group_ttl: Duration,
    groups: Mutex<HashMap<AddonId, ParentGroupInfo>>,
    records: Mutex<HashMap<AddonId, (Instant, Arc<CatalogEntryData>)>>,
}

impl CatalogClient<HttpTransport> {
    pub fn from_settings(settings: &Settings) -> Result<Self, AddonSyncError> {
        let transport = HttpTransport::new(&settings.catalog_url, settings.request_timeout())?;
        Ok(Self::new(
            transport,
            settings.request_pacing(),
            settings.max_retries,
            settings.group_ttl(),
        ))
    }
}

impl<T: Transport> CatalogClient<T> {
    pub fn new(transport: T, pacing: Duration, max_retries: u32, group_ttl: Duration) -> Self {
        Self {
            transport,
            pacer: Pacer::new(pacing),
            max_retries,
            group_ttl,
            groups: Mutex::new(HashMap::new()),
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every cached group and record, forcing fresh lookups
    pub fn clear_cache(&self) {
        self.groups.lock().clear();
        self.records.lock().clear();
    }

    pub fn cached_group_count(&self) -> usize {
        let ttl = self.group_ttl;
        self.groups
            .lock()
            .values()
            .filter(|group| group.resolved_at.elapsed() < ttl)
            .count()
    }

    fn fetch_record(&self, id: AddonId) -> Result<Arc<CatalogEntryData>, CatalogError> {
        if let Some((fetched_at, record)) = self.records.lock().get(&id) {
            if fetched_at.elapsed() < RECORD_TTL {
                return Ok(Arc::clone(record));
            }
        }

        let record = Arc::new(self.request(id)?);

        let mut records = self.records.lock();
        records.retain(|_, (fetched_at, _)| fetched_at.elapsed() < RECORD_TTL);
        records.insert(id, (Instant::now(), Arc::clone(&record)));
        Ok(record)
    }

    fn request(&self, id: AddonId) -> Result<CatalogEntryData, CatalogError> {
        let mut attempt = 0;
        loop {
            self.pacer.wait();
            let result = self
                .transport
                .get(id)
                .and_then(|body| parse_response(id, &body));

            match result {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!("{e}, retrying ({attempt}/{})", self.max_retries);
                }
                other => return other,
            }
        }
    }
}

impl<T: Transport> Catalog for CatalogClient<T> {
    fn resolve_parent(&self, id: AddonId) -> Result<Option<AddonId>, CatalogError> {
        Ok(self.fetch_record(id)?.parent_id(id))
    }

    fn fetch_group_members(&self, parent_id: AddonId) -> Result<ParentGroupInfo, CatalogError> {
        if let Some(group) = self.groups.lock().get(&parent_id) {
            if group.resolved_at.elapsed() < self.group_ttl {
                log::debug!("Group cache hit for parent {parent_id}");
                return Ok(group.clone());
            }
        }

        let record = self.fetch_record(parent_id)?;
        let group = ParentGroupInfo {
            parent_id,
            parent_name: record.name.clone(),
            member_ids: record.member_ids(),
            resolved_at: Instant::now(),
        };
        log::debug!(
            "Resolved parent {} '{}' with {} members",
            parent_id,
            group.parent_name,
            group.member_ids.len()
        );

        let ttl = self.group_ttl;
        let mut groups = self.groups.lock();
        groups.retain(|_, cached| cached.resolved_at.elapsed() < ttl);
        groups.insert(parent_id, group.clone());
        Ok(group)
    }

    fn fetch_entry_details(&self, id: AddonId) -> Result<EntryDetails, CatalogError> {
        Ok(self.fetch_record(id)?.details(id))
    }
}
