//! Parsing of the locally edited add-on list.
//!
//! The configuration file is line oriented. An enabled entry is a statement of the form
//! `addappid(<id>[, ...])`; a suspended entry is the same statement behind a `--` comment
//! marker. The whole file can also be suspended by renaming it to `<name>.disabled`.
//!
//! # Public API
//! - [`ActiveSetReader`]: Reads the file into the set of active identifiers
//! - [`ActiveEntry`]: One parsed statement with its active flag
//!
//! # Tolerance
//! - **Missing file**: an empty set, not an error
//! - **Malformed lines**: skipped, including half-written lines from a concurrent writer
//! - **Invalid UTF-8**: decoded lossily so one bad byte does not hide the rest of the file

use crate::core::error::{AddonSyncError, Result};
use crate::core::state::{AddonId, UNKNOWN_PARENT};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

const STATEMENT: &str = "addappid";
const SUSPEND_MARKER: &str = "--";
const DISABLED_EXTENSION: &str = "disabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEntry {
    pub id: AddonId,
    pub active: bool,
}

impl ActiveEntry {
    /// Parse one line. Returns `None` for anything that is not a complete statement.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let (active, statement) = match trimmed.strip_prefix(SUSPEND_MARKER) {
            Some(rest) => (false, rest.trim_start()),
            None => (true, trimmed),
        };

        let args = statement
            .strip_prefix(STATEMENT)?
            .trim_start()
            .strip_prefix('(')?;
        // Without the closing paren the line may still be mid-write
        let close = args.find(')')?;
        let first = args[..close].split(',').next()?.trim();
        let id: AddonId = first.parse().ok()?;

        if id == UNKNOWN_PARENT {
            return None;
        }

        Some(Self { id, active })
    }
}

pub struct ActiveSetReader {
    path: PathBuf,
}

impl ActiveSetReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the file-level suspended variant, `<file>.disabled`
    pub fn disabled_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".");
        name.push(DISABLED_EXTENSION);
        PathBuf::from(name)
    }

    /// Identifiers currently enabled in the configuration file
    pub fn read(&self) -> Result<BTreeSet<AddonId>> {
        let active: BTreeSet<AddonId> = self
            .read_entries()?
            .into_iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.id)
            .collect();

        log::debug!(
            "Read {} active identifiers from {}",
            active.len(),
            self.path.display()
        );
        Ok(active)
    }

    /// Every statement in the file, enabled and suspended
    pub fn read_entries(&self) -> Result<Vec<ActiveEntry>> {
        if let Some(content) = read_shared(&self.path)? {
            return Ok(parse_entries(&content, true));
        }

        let disabled = self.disabled_path();
        if let Some(content) = read_shared(&disabled)? {
            log::debug!("Configuration is suspended: {}", disabled.display());
            return Ok(parse_entries(&content, false));
        }

        log::debug!(
            "Configuration file does not exist yet: {}",
            self.path.display()
        );
        Ok(Vec::new())
    }
}

/// Entries come back ordered by id, one per id
fn parse_entries(content: &str, file_enabled: bool) -> Vec<ActiveEntry> {
    let mut entries: BTreeMap<AddonId, bool> = BTreeMap::new();

    for entry in content.lines().filter_map(ActiveEntry::parse_line) {
        // An id listed both ways counts as active
        *entries.entry(entry.id).or_insert(false) |= entry.active && file_enabled;
    }

    entries
        .into_iter()
        .map(|(id, active)| ActiveEntry { id, active })
        .collect()
}

/// Read a file if it exists. Std opens files with read/write/delete sharing on Windows,
/// so a concurrent writer never blocks this read.
fn read_shared(path: &Path) -> Result<Option<String>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            log::error!("Failed to open configuration file '{}': {}", path.display(), e);
            return Err(AddonSyncError::config_read_failed(path, e));
        }
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| AddonSyncError::config_read_failed(path, e))?;

    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}
