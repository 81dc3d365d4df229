//! OS file-event observation for the add-on list.
//!
//! The parent directory is watched rather than the file itself: editors and external
//! tools commonly replace the file by rename, which would detach a watch on the file.
//! Events are filtered down to the configuration file and its `.disabled` sibling and
//! posted into the coordinator's queue. Debouncing is the coordinator's job.

use crate::core::coordinator::Trigger;
use crate::core::error::{AddonSyncError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub struct ChangeWatcher {
    // Dropping the watcher stops event delivery
    _watcher: RecommendedWatcher,
    directory: PathBuf,
}

impl ChangeWatcher {
    pub fn start(config_path: &Path, trigger: Trigger) -> Result<Self> {
        let directory = match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !directory.is_dir() {
            return Err(AddonSyncError::base_directory_not_found(&directory));
        }

        let names = watched_names(config_path);
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) if is_relevant(&event, &names) => {
                    log::debug!("Change detected: {:?} {:?}", event.kind, event.paths);
                    if trigger.file_changed().is_err() {
                        log::debug!("Coordinator stopped, dropping change event");
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("File watcher error: {e}"),
            }
        })?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        log::info!("Watching {} for changes", directory.display());
        Ok(Self {
            _watcher: watcher,
            directory,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// File names whose events matter: the list and its suspended variant
pub fn watched_names(config_path: &Path) -> Vec<OsString> {
    let Some(name) = config_path.file_name() else {
        return Vec::new();
    };
    let mut disabled = name.to_os_string();
    disabled.push(".disabled");
    vec![name.to_os_string(), disabled]
}

pub fn is_relevant(event: &Event, names: &[OsString]) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event.paths.iter().any(|path| {
        path.file_name()
            .is_some_and(|name| names.iter().any(|watched| watched == name))
    })
}
