use crate::commands::sync::print_report;
use crate::core::{
    catalog::CatalogClient,
    config::Settings,
    coordinator::{CacheEvent, Coordinator},
    error::{AddonSyncError, Result},
    output::{print_info, print_warning},
    reconcile::ReconciliationEngine,
    watcher::ChangeWatcher,
};

pub fn execute_watch(settings: &Settings) -> Result<()> {
    let base_dir = settings.base_dir();
    if !base_dir.is_dir() {
        return Err(AddonSyncError::base_directory_not_found(base_dir));
    }

    let catalog = CatalogClient::from_settings(settings)?;
    let engine = ReconciliationEngine::from_settings(settings, catalog);
    let (events_tx, events_rx) = crossbeam_channel::unbounded();

    let handle = Coordinator::start(engine, settings.debounce(), Some(events_tx))?;
    let watcher = ChangeWatcher::start(&settings.config_file_path(), handle.trigger())?;

    print_info(&format!(
        "Watching {} (Ctrl+C to stop)",
        settings.config_file_path().display()
    ));
    log::debug!("Watcher attached to {}", watcher.directory().display());

    for event in events_rx.iter() {
        match event {
            CacheEvent::Changed(report) if report.changed => print_report(&report),
            CacheEvent::Changed(report) => log::debug!("No changes: {}", report.summary()),
            CacheEvent::Failed(message) => {
                print_warning(&format!("Sync failed, will retry on next change: {message}"))
            }
        }
    }

    drop(watcher);
    handle.shutdown()
}
