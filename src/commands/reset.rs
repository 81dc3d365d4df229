use crate::core::{
    cache_store::CacheStore,
    config::Settings,
    error::Result,
    output::{print_info, print_success},
};

/// Delete the cache file so the next pass rebuilds it from the catalog.
/// The add-on list itself is never touched.
pub fn execute_reset(settings: &Settings) -> Result<()> {
    let store = CacheStore::new(settings.cache_file_path());

    if store.remove()? {
        log::info!("Removed cache file {}", store.path().display());
        print_success(&format!("Removed {}\n", store.path().display()));
    } else {
        print_info(&format!("No cache file at {}", store.path().display()));
    }
    Ok(())
}
