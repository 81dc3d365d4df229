use crate::core::{
    config::Settings,
    error::{AddonSyncError, Result},
    output::{print_section_header, print_success},
};
use colored::*;
use std::path::PathBuf;

pub fn execute_config(settings: &Settings, set_base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(base_dir) = set_base_dir {
        if !base_dir.is_dir() {
            return Err(AddonSyncError::base_directory_not_found(base_dir));
        }
        let base_dir = base_dir.canonicalize()?;

        let mut stored = Settings::load_or_default()?;
        stored.base_dir = Some(base_dir.clone());
        stored.save()?;

        print_success(&format!("Base directory set to {}\n", base_dir.display()));
        return Ok(());
    }

    print_section_header("Settings");
    let settings_path = Settings::settings_path()?;
    let rows = [
        ("Settings file", settings_path.display().to_string()),
        ("Add-on list", settings.config_file_path().display().to_string()),
        ("Cache file", settings.cache_file_path().display().to_string()),
        ("Catalog", settings.catalog_url.clone()),
        ("Timeout", format!("{}s", settings.request_timeout_secs)),
        ("Pacing", format!("{}ms", settings.request_pacing_ms)),
        ("Retries", settings.max_retries.to_string()),
        ("Group TTL", format!("{}s", settings.group_ttl_secs)),
        ("Debounce", format!("{}ms", settings.debounce_ms)),
    ];
    for (label, value) in rows {
        println!("   {:<14} {}", format!("{label}:").bright_black(), value);
    }
    println!();
    Ok(())
}
