use crate::core::error::AddonSyncError;
use std::path::PathBuf;

const APP_DIR: &str = "addon-sync";

pub fn get_config_directory() -> Result<PathBuf, AddonSyncError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config"))),
        "macos" => dirs::home_dir().map(|home| home.join("Library/Application Support")),
        _ => dirs::config_dir(),
    };

    base.map(|base| base.join(APP_DIR))
        .ok_or(AddonSyncError::ConfigDirectoryNotFound)
}

/// Fixed application-data directory used when the configured base directory is unavailable
pub fn get_data_directory() -> PathBuf {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local/share"))),
        _ => dirs::data_dir(),
    };

    base.unwrap_or_else(std::env::temp_dir).join(APP_DIR)
}
