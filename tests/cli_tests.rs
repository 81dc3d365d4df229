use addon_sync::core::state::{CacheDocument, CachedEntry, EntryDetails, ReleaseInfo};
use assert_cmd::Command;
use predicates::prelude::*;

mod common;
use common::{assertions, fixtures::TestWorkspace};

/// Run the binary against an isolated settings directory and base directory
fn addon_sync(workspace: &TestWorkspace) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("addon-sync")?;
    cmd.env("XDG_CONFIG_HOME", workspace.path().join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--base-dir")
        .arg(workspace.path());
    Ok(cmd)
}

fn handcrafted_cache(workspace: &TestWorkspace) -> anyhow::Result<()> {
    let now = chrono::Utc::now();
    let details = |name: &str| EntryDetails {
        display_name: name.to_string(),
        artwork_ref: None,
        release_info: ReleaseInfo::default(),
    };

    let mut doc = CacheDocument::new();
    for entry in [
        CachedEntry::resolved(999, 999, "Base Game", details("Base Game"), now),
        CachedEntry::resolved(300, 999, "Base Game", details("Soundtrack"), now),
    ] {
        doc.last_known_active_ids.insert(entry.id);
        doc.entries.insert(entry.id, entry);
    }
    std::fs::write(&workspace.cache_path, serde_json::to_string_pretty(&doc)?)?;
    workspace.write_active(&[999, 300])?;
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_status_without_cache() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;

        addon_sync(&workspace)?
            .arg("status")
            .assert()
            .success()
            .stdout(assertions::no_cache_yet());
        Ok(())
    }

    #[test]
    fn test_sync_with_only_suspended_entries() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;
        workspace.write_config("-- addappid(100)\n-- addappid(200)\n")?;

        addon_sync(&workspace)?
            .arg("sync")
            .assert()
            .success()
            .stdout(assertions::up_to_date());

        assert!(workspace.cache_path.exists());
        assert!(workspace.load_cache().entries.is_empty());
        Ok(())
    }

    #[test]
    fn test_status_lists_cached_entries() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;
        handcrafted_cache(&workspace)?;

        addon_sync(&workspace)?
            .arg("status")
            .assert()
            .success()
            .stdout(assertions::has_entry(999, "Base Game"))
            .stdout(assertions::has_entry(300, "Soundtrack"))
            .stdout(predicate::str::contains("2 add-on(s) cached"))
            .stdout(predicate::str::contains("Cache is behind").not());
        Ok(())
    }

    #[test]
    fn test_status_notices_stale_cache() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;
        handcrafted_cache(&workspace)?;
        workspace.write_active(&[999])?;

        addon_sync(&workspace)?
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is behind"));
        Ok(())
    }

    #[test]
    fn test_reset_removes_cache() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;
        handcrafted_cache(&workspace)?;

        addon_sync(&workspace)?
            .arg("reset")
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed"));
        assert!(!workspace.cache_path.exists());

        addon_sync(&workspace)?
            .arg("reset")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache file"));
        Ok(())
    }

    #[test]
    fn test_sync_fails_when_list_is_unreadable() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;
        std::fs::create_dir(&workspace.config_path)?;

        addon_sync(&workspace)?
            .arg("sync")
            .assert()
            .failure()
            .stdout(assertions::read_failed());

        assert!(!workspace.cache_path.exists());
        Ok(())
    }

    #[test]
    fn test_config_shows_resolved_paths() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;

        addon_sync(&workspace)?
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("addons.lua"))
            .stdout(predicate::str::contains("addon_cache.json"));
        Ok(())
    }

    #[test]
    fn test_config_persists_base_dir() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;
        let games = workspace.path().join("games");
        std::fs::create_dir(&games)?;

        addon_sync(&workspace)?
            .arg("config")
            .arg("--set-base-dir")
            .arg(&games)
            .assert()
            .success()
            .stdout(predicate::str::contains("Base directory set to"));

        let settings = workspace.path().join("xdg").join("addon-sync").join("settings.json");
        let stored = std::fs::read_to_string(settings)?;
        assert!(stored.contains("games"));
        Ok(())
    }

    #[test]
    fn test_watch_rejects_missing_base_dir() -> anyhow::Result<()> {
        let workspace = TestWorkspace::new()?;

        let mut cmd = Command::cargo_bin("addon-sync")?;
        cmd.env("XDG_CONFIG_HOME", workspace.path().join("xdg"))
            .env("NO_COLOR", "1")
            .arg("--base-dir")
            .arg(workspace.path().join("missing"))
            .arg("watch")
            .assert()
            .failure();
        Ok(())
    }
}
