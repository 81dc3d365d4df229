use crate::core::{
    active_set::ActiveSetReader,
    cache_store::CacheStore,
    config::Settings,
    error::Result,
    output::{print_info, print_section_header, print_warning},
    state::{AddonId, CacheDocument, CachedEntry},
};
use colored::*;
use std::collections::BTreeMap;

/// Cached entries sharing one parent, in display order
#[derive(Debug, PartialEq)]
pub struct ParentSection<'a> {
    pub parent_id: AddonId,
    pub parent_name: &'a str,
    pub entries: Vec<&'a CachedEntry>,
}

pub fn execute_status(settings: &Settings) -> Result<()> {
    let store = CacheStore::new(settings.cache_file_path());
    if !store.path().exists() {
        print_info("No cache yet. Run 'addon-sync sync' first.");
        return Ok(());
    }

    let doc = store.load();
    if doc.entries.is_empty() {
        print_info("No add-ons cached.");
    } else {
        for section in group_by_parent(&doc) {
            print_section_header(&format!(
                "{} {}",
                section.parent_name,
                format!("({})", section.parent_id).bright_black()
            ));
            for entry in section.entries {
                println!("   {}", format_entry(entry));
            }
        }
        println!();
    }

    println!(
        "{} add-on(s) cached, updated {}",
        doc.entries.len(),
        doc.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    // The list may have changed since the last pass
    match ActiveSetReader::new(settings.config_file_path()).read() {
        Ok(active) if active != doc.last_known_active_ids => {
            print_warning("Cache is behind the add-on list. Run 'addon-sync sync' to refresh.")
        }
        Ok(_) => {}
        Err(e) => log::warn!("Could not compare against the add-on list: {e}"),
    }

    Ok(())
}

pub fn group_by_parent(doc: &CacheDocument) -> Vec<ParentSection<'_>> {
    let mut sections: BTreeMap<AddonId, ParentSection<'_>> = BTreeMap::new();

    for entry in doc.entries.values() {
        sections
            .entry(entry.parent_id)
            .or_insert_with(|| ParentSection {
                parent_id: entry.parent_id,
                parent_name: &entry.parent_name,
                entries: Vec::new(),
            })
            .entries
            .push(entry);
    }

    let mut sections: Vec<ParentSection<'_>> = sections.into_values().collect();
    for section in &mut sections {
        // Root first, then by name
        section.entries.sort_by(|a, b| {
            b.is_root()
                .cmp(&a.is_root())
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
    }
    sections.sort_by(|a, b| a.parent_name.cmp(b.parent_name));
    sections
}

fn format_entry(entry: &CachedEntry) -> String {
    let mut line = format!(
        "{} {}",
        format!("[{}]", entry.id).bright_black(),
        entry.display_name.white()
    );
    if entry.is_placeholder() {
        line.push_str(&format!(" {}", "(unresolved)".yellow()));
    }
    if entry.release_info.coming_soon {
        line.push_str(&format!(" {}", "(coming soon)".blue()));
    }
    line
}
