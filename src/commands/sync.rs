use crate::core::{
    catalog::CatalogClient,
    config::Settings,
    error::Result,
    output::{print_info, print_success, print_warning},
    reconcile::{ReconciliationEngine, ReconciliationReport},
};
use colored::*;

pub fn execute_sync(settings: &Settings) -> Result<()> {
    log::debug!(
        "Syncing {} into {}",
        settings.config_file_path().display(),
        settings.cache_file_path().display()
    );

    let catalog = CatalogClient::from_settings(settings)?;
    let engine = ReconciliationEngine::from_settings(settings, catalog);
    let report = engine.run()?;

    print_report(&report);
    println!(
        "   {} {}\n",
        "Cache:".bright_black(),
        engine.store().path().display()
    );
    Ok(())
}

pub fn print_report(report: &ReconciliationReport) {
    if report.changed {
        print_success(&format!("Cache updated: {}", report.summary()));
    } else {
        print_info(&format!("Cache already up to date ({} active)", report.unchanged));
    }

    if !report.placeholders.is_empty() {
        print_warning(&format!(
            "{} add-on(s) could not be resolved and were cached as placeholders",
            report.placeholders.len()
        ));
    }
}
