//! Terminal output for the addon-sync commands.
//!
//! Every command reports through these helpers so pass results, cache listings and
//! failures share one look. Each `print_*` has a `format_*` twin that returns the line
//! instead of printing it.
//!
//! | Helper | Marker | Used for |
//! |---|---|---|
//! | [`print_error`] | red `✕ Error:` | a failed command, before exit status 1 |
//! | [`print_warning`] | yellow `!` | placeholders, a stale cache, a failed watch pass |
//! | [`print_success`] | green `✓` | a pass that changed the cache, a stored setting |
//! | [`print_info`] | none | nothing to do, the watch banner |
//! | [`print_section_header`] | trailing `:` | one parent group in `status`, the settings table |

use colored::*;

pub fn format_error(message: &str) -> String {
    format!("\n{} {}\n", "✕ Error:".red(), message.white())
}

pub fn format_warning(message: &str) -> String {
    format!("\n{} {}", "!".yellow(), message.white())
}

pub fn format_success(message: &str) -> String {
    format!("\n{} {}", "✓".green(), message.white())
}

pub fn format_info(message: &str) -> String {
    format!("\n{}\n", message.white())
}

pub fn format_section_header(header: &str) -> String {
    format!("\n{}:\n", header.white())
}

/// Printed to stdout so scripted callers see the reason next to the exit status
pub fn print_error(message: &str) {
    println!("{}", format_error(message));
}

pub fn print_warning(message: &str) {
    println!("{}", format_warning(message));
}

pub fn print_success(message: &str) {
    println!("{}", format_success(message));
}

pub fn print_info(message: &str) {
    println!("{}", format_info(message));
}

pub fn print_section_header(header: &str) {
    println!("{}", format_section_header(header));
}
