//! Common assertion helpers for test output validation
//!
//! Provides predicates for validating addon-sync command output and error messages.

#![allow(dead_code)]

use predicates::prelude::*;

pub fn up_to_date() -> impl Predicate<str> {
    predicates::str::contains("Cache already up to date")
}

pub fn cache_updated() -> impl Predicate<str> {
    predicates::str::contains("Cache updated")
}

pub fn no_cache_yet() -> impl Predicate<str> {
    predicates::str::contains("No cache yet")
}

pub fn read_failed() -> impl Predicate<str> {
    predicates::str::contains("Failed to read configuration file")
}

pub fn has_entry(id: u32, name: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("[{id}]")).and(predicates::str::contains(name.to_string()))
}
