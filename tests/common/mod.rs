//! Consolidated test utilities for addon-sync
//!
//! This module provides unified testing utilities for integration tests:
//! isolated workspaces on disk, a recording in-memory catalog, and output predicates.

pub mod assertions;
pub mod catalog;
pub mod fixtures;
