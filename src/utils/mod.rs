//! This module aggregates various utility submodules used throughout the application.

/// Utilities for fetching fun facts from a public API, with a bundled fallback.
pub mod fun_facts;
