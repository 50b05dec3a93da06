//! Utility functions and helpers
//!
//! Debouncing, logging and application paths.

pub mod app_paths;
pub mod debouncer;
pub mod dual_logging;
pub mod logging;
