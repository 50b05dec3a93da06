//! UI widgets for the TUI application
//!
//! Reusable input components with their own key handling.

pub mod page_size_selector;
pub mod search_input;
