//! Terminal user interface
//!
//! `renderer` is the pure projection of results into rows and page links;
//! `table_renderer` draws it with ratatui; `global_keys` holds listeners that
//! see keys before the focused widget; `app` runs the event loop.

pub mod app;
pub mod global_keys;
pub mod renderer;
pub mod table_renderer;
