//! Configuration module
//!
//! Settings file loading, defaults and the API key lookup.

pub mod config;

pub use config::Config;
