pub mod api_client;
pub mod config;
pub mod fetch_coordinator;
pub mod query_state;
pub mod session;
pub mod state;
pub mod table_display;
pub mod ui;
pub mod utils;
pub mod widgets;
