use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use city_search::api_client::ApiClient;
use city_search::config::Config;
use city_search::query_state::PageSize;
use city_search::session::SearchSession;
use city_search::table_display::display_results;
use city_search::ui::app::CitySearchApp;
use city_search::utils::{dual_logging, logging};

/// Browse GeoDB cities from the terminal
#[derive(Debug, Parser)]
#[command(name = "city-search", version, about)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a commented default config file and exit
    #[arg(long)]
    generate_config: bool,

    /// Fetch one page, print it and exit instead of starting the TUI
    #[arg(long)]
    print: bool,

    /// Place-name prefix for --print (empty uses the fallback prefix)
    #[arg(long, short, default_value = "")]
    query: String,

    /// Page number for --print
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    /// Rows per page, 5 to 10
    #[arg(long, value_parser = parse_page_size)]
    page_size: Option<PageSize>,
}

fn parse_page_size(value: &str) -> Result<PageSize, String> {
    let size: u32 = value.parse().map_err(|e| format!("{e}"))?;
    PageSize::try_from(size).map_err(|e| e.to_string())
}

fn generate_config(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {}", path.display()))?;
    println!("Configuration file created at: {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        return generate_config(cli.config);
    }

    let log_buffer = logging::init_tracing_with_dual_logging();
    if let Some(dual_logger) = dual_logging::get_dual_logger() {
        eprintln!("Debug logs: {}", dual_logger.log_path().display());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let api_key = config.resolve_api_key()?;
    let client = ApiClient::new(&config.api.base_url, &config.api.host, &api_key);

    let mut options = config.session_options();
    if let Some(page_size) = cli.page_size {
        options.page_size = page_size;
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let mut session = SearchSession::new(Arc::new(client), runtime.handle().clone(), options);

    if cli.print {
        session.seed_query(&cli.query, cli.page);
        session.start();
        let replaced = runtime.block_on(session.wait_for_outcome());
        if replaced != Some(true) {
            anyhow::bail!("Fetch failed, see {}", log_hint());
        }
        display_results(
            session.results(),
            session.query(),
            &config.display.flag_url_template,
            config.display.use_glyphs,
        );
        return Ok(());
    }

    CitySearchApp::new(session, config.display.clone(), Some(log_buffer)).run()
}

fn log_hint() -> String {
    dual_logging::get_dual_logger()
        .map(|logger| logger.log_path().display().to_string())
        .unwrap_or_else(|| "the log".to_string())
}
