use anyhow::Result;
use tempfile::TempDir;

use city_search::config::Config;

#[test]
fn test_missing_config_is_written_with_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("config.toml");

    let config = Config::load_from(&path)?;
    assert!(path.exists());
    assert_eq!(config.search.debounce_ms, 1000);

    let reloaded = Config::load_from(&path)?;
    assert_eq!(reloaded.search.fallback_prefix, "del");
    assert_eq!(reloaded.search.default_page_size.get(), 5);
    assert!(reloaded.api.api_key.is_none());

    Ok(())
}

#[test]
fn test_user_settings_reach_the_session() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[search]\ndebounce_ms = 300\ndefault_page_size = 8\nmax_query_len = 64\n\n[api]\napi_key = \"from-file\"\n",
    )?;

    let config = Config::load_from(&path)?;
    let options = config.session_options();
    assert_eq!(options.debounce_ms, 300);
    assert_eq!(options.page_size.get(), 8);
    // the search box never accepts more than 20 characters
    assert_eq!(options.max_query_len, 20);
    assert_eq!(config.api.api_key.as_deref(), Some("from-file"));

    Ok(())
}

#[test]
fn test_broken_config_reports_path() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[search]\ndefault_page_size = 3\n")?;

    let err = Config::load_from(&path).unwrap_err();
    assert!(format!("{err}").contains("config.toml"));

    Ok(())
}

#[test]
fn test_generated_template_loads() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    std::fs::write(&path, Config::create_default_with_comments())?;

    let config = Config::load_from(&path)?;
    assert!(config.display.use_glyphs);
    assert!(!config.display.show_flag_urls);

    Ok(())
}

#[test]
fn test_zero_query_length_still_accepts_input() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[search]\nmax_query_len = 0\n")?;

    let config = Config::load_from(&path)?;
    assert_eq!(config.session_options().max_query_len, 1);

    Ok(())
}
