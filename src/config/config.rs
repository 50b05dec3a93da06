use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api_client::{DEFAULT_API_HOST, DEFAULT_BASE_URL};
use crate::fetch_coordinator::{DEFAULT_DEBOUNCE_MS, DEFAULT_FALLBACK_PREFIX};
use crate::query_state::{PageSize, MAX_QUERY_LEN};
use crate::session::SessionOptions;
use crate::ui::renderer::DEFAULT_FLAG_URL_TEMPLATE;

/// Environment variable holding the GeoDB API key
pub const API_KEY_ENV: &str = "RAPID_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the GeoDB service
    pub base_url: String,

    /// Value sent as the `x-rapidapi-host` header
    pub host: String,

    /// Used only when the environment variable is not set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before searching
    pub debounce_ms: u64,

    /// Name prefix for page fetches while the search box is empty
    pub fallback_prefix: String,

    /// Page size on startup (5 to 10)
    pub default_page_size: PageSize,

    /// Maximum search length, kept within 1 to 20
    pub max_query_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Draw flags as regional-indicator glyphs instead of bracketed codes
    pub use_glyphs: bool,

    /// Flag image location, `{code}` is replaced by the country code
    pub flag_url_template: String,

    /// Show the flag image URL next to each row
    pub show_flag_urls: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_API_HOST.to_string(),
            api_key: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            fallback_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
            default_page_size: PageSize::default(),
            max_query_len: MAX_QUERY_LEN,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            flag_url_template: DEFAULT_FLAG_URL_TEMPLATE.to_string(),
            show_flag_urls: false,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from `path`, writing defaults there if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("city-search").join("config.toml"))
    }

    /// API key from the environment, else from the config file.
    /// Read once at startup; the client keeps its own copy afterwards.
    pub fn resolve_api_key(&self) -> Result<String> {
        Self::pick_api_key(std::env::var(API_KEY_ENV).ok(), self.api.api_key.as_deref())
    }

    fn pick_api_key(from_env: Option<String>, from_file: Option<&str>) -> Result<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                from_file
                    .filter(|key| !key.trim().is_empty())
                    .map(str::to_string)
            })
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key: set {} or api.api_key in the config file",
                    API_KEY_ENV
                )
            })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            page_size: self.search.default_page_size,
            debounce_ms: self.search.debounce_ms,
            fallback_prefix: self.search.fallback_prefix.clone(),
            max_query_len: self.search.max_query_len.clamp(1, MAX_QUERY_LEN),
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# city-search configuration file
# Location: ~/.config/city-search/config.toml (Linux)
#           ~/Library/Application Support/city-search/config.toml (macOS)
#           %APPDATA%\city-search\config.toml (Windows)

[api]
# GeoDB cities service
base_url = "https://wft-geo-db.p.rapidapi.com"
host = "wft-geo-db.p.rapidapi.com"

# The key is normally taken from the RAPID_API_KEY environment variable.
# Uncomment to use a key from this file instead.
# api_key = "your-key"

[search]
# Milliseconds of quiet typing before a search is sent
debounce_ms = 1000

# Name prefix used for page fetches while the search box is empty
fallback_prefix = "del"

# Rows per page on startup: 5, 6, 7, 8, 9 or 10
default_page_size = 5

# Longest accepted search text (1 to 20)
max_query_len = 20

[display]
# Draw flags as emoji; set to false for [IN]-style codes
use_glyphs = true

# Flag image location, {code} is replaced by the two-letter country code
flag_url_template = "https://flagsapi.com/{code}/shiny/64.png"

# Show flag image URLs in the results table
show_flag_urls = false
"#
        .to_string()
    }
}
