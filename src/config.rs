use crate::components::calendar::grid::{GridOptions, WeekStart};
use crate::components::prompt_relay::{GEMINI_BASE_URL, GEMINI_MODEL};
use crate::error::{config_error, env_error, AppResult};
use dotenvy::dotenv;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Durable key used by the original browser front end
pub const DEFAULT_STORAGE_KEY: &str = "calendarJobs";

/// Default grid options file
pub const DEFAULT_CALENDAR_CONFIG: &str = "config/calendar.toml";

/// Where the event snapshot lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// JSON file `<data_dir>/<key>.json`
    File { data_dir: PathBuf },
    Redis { url: String },
    /// Process memory only, lost on exit
    Memory,
}

/// Main configuration structure for the server
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key
    pub gemini_api_key: String,
    /// Gemini model name
    pub gemini_model: String,
    /// Gemini API base URL
    pub gemini_base_url: String,
    /// Timeout for one extraction request
    pub gemini_timeout: Duration,
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Storage backend
    pub storage: StorageConfig,
    /// Key the snapshot is stored under
    pub storage_key: String,
    /// Language for user-facing messages
    pub locale: String,
    /// Front-end assets to serve, if any
    pub static_dir: Option<PathBuf>,
    /// Month grid layout
    pub grid: GridOptions,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = var("GEMINI_API_KEY").ok_or_else(|| env_error("GEMINI_API_KEY"))?;
        let gemini_model = var("GEMINI_MODEL").unwrap_or_else(|| GEMINI_MODEL.to_string());
        let gemini_base_url = var("GEMINI_BASE_URL").unwrap_or_else(|| GEMINI_BASE_URL.to_string());

        let gemini_timeout = match var("GEMINI_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse::<u64>()
                    .map_err(|_| config_error(&format!("Invalid GEMINI_TIMEOUT_SECS: {}", secs)))?,
            ),
            None => Duration::from_secs(30),
        };

        let host = var("HOST").unwrap_or_else(|| String::from("0.0.0.0"));
        let port = match var("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid PORT: {}", port)))?,
            None => 8080,
        };

        let storage = match var("STORAGE_BACKEND")
            .unwrap_or_else(|| String::from("file"))
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "file" => StorageConfig::File {
                data_dir: PathBuf::from(var("DATA_DIR").unwrap_or_else(|| String::from("./data"))),
            },
            "redis" => StorageConfig::Redis {
                url: var("REDIS_URL").unwrap_or_else(|| String::from("redis://127.0.0.1:6379")),
            },
            "memory" => StorageConfig::Memory,
            other => {
                return Err(config_error(&format!("Unknown STORAGE_BACKEND: {}", other)));
            }
        };

        let storage_key = var("STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        let locale = var("LOCALE").unwrap_or_else(|| String::from("en"));
        let static_dir = var("STATIC_DIR").map(PathBuf::from);

        // Grid options from file, then env overrides
        let grid_path = var("CALENDAR_CONFIG").unwrap_or_else(|| DEFAULT_CALENDAR_CONFIG.to_string());
        let mut grid = match fs::read_to_string(&grid_path) {
            Ok(content) => parse_grid_options(&content)?,
            Err(_) => GridOptions::default(),
        };

        if let Some(pad) = var("PAD_TRAILING_WEEK") {
            grid.pad_trailing_week = parse_bool("PAD_TRAILING_WEEK", &pad)?;
        }
        if let Some(week_start) = var("WEEK_START") {
            grid.week_start = week_start.parse::<WeekStart>()?;
        }

        Ok(Config {
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            gemini_timeout,
            host,
            port,
            storage,
            storage_key,
            locale,
            static_dir,
            grid,
        })
    }

    /// Address to bind the HTTP server to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse the `config/calendar.toml` contents
pub fn parse_grid_options(content: &str) -> AppResult<GridOptions> {
    Ok(toml::from_str::<GridOptions>(content)?)
}

fn parse_bool(name: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(config_error(&format!("Invalid {}: {}", name, value))),
    }
}
