use crate::constants::{self, env_vars, timing};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_default_data_file_path, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the rating cache service.
/// Handles loading, saving, and managing settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// FACEIT Data API key sent as a bearer token.
    #[serde(default)]
    pub faceit_api_key: String,
    /// Fall back to the legacy CS:GO profile when no CS2 level exists.
    #[serde(default)]
    pub use_csgo: bool,
    /// Whether the level is displayed for players seen for the first time.
    #[serde(default = "default_status")]
    pub default_status: bool,
    /// Chat commands the host maps to the display toggle.
    #[serde(default = "default_commands")]
    pub commands: Vec<String>,
    /// Hours a fetched level stays fresh.
    #[serde(default = "default_cache_expiry_hours")]
    pub cache_expiry_hours: u64,
    /// Maximum number of simultaneous API requests.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    /// HTTP timeout in seconds for API requests.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Seconds between write-back flushes of changed players.
    #[serde(default = "default_save_interval")]
    pub save_interval_seconds: u64,
    /// Seconds between display refresh ticks.
    #[serde(default = "default_display_refresh")]
    pub display_refresh_seconds: u64,
    /// Base URL of the FACEIT Data API. Tests point this at a mock server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Path to the player data file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file_path: Option<String>,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
}

fn default_status() -> bool {
    true
}

fn default_commands() -> Vec<String> {
    vec!["!faceit".to_string(), "!fl".to_string()]
}

fn default_cache_expiry_hours() -> u64 {
    constants::DEFAULT_CACHE_EXPIRY_HOURS
}

fn default_max_concurrent_requests() -> usize {
    constants::DEFAULT_MAX_CONCURRENT_REQUESTS
}

fn default_request_timeout() -> u64 {
    constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_save_interval() -> u64 {
    timing::DEFAULT_SAVE_INTERVAL_SECONDS
}

fn default_display_refresh() -> u64 {
    timing::DEFAULT_DISPLAY_REFRESH_SECONDS
}

fn default_api_base_url() -> String {
    constants::DEFAULT_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            faceit_api_key: String::new(),
            use_csgo: false,
            default_status: default_status(),
            commands: default_commands(),
            cache_expiry_hours: default_cache_expiry_hours(),
            max_concurrent_requests: default_max_concurrent_requests(),
            request_timeout_seconds: default_request_timeout(),
            save_interval_seconds: default_save_interval(),
            display_refresh_seconds: default_display_refresh(),
            api_base_url: default_api_base_url(),
            data_file_path: None,
            log_file_path: None,
        }
    }
}

impl Config {
    /// Loads configuration from the given path, or the default config file location.
    /// If no config file exists, a default one is written so it can be edited.
    /// Environment variables can override config file values.
    ///
    /// # Environment Variables
    /// - `FACEIT_API_KEY` - Override API key
    /// - `FACEIT_DATA_FILE` - Override player data file path
    /// - `FACEIT_LOG_FILE` - Override log file path
    /// - `FACEIT_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    /// - `FACEIT_API_BASE_URL` - Override API base URL
    pub async fn load(path: Option<&str>) -> Result<Self, AppError> {
        let config_path = path.map(str::to_string).unwrap_or_else(get_config_path);

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            let config = Config::default();
            config.save_to_path(&config_path).await?;
            info!("Created default configuration at {config_path}");
            config
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Overrides fields with values from environment variables when present.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var(env_vars::API_KEY) {
            self.faceit_api_key = api_key;
        }

        if let Ok(data_file) = std::env::var(env_vars::DATA_FILE) {
            self.data_file_path = Some(data_file);
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.request_timeout_seconds = timeout;
        }

        if let Ok(base_url) = std::env::var(env_vars::API_BASE_URL) {
            self.api_base_url = base_url;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Resolved location of the player data file.
    pub fn data_file(&self) -> String {
        self.data_file_path
            .clone()
            .unwrap_or_else(get_default_data_file_path)
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays current configuration settings to stdout. The API key is masked.
    pub fn display(&self, config_path: &str) {
        let masked_key = if self.faceit_api_key.is_empty() {
            "(not set)".to_string()
        } else {
            format!("{}…", self.faceit_api_key.chars().take(4).collect::<String>())
        };

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        println!("{config_path}");
        println!("────────────────────────────────────");
        println!("API Key: {masked_key}");
        println!("API Base URL: {}", self.api_base_url);
        println!("Use CS:GO fallback: {}", self.use_csgo);
        println!("Default display status: {}", self.default_status);
        println!("Toggle commands: {}", self.commands.join(", "));
        println!("────────────────────────────────────");
        println!("Cache expiry: {} hours", self.cache_expiry_hours);
        println!("Max concurrent requests: {}", self.max_concurrent_requests);
        println!("HTTP Timeout: {} seconds", self.request_timeout_seconds);
        println!("Save interval: {} seconds", self.save_interval_seconds);
        println!("────────────────────────────────────");
        println!("Data File Location:");
        println!("{}", self.data_file());
        println!("Log File Location:");
        match &self.log_file_path {
            Some(custom_path) => println!("{custom_path}"),
            None => {
                println!("{}/{}", get_log_dir_path(), constants::LOG_FILE_NAME);
                println!("(Default location)");
            }
        }
    }

    /// Saves configuration to a custom file path, creating the parent directory.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without env overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
