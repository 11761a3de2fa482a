//! Application-wide constants and configuration defaults
//!
//! This module centralizes magic numbers so the service, the config layer
//! and the tests agree on the same values.

/// Default FACEIT Data API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://open.faceit.com/data/v4";

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Maximum number of idle connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 16;

/// Default number of simultaneous outbound rating fetches
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;

/// Default cache lifetime of a fetched rating in hours
pub const DEFAULT_CACHE_EXPIRY_HOURS: u64 = 24;

/// Name of the player data file inside the data directory
pub const DATA_FILE_NAME: &str = "faceit_data.json";

/// Name of the log file inside the log directory
pub const LOG_FILE_NAME: &str = "faceit_scoreboard.log";

/// Directory name used under the platform config/data directories
pub const APP_DIR_NAME: &str = "faceit_scoreboard";

/// Game identifiers understood by the players endpoint
pub mod games {
    /// Counter-Strike 2, always queried first
    pub const PRIMARY: &str = "cs2";

    /// Legacy CS:GO profile, queried only when enabled in config
    pub const LEGACY: &str = "csgo";
}

/// Timing of background work
pub mod timing {
    /// How long a refresh waits for a free fetch slot before giving up (milliseconds)
    pub const GATE_ACQUIRE_TIMEOUT_MS: u64 = 100;

    /// How long a flush waits for exclusive access to the data file (milliseconds)
    pub const FILE_LOCK_TIMEOUT_MS: u64 = 5000;

    /// Default interval between write-back flushes (seconds)
    pub const DEFAULT_SAVE_INTERVAL_SECONDS: u64 = 30;

    /// Default interval between display refresh ticks (seconds)
    pub const DEFAULT_DISPLAY_REFRESH_SECONDS: u64 = 2;
}

/// Environment variable names
pub mod env_vars {
    /// FACEIT API key override
    pub const API_KEY: &str = "FACEIT_API_KEY";

    /// Player data file path override
    pub const DATA_FILE: &str = "FACEIT_DATA_FILE";

    /// Log file path override
    pub const LOG_FILE: &str = "FACEIT_LOG_FILE";

    /// HTTP timeout override in seconds
    pub const HTTP_TIMEOUT: &str = "FACEIT_HTTP_TIMEOUT";

    /// API base URL override
    pub const API_BASE_URL: &str = "FACEIT_API_BASE_URL";
}
