use crate::config::Config;
use crate::error::AppError;
use std::path::Path;
use tracing::warn;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API base URL must be an http(s) URL
/// - Concurrency limit, HTTP timeout and timer intervals must be positive
/// - Custom file paths cannot be empty
/// - Log file path parent directory must exist or be creatable
///
/// A missing API key is not an error: every fetch will simply fail and
/// ratings stay unknown, which is logged once here.
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if !config.api_base_url.starts_with("http://") && !config.api_base_url.starts_with("https://")
    {
        return Err(AppError::config_error(
            "API base URL must start with http:// or https://",
        ));
    }

    if config.max_concurrent_requests == 0 {
        return Err(AppError::config_error(
            "max_concurrent_requests must be at least 1",
        ));
    }

    if config.request_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "request_timeout_seconds must be at least 1",
        ));
    }

    if config.save_interval_seconds == 0 || config.display_refresh_seconds == 0 {
        return Err(AppError::config_error("Timer intervals must be at least 1 second"));
    }

    if config.faceit_api_key.trim().is_empty() {
        warn!("Faceit API key is not configured!");
    }

    if let Some(data_path) = &config.data_file_path
        && data_path.is_empty()
    {
        return Err(AppError::config_error("Data file path cannot be empty"));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
