//! HTTP client creation and configuration utilities

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Duration;

use crate::error::AppError;

/// Creates the HTTP client used for every FACEIT request.
///
/// The client carries the bearer credential and JSON accept header as default
/// headers, so individual requests only need a URL. The timeout covers the
/// whole request; hitting it is reported as a network timeout by the fetcher.
pub fn create_faceit_client(api_key: &str, timeout_seconds: u64) -> Result<Client, AppError> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|e| AppError::config_error(format!("Invalid API key header value: {e}")))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds))
        .pool_max_idle_per_host(crate::constants::HTTP_POOL_MAX_IDLE_PER_HOST)
        .build()?;
    Ok(client)
}
