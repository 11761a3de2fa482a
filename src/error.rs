use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to fetch data from API: {0}")]
    ApiFetch(#[from] reqwest::Error),

    // Specific HTTP status code errors
    #[error("API request not found (404): {url}")]
    ApiNotFound { url: String },

    #[error("API server error ({status}): {message} (URL: {url})")]
    ApiServerError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("API client error ({status}): {message} (URL: {url})")]
    ApiClientError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("API rate limit exceeded (429): {message} (URL: {url})")]
    ApiRateLimit { message: String, url: String },

    // Network-specific errors
    #[error("Network timeout while fetching data from: {url}")]
    NetworkTimeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    NetworkConnection { url: String, message: String },

    // Payload parsing errors
    #[error("API returned malformed JSON: {message} (URL: {url})")]
    ApiMalformedJson { message: String, url: String },

    #[error("API returned unexpected data structure: {message} (URL: {url})")]
    ApiUnexpectedStructure { message: String, url: String },

    #[error("API returned empty or missing data: {message} (URL: {url})")]
    ApiNoData { message: String, url: String },

    // Durable store errors
    #[error("Player data file is corrupt: {message} (path: {path})")]
    StoreCorrupt { path: String, message: String },

    #[error("Failed to serialize player data: {0}")]
    StoreSerialize(#[from] serde_json::Error),

    #[error("Timed out waiting for exclusive access to {path}")]
    FileLockTimeout { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Create an API not found error
    pub fn api_not_found(url: impl Into<String>) -> Self {
        Self::ApiNotFound { url: url.into() }
    }

    /// Create an API server error (5xx status codes)
    pub fn api_server_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServerError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API client error (4xx status codes except 404 and 429)
    pub fn api_client_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiClientError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API rate limit error
    pub fn api_rate_limit(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiRateLimit {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a network timeout error
    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Create a network connection error
    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a malformed JSON error
    pub fn api_malformed_json(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiMalformedJson {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an unexpected data structure error
    pub fn api_unexpected_structure(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiUnexpectedStructure {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a no data error
    pub fn api_no_data(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiNoData {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a corrupt store error
    pub fn store_corrupt(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreCorrupt {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file lock timeout error
    pub fn file_lock_timeout(path: impl Into<String>) -> Self {
        Self::FileLockTimeout { path: path.into() }
    }

    /// Check if error came from the transport layer (network, timeout, HTTP status)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::ApiFetch(_)
                | AppError::ApiNotFound { .. }
                | AppError::ApiServerError { .. }
                | AppError::ApiClientError { .. }
                | AppError::ApiRateLimit { .. }
                | AppError::NetworkTimeout { .. }
                | AppError::NetworkConnection { .. }
        )
    }

    /// Check if error means the response body could not be understood
    pub fn is_malformed_payload(&self) -> bool {
        matches!(
            self,
            AppError::ApiMalformedJson { .. }
                | AppError::ApiUnexpectedStructure { .. }
                | AppError::ApiNoData { .. }
        )
    }

    /// Check if error indicates data not found (business logic, not technical error)
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::ApiNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_helper() {
        let error = AppError::config_error("Invalid configuration");
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: Invalid configuration");
    }

    #[test]
    fn test_api_not_found_helper() {
        let error = AppError::api_not_found("https://example.com/players");
        assert!(error.is_not_found());
        assert!(error.is_transport());
        assert_eq!(
            error.to_string(),
            "API request not found (404): https://example.com/players"
        );
    }

    #[test]
    fn test_api_server_error_helper() {
        let error = AppError::api_server_error(500, "Internal Server Error", "https://example.com");
        assert!(matches!(error, AppError::ApiServerError { status: 500, .. }));
        assert!(error.is_transport());
        assert!(!error.is_malformed_payload());
    }

    #[test]
    fn test_api_rate_limit_helper() {
        let error = AppError::api_rate_limit("Too Many Requests", "https://example.com");
        assert_eq!(
            error.to_string(),
            "API rate limit exceeded (429): Too Many Requests (URL: https://example.com)"
        );
    }

    #[test]
    fn test_network_helpers_are_transport() {
        assert!(AppError::network_timeout("https://example.com").is_transport());
        assert!(AppError::network_connection("https://example.com", "refused").is_transport());
    }

    #[test]
    fn test_payload_errors_are_not_transport() {
        let malformed = AppError::api_malformed_json("Response is not valid JSON", "u");
        let structure = AppError::api_unexpected_structure("missing field", "u");
        let empty = AppError::api_no_data("Response body is empty", "u");

        for error in [malformed, structure, empty] {
            assert!(error.is_malformed_payload());
            assert!(!error.is_transport());
        }
    }

    #[test]
    fn test_store_errors() {
        let corrupt = AppError::store_corrupt("/tmp/data.json", "expected value at line 1");
        assert_eq!(
            corrupt.to_string(),
            "Player data file is corrupt: expected value at line 1 (path: /tmp/data.json)"
        );

        let timeout = AppError::file_lock_timeout("/tmp/data.json");
        assert!(matches!(timeout, AppError::FileLockTimeout { .. }));
        assert!(!timeout.is_transport());
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid").unwrap_err();
        let app_error: AppError = json_error.into();
        assert!(matches!(app_error, AppError::StoreSerialize(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));
    }

    #[test]
    fn test_error_from_toml_deserialize() {
        let invalid_toml = "invalid = [toml";
        let toml_error = toml::from_str::<toml::Value>(invalid_toml).unwrap_err();
        let app_error: AppError = toml_error.into();
        assert!(matches!(app_error, AppError::TomlDeserialize(_)));
    }
}
