use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Required settings are absent; raised before any network call
    #[error("Missing required configuration: {}", .missing.join(", "))]
    ConfigInvalid { missing: Vec<&'static str> },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Report document or email body could not be built
    #[error("Report generation failed: {0}")]
    Render(String),

    /// Report was built but could not be submitted over SMTP
    #[error("Email delivery failed: {0}")]
    Delivery(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Provider API error types
///
/// These never abort a run: the fetcher reports them to its observer and
/// degrades to an empty result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Request could not be sent or the connection dropped
    #[error("Transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// Provider answered with a non-success status
    #[error("HTTP {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// Response body was not valid JSON
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Request timed out
    #[error("Request timeout: {timeout_seconds}s for {endpoint}")]
    Timeout {
        timeout_seconds: u64,
        endpoint: String,
    },

    /// Retry limit exceeded
    #[error("Max retries exceeded for {endpoint}: {last_error}")]
    MaxRetriesExceeded {
        endpoint: String,
        last_error: String,
    },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } | FetchError::Timeout { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Decode { .. } | FetchError::MaxRetriesExceeded { .. } => false,
        }
    }
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for provider API operations
pub type FetchResult<T> = Result<T, FetchError>;

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(err: lettre::error::Error) -> Self {
        AppError::Delivery(format!("message build error: {}", err))
    }
}

impl From<lettre::address::AddressError> for AppError {
    fn from(err: lettre::address::AddressError) -> Self {
        AppError::Delivery(format!("invalid address: {}", err))
    }
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        AppError::Delivery(format!("SMTP error: {}", err))
    }
}
