/// Structured error handling for the scan bot
///
/// One top-level error with nested categories, so callers can match on the
/// kind of failure (network, data, chat platform, tracking state) without
/// string inspection.
use thiserror::Error;

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum ScanBotError {
    #[error("Network Error: {0}")]
    Network(#[from] NetworkError),

    #[error("Data Error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration Error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Chat Error: {0}")]
    Chat(#[from] ChatError),

    #[error("Tracking Error: {0}")]
    Tracking(#[from] TrackingError),
}

// =============================================================================
// NETWORK ERROR TYPES
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("Connection timeout to {endpoint}")]
    ConnectionTimeout { endpoint: String },

    #[error("HTTP {status} from {endpoint}: {}", .body.as_deref().unwrap_or("No body"))]
    HttpStatusError {
        endpoint: String,
        status: u16,
        body: Option<String>,
    },

    #[error("{message}")]
    Generic { message: String },
}

// =============================================================================
// DATA ERROR TYPES
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("Failed to parse {data_type}: {error}")]
    ParseError { data_type: String, error: String },

    #[error("{message}")]
    Generic { message: String },
}

// =============================================================================
// CONFIGURATION ERROR TYPES
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    #[error("Invalid config field '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Missing required config '{field}'")]
    MissingConfig { field: String },

    #[error("{message}")]
    Generic { message: String },
}

// =============================================================================
// CHAT PLATFORM ERROR TYPES
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("{operation} failed: {reason}")]
    RequestFailed { operation: String, reason: String },

    #[error("Invalid button url '{url}'")]
    InvalidUrl { url: String },
}

// =============================================================================
// TRACKING ERROR TYPES
// =============================================================================

/// Rejected store transitions. These are reported to the caller, not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("{address} is already tracked")]
    AlreadyTracked { address: String },

    #[error("{address} is not tracked")]
    NotTracked { address: String },
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<String> for ScanBotError {
    fn from(err: String) -> Self {
        ScanBotError::Network(NetworkError::Generic { message: err })
    }
}

impl From<&str> for ScanBotError {
    fn from(err: &str) -> Self {
        ScanBotError::Network(NetworkError::Generic {
            message: err.to_string(),
        })
    }
}

impl From<reqwest::Error> for ScanBotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let endpoint = err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return ScanBotError::Network(NetworkError::ConnectionTimeout { endpoint });
        }
        ScanBotError::Network(NetworkError::Generic {
            message: format!("HTTP request failed: {}", err),
        })
    }
}

impl From<serde_json::Error> for ScanBotError {
    fn from(err: serde_json::Error) -> Self {
        ScanBotError::Data(DataError::ParseError {
            data_type: "JSON".to_string(),
            error: err.to_string(),
        })
    }
}

impl From<teloxide::RequestError> for ScanBotError {
    fn from(err: teloxide::RequestError) -> Self {
        ScanBotError::chat("Telegram request", err.to_string())
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

impl ScanBotError {
    pub fn http_status(endpoint: impl Into<String>, status: u16, body: Option<String>) -> Self {
        ScanBotError::Network(NetworkError::HttpStatusError {
            endpoint: endpoint.into(),
            status,
            body,
        })
    }

    pub fn chat(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanBotError::Chat(ChatError::RequestFailed {
            operation: operation.into(),
            reason: reason.into(),
        })
    }

    pub fn missing_config(field: impl Into<String>) -> Self {
        ScanBotError::Configuration(ConfigurationError::MissingConfig {
            field: field.into(),
        })
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        ScanBotError::Configuration(ConfigurationError::Generic {
            message: message.into(),
        })
    }

    /// True for the "no-op, reported to caller" store outcomes
    pub fn is_tracking_conflict(&self) -> bool {
        matches!(self, ScanBotError::Tracking(_))
    }
}
