//! Error types for tap-gocardless
//!
//! This module defines the error hierarchy for the entire tap.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for tap-gocardless
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Config document is malformed
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// A required config key is absent or blank
    #[error("Missing required config field: {field}")]
    MissingConfigField {
        /// The missing key
        field: String,
    },

    /// A config value is out of range or badly formatted
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue {
        /// The offending key
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// Catalog asks for a replication method the tap cannot run
    #[error(
        "Only FULL_TABLE and INCREMENTAL replication methods are supported \
         (stream '{stream}' uses {method})"
    )]
    UnsupportedReplicationMethod {
        /// Stream id
        stream: String,
        /// Method as written in the catalog
        method: String,
    },

    /// JSON that failed to parse
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response without a GoCardless error envelope
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Non-success response carrying a GoCardless error envelope
    #[error("GoCardless API error {status} ({error_type}): {message}")]
    Api {
        /// Status code
        status: u16,
        /// `error.type`, e.g. `invalid_api_usage`
        error_type: String,
        /// `error.message` with any detail messages
        message: String,
        /// `error.request_id`
        request_id: Option<String>,
    },

    /// Still rate limited when retries ran out
    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// Seconds until the quota refills
        retry_after_seconds: u64,
    },

    /// Request did not complete in time
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    // ============================================================================
    // Data Errors
    // ============================================================================
    /// Response or record did not have the expected shape
    #[error("Failed to extract records from '{path}': {message}")]
    RecordExtraction {
        /// Where in the response the problem is
        path: String,
        /// What is wrong
        message: String,
    },

    /// Stream schema missing or invalid
    #[error("Schema error for stream '{stream}': {message}")]
    Schema {
        /// Stream id
        stream: String,
        /// What is wrong
        message: String,
    },

    // ============================================================================
    // Catalog / State Errors
    // ============================================================================
    /// Catalog document is malformed
    #[error("Catalog error: {message}")]
    Catalog {
        /// What is wrong
        message: String,
    },

    /// Catalog names a stream the tap does not know
    #[error("Stream '{stream}' is not a known GoCardless stream")]
    UnknownStream {
        /// Stream id from the catalog
        stream: String,
    },

    /// Known stream with no accessor to read it through
    #[error("No accessor registered for stream '{stream}'")]
    MissingAccessor {
        /// Stream id
        stream: String,
    },

    /// State document could not be read or written
    #[error("State error: {message}")]
    State {
        /// What is wrong
        message: String,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// Reading input files or writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file does not exist
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path as given
        path: String,
    },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a schema error
    pub fn schema(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create an unknown stream error
    pub fn unknown_stream(stream: impl Into<String>) -> Self {
        Self::UnknownStream {
            stream: stream.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } | Error::Api { status, .. } => {
                is_retryable_status(*status)
            }
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Result type alias for tap-gocardless
pub type Result<T> = std::result::Result<T, Error>;
