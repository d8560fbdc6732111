//! Error types for the JSON exporters
//!
//! Export failures are classified into a small set of kinds so callers can tell
//! a malformed batch from an unreachable or unhappy collector. The SDK boundary
//! collapses all of them into a single failure result.

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Export/delivery errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Provider flush or shutdown reported by the OpenTelemetry SDK
    #[error("OpenTelemetry SDK error: {0}")]
    Sdk(#[from] opentelemetry_sdk::error::OTelSdkError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Destination URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    /// Invalid metric interval
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Properties file could not be read
    #[error("Failed to read configuration: {0}")]
    Read(String),

    /// Properties file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The HTTP client could not be created from the configured settings
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// A value failed validation, such as a zero request timeout
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Failure of a single export call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The batch could not be turned into a JSON document
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The destination could not be reached (DNS, refused connection, timeout, I/O)
    #[error("Network error: {0}")]
    Network(String),

    /// The destination answered with a status other than 200 or 201
    #[error("Destination rejected payload with status {0}")]
    RejectedStatus(u16),
}

impl ExportError {
    /// Short, stable name of the failure kind for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::Serialization(_) => "serialization",
            ExportError::Network(_) => "network",
            ExportError::RejectedStatus(_) => "rejected_status",
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

impl From<ExportError> for opentelemetry_sdk::error::OTelSdkError {
    fn from(err: ExportError) -> Self {
        opentelemetry_sdk::error::OTelSdkError::InternalFailure(err.to_string())
    }
}
