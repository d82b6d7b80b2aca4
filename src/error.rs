//! Error types for the quote digest job.

/// Top-level error type for a digest run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by a call against the remote quote service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP request to {operation} failed: {source}")]
    Http {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} returned status {code}: {message}")]
    Status {
        operation: String,
        code: i32,
        message: String,
    },

    #[error("{operation} raised a SOAP fault: {reason}")]
    Fault { operation: String, reason: String },

    #[error("{operation} response is missing field {field}")]
    MissingField { operation: String, field: String },

    #[error("{operation} response has invalid {field}: {value:?}")]
    InvalidField {
        operation: String,
        field: String,
        value: String,
    },

    #[error("Malformed XML in {operation} response: {reason}")]
    Xml { operation: String, reason: String },
}

impl ServiceError {
    pub(crate) fn missing(operation: &str, field: &str) -> Self {
        Self::MissingField {
            operation: operation.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid(operation: &str, field: &str, value: &str) -> Self {
        Self::InvalidField {
            operation: operation.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Mail transmission errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid {role} address {address:?}: {reason}")]
    InvalidAddress {
        role: &'static str,
        address: String,
        reason: String,
    },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Enrichment of one quote failed; the quote is dropped from the run.
#[derive(Debug, thiserror::Error)]
#[error("Failed to retrieve details for quote ID {quote_id} ({step}): {source}")]
pub struct EnrichmentFailure {
    pub quote_id: i64,
    pub step: &'static str,
    #[source]
    pub source: ServiceError,
}

/// Sending one digest failed; other recipients are unaffected.
#[derive(Debug, thiserror::Error)]
#[error("Failed to send digest to {recipient}: {source}")]
pub struct DispatchFailure {
    pub recipient: String,
    #[source]
    pub source: MailError,
}

/// Errors that abort a whole pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Login failed: {0}")]
    Authentication(#[source] ServiceError),
}

/// Result type alias for the digest job.
pub type Result<T> = std::result::Result<T, Error>;
