//! Error types for the stackmon ports.

use thiserror::Error;

/// Errors raised while fetching raw state from object storage.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to fetch s3://{bucket}/{key}: {detail}")]
    Fetch {
        bucket: String,
        key: String,
        detail: String,
    },

    #[error("object s3://{bucket}/{key} is not valid UTF-8")]
    Encoding { bucket: String, key: String },
}

/// Errors raised by the monitoring vendor API.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to {endpoint} failed: {detail}")]
    Transport { endpoint: String, detail: String },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },

    #[error("unsupported test type: {0}")]
    UnsupportedTestType(String),
}
