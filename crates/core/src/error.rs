//! Error types for sitepilot-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sitepilot-core
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sitepilot-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidConfig(String),

    /// AWS SDK error (any service)
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    /// Request could not be built from the given parameters
    #[error("Invalid AWS request: {0}")]
    RequestBuild(String),

    /// A paginated listing ended without a way to fetch the next page
    #[error("Incomplete listing for bucket '{bucket}': truncated page without continuation token")]
    IncompleteListing { bucket: String },

    /// Region has no known S3 website endpoint
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

// Generic SdkError conversion; every AWS service crate re-exports the same type
impl<E, R> From<aws_sdk_s3::error::SdkError<E, R>> for Error
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    fn from(err: aws_sdk_s3::error::SdkError<E, R>) -> Self {
        Error::AwsSdk(aws_sdk_s3::error::DisplayErrorContext(&err).to_string())
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for Error {
    fn from(err: aws_smithy_types::error::operation::BuildError) -> Self {
        Error::RequestBuild(err.to_string())
    }
}

// ByteStreamError conversion
impl From<aws_sdk_s3::primitives::ByteStreamError> for Error {
    fn from(err: aws_sdk_s3::primitives::ByteStreamError) -> Self {
        Error::AwsSdk(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Other(format!("Background task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_incomplete_listing_message() {
        let err = Error::IncompleteListing {
            bucket: "site".to_string(),
        };
        assert!(err.to_string().contains("'site'"));
    }
}
