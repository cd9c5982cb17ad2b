// Domain errors - Error taxonomy for sampling and assembly

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Video cannot be opened or its duration cannot be determined
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A single seek/decode at one sample point failed
    #[error("Decode failed at {position:.3}s: {reason}")]
    DecodeFailure { position: f64, reason: String },

    /// A frame payload could not be decoded while laying out the document
    #[error("Image decode failed for {frame}: {reason}")]
    ImageDecodeFailure { frame: String, reason: String },

    /// A snapshot could not be encoded into a frame payload
    #[error("Image encode failed: {0}")]
    EncodeFailure(String),

    /// Invalid arguments provided
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The run was cancelled through its cancellation flag
    #[error("Operation cancelled")]
    Cancelled,

    /// Frame manifest could not be read or written
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Document sink refused or failed to store the output
    #[error("Document sink error: {0}")]
    Sink(String),

    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl DomainError {
    /// Whether the sampling loop may skip the failing sample point and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DomainError::DecodeFailure { .. })
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}
