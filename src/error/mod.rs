//! Error handling module for FrameDeck

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Pipeline stage an error surfaced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sampling,
    Assembly,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Sampling => write!(f, "sampling"),
            Stage::Assembly => write!(f, "assembly"),
        }
    }
}

/// Main error type for FrameDeck operations
#[derive(Error, Debug)]
pub enum FrameDeckError {
    /// Extraction run failed; no frames were produced
    #[error("Sampling failed: {0}")]
    Sampling(DomainError),

    /// Document assembly failed; no document was emitted
    #[error("Assembly failed: {0}")]
    Assembly(DomainError),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FrameDeckError {
    /// Stage that failed, if the error belongs to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            FrameDeckError::Sampling(_) => Some(Stage::Sampling),
            FrameDeckError::Assembly(_) => Some(Stage::Assembly),
            _ => None,
        }
    }

    /// Underlying domain error, if any
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            FrameDeckError::Sampling(e) | FrameDeckError::Assembly(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for FrameDeck operations
pub type FrameDeckResult<T> = std::result::Result<T, FrameDeckError>;
