// Ports - Interface definitions (contracts)

use crate::config::AppConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use async_trait::async_trait;
use std::path::Path;

/// Port for one opened video source.
///
/// Methods take `&mut self`: a source serves one seek at a time and the
/// sampler awaits each call before issuing the next.
#[async_trait]
pub trait VideoSourcePort: Send {
    /// Human-readable descriptor (path or URL) used for logging and naming
    fn describe(&self) -> String;

    /// Total duration in seconds, `None` if unknown
    async fn duration(&mut self) -> Result<Option<f64>, DomainError>;

    /// Seek to a timeline position and wait until the frame there is decoded
    async fn seek_to(&mut self, seconds: f64) -> Result<(), DomainError>;

    /// Capture the frame at the current position, resized to `width` x `height`
    async fn capture(&mut self, width: u32, height: u32) -> Result<Snapshot, DomainError>;
}

/// Port for opening video sources from a descriptor
#[async_trait]
pub trait VideoSourceFactory: Send + Sync {
    /// Open a source; fails with `SourceUnavailable` when it cannot be read
    async fn open(&self, source: &str) -> Result<Box<dyn VideoSourcePort>, DomainError>;
}

/// Port for providers that hand over already-extracted frames
#[async_trait]
pub trait FrameProviderPort: Send + Sync {
    /// Fetch `(image, timestamp)` pairs in capture order
    async fn fetch_frames(&self, source: &str) -> Result<Vec<ProvidedFrame>, DomainError>;

    /// Name of the video the frames belong to, used for output naming
    async fn source_name(&self, source: &str) -> Result<String, DomainError> {
        Ok(source.to_string())
    }
}

/// Port for consumers of the finished document
#[async_trait]
pub trait DocumentSinkPort: Send + Sync {
    /// Store the document and return where it went
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<String, DomainError>;
}

/// Port for persisted configuration
#[async_trait]
pub trait ConfigPort: Send + Sync {
    /// Load and parse a configuration file
    async fn load_config(&self, path: &Path) -> Result<AppConfig, DomainError>;

    /// Write a configuration file, creating parent directories
    async fn save_config(&self, path: &Path, config: &AppConfig) -> Result<(), DomainError>;
}
