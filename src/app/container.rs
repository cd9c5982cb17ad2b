use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{FsDocumentSink, ManifestFrameProvider};
use crate::app::{
    export_interactor::ExportInteractor,
    extract_interactor::{ExtractInteractor, ExtractSettings},
};
use crate::config::AppConfig;
use crate::domain::errors::DomainError;
use crate::engine::{ProgressCallback, TracingProgress};
use crate::layout::LayoutEngine;
use crate::output::DocumentAssembler;
use crate::ports::{DocumentSinkPort, FrameProviderPort, VideoSourceFactory};

pub trait AppContainer: Send + Sync {
    fn extract_interactor(&self) -> Arc<ExtractInteractor>;
    fn export_interactor(&self) -> Arc<ExportInteractor>;
}

pub struct DefaultAppContainer {
    extract_interactor: Arc<ExtractInteractor>,
    export_interactor: Arc<ExportInteractor>,
}

impl DefaultAppContainer {
    /// Wire the production adapters; documents go to `out_dir`
    pub fn new(config: &AppConfig, out_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let source_factory = default_source_factory();
        let frame_provider = Arc::new(ManifestFrameProvider::new());
        let sink = Arc::new(FsDocumentSink::new(out_dir, config.output.overwrite));
        let progress = Arc::new(TracingProgress);

        Self::with_ports(config, source_factory, frame_provider, sink, progress)
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        config: &AppConfig,
        source_factory: Arc<dyn VideoSourceFactory>,
        frame_provider: Arc<dyn FrameProviderPort>,
        sink: Arc<dyn DocumentSinkPort>,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let extract_interactor = Arc::new(ExtractInteractor::new(
            source_factory,
            frame_provider,
            Arc::clone(&progress),
            ExtractSettings {
                sampler: config.sampling,
                threshold: config.dedup.threshold,
                jpeg_quality: config.encoding.jpeg_quality,
            },
        ));

        let export_interactor = Arc::new(ExportInteractor::new(
            LayoutEngine::new(config.layout),
            DocumentAssembler::new(config.output.naming()),
            sink,
            progress,
        ));

        Ok(Self {
            extract_interactor,
            export_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn extract_interactor(&self) -> Arc<ExtractInteractor> {
        Arc::clone(&self.extract_interactor)
    }

    fn export_interactor(&self) -> Arc<ExportInteractor> {
        Arc::clone(&self.export_interactor)
    }
}

#[cfg(feature = "libav")]
fn default_source_factory() -> Arc<dyn VideoSourceFactory> {
    Arc::new(crate::adapters::LibavSourceFactory::new())
}

#[cfg(not(feature = "libav"))]
fn default_source_factory() -> Arc<dyn VideoSourceFactory> {
    Arc::new(NoVideoBackend)
}

/// Stand-in factory for builds without a decoding backend
#[cfg(not(feature = "libav"))]
struct NoVideoBackend;

#[cfg(not(feature = "libav"))]
#[async_trait::async_trait]
impl VideoSourceFactory for NoVideoBackend {
    async fn open(&self, source: &str) -> Result<Box<dyn crate::ports::VideoSourcePort>, DomainError> {
        Err(DomainError::SourceUnavailable(format!(
            "{}: built without the libav feature, only manifests can be exported",
            source
        )))
    }
}
