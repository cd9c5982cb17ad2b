// Extract interactor - Orchestrates the sampling use case

use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::domain::model::*;
use crate::engine::{CancellationFlag, Deduplicator, ProgressCallback, ProgressPhase, Sampler, SamplerConfig};
use crate::error::{FrameDeckError, FrameDeckResult};
use crate::ports::*;
use crate::store::{FrameStore, FrameStoreBuilder, Workspace};

/// Tunables of one extraction run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractSettings {
    pub sampler: SamplerConfig,
    pub threshold: f64,
    pub jpeg_quality: u8,
}

/// Frames and counters of a finished run
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub store: FrameStore,
    pub report: ExtractionReport,
}

/// Interactor for the extraction use case
pub struct ExtractInteractor {
    source_factory: Arc<dyn VideoSourceFactory>,
    frame_provider: Arc<dyn FrameProviderPort>,
    progress: Arc<dyn ProgressCallback>,
    settings: ExtractSettings,
}

impl ExtractInteractor {
    /// Create new extract interactor with injected ports
    pub fn new(
        source_factory: Arc<dyn VideoSourceFactory>,
        frame_provider: Arc<dyn FrameProviderPort>,
        progress: Arc<dyn ProgressCallback>,
        settings: ExtractSettings,
    ) -> Self {
        Self {
            source_factory,
            frame_provider,
            progress,
            settings,
        }
    }

    pub fn settings(&self) -> &ExtractSettings {
        &self.settings
    }

    /// Sample and deduplicate a video.
    ///
    /// Any failure, including cancellation, drops the partial run.
    pub async fn extract(&self, source: &str, cancel: &CancellationFlag) -> FrameDeckResult<ExtractOutcome> {
        let span = info_span!("extract", source = %source);
        self.run_extraction(source, cancel).instrument(span).await
    }

    /// Extract a video and install the result as the active run
    pub async fn extract_into(
        &self,
        workspace: &mut Workspace,
        source: &str,
        cancel: &CancellationFlag,
    ) -> FrameDeckResult<ExtractionReport> {
        let outcome = self.extract(source, cancel).await?;
        workspace.replace_run(outcome.store);
        Ok(outcome.report)
    }

    /// Build a run from pre-extracted frames, bypassing local deduplication
    pub async fn import(&self, source: &str) -> FrameDeckResult<FrameStore> {
        let span = info_span!("import", source = %source);
        async {
            let frames = self
                .frame_provider
                .fetch_frames(source)
                .await
                .map_err(FrameDeckError::Sampling)?;
            let name = self
                .frame_provider
                .source_name(source)
                .await
                .map_err(FrameDeckError::Sampling)?;

            let store = FrameStore::from_provided(name, frames).map_err(FrameDeckError::Sampling)?;
            info!("Imported {} provided frames", store.len());
            Ok::<_, FrameDeckError>(store)
        }
        .instrument(span)
        .await
    }

    async fn run_extraction(&self, source: &str, cancel: &CancellationFlag) -> FrameDeckResult<ExtractOutcome> {
        let mut video = self
            .source_factory
            .open(source)
            .await
            .map_err(FrameDeckError::Sampling)?;
        info!("Extracting frames from {}", video.describe());

        let sampler = Sampler::new(self.settings.sampler);
        let mut deduplicator = Deduplicator::new(self.settings.threshold);
        let mut builder = FrameStoreBuilder::with_quality(source, self.settings.jpeg_quality);

        let report = sampler
            .run(
                &mut *video,
                &mut deduplicator,
                &mut builder,
                self.progress.as_ref(),
                cancel,
            )
            .await
            .map_err(FrameDeckError::Sampling)?;

        self.progress.on_start(ProgressPhase::Finalizing, None);
        let store = builder.finish();
        self.progress.on_complete(Some(format!(
            "Extracted {} of {} sampled frames",
            report.kept, report.sampled
        )));

        Ok(ExtractOutcome { store, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::*;
    use crate::engine::NoopProgress;
    use async_trait::async_trait;

    struct StillSource {
        duration: Option<f64>,
        cursor: f64,
    }

    #[async_trait]
    impl VideoSourcePort for StillSource {
        fn describe(&self) -> String {
            "still".to_string()
        }
        async fn duration(&mut self) -> Result<Option<f64>, DomainError> {
            Ok(self.duration)
        }
        async fn seek_to(&mut self, seconds: f64) -> Result<(), DomainError> {
            self.cursor = seconds;
            Ok(())
        }
        async fn capture(&mut self, width: u32, height: u32) -> Result<Snapshot, DomainError> {
            Ok(Snapshot::filled(width, height, [12, 34, 56], self.cursor))
        }
    }

    struct StillFactory;

    #[async_trait]
    impl VideoSourceFactory for StillFactory {
        async fn open(&self, source: &str) -> Result<Box<dyn VideoSourcePort>, DomainError> {
            if source == "missing.mp4" {
                return Err(DomainError::SourceUnavailable(source.to_string()));
            }
            Ok(Box::new(StillSource {
                duration: Some(100.0),
                cursor: 0.0,
            }))
        }
    }

    struct TwoFrames;

    #[async_trait]
    impl FrameProviderPort for TwoFrames {
        async fn fetch_frames(&self, _source: &str) -> Result<Vec<ProvidedFrame>, DomainError> {
            Ok(vec![
                ProvidedFrame {
                    image: EncodedImage::new(ImageFormat::Jpeg, vec![0xff, 0xd8]),
                    timestamp: 0.0,
                },
                ProvidedFrame {
                    image: EncodedImage::new(ImageFormat::Jpeg, vec![0xff, 0xd8]),
                    timestamp: 0.15,
                },
            ])
        }
    }

    fn interactor() -> ExtractInteractor {
        ExtractInteractor::new(
            Arc::new(StillFactory),
            Arc::new(TwoFrames),
            Arc::new(NoopProgress),
            ExtractSettings {
                sampler: SamplerConfig {
                    max_candidates: 50,
                    frame_width: 32,
                    frame_height: 18,
                },
                threshold: 15.0,
                jpeg_quality: 80,
            },
        )
    }

    #[tokio::test]
    async fn test_extract_still_video() {
        let outcome = interactor()
            .extract("lecture.mp4", &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(outcome.report.sampled, 50);
        assert_eq!(outcome.store.len(), 1);
        assert_eq!(outcome.store.source(), "lecture.mp4");
    }

    #[tokio::test]
    async fn test_open_failure_is_labelled_sampling() {
        let err = interactor()
            .extract("missing.mp4", &CancellationFlag::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FrameDeckError::Sampling(DomainError::SourceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_run_leaves_workspace_untouched() {
        let mut workspace = Workspace::new();
        let interactor = interactor();
        interactor
            .extract_into(&mut workspace, "first.mp4", &CancellationFlag::new())
            .await
            .unwrap();

        let cancel = CancellationFlag::new();
        cancel.cancel();
        let result = interactor.extract_into(&mut workspace, "second.mp4", &cancel).await;

        assert!(matches!(result, Err(FrameDeckError::Sampling(DomainError::Cancelled))));
        assert_eq!(workspace.store().source(), "first.mp4");
        assert_eq!(workspace.generation(), 1);
    }

    #[tokio::test]
    async fn test_import_keeps_every_provided_frame() {
        let store = interactor().import("remote").await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.iter().all(|f| f.origin() == FrameOrigin::Provided));
    }
}
