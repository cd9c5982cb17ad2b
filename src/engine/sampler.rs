//! Timeline sampler - seek, capture and deduplicate one video

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::ExtractionReport;
use crate::engine::deduplicator::Deduplicator;
use crate::engine::progress::{CancellationFlag, ProgressCallback, ProgressPhase};
use crate::planner::{SamplingPlan, DEFAULT_MAX_CANDIDATES};
use crate::ports::VideoSourcePort;
use crate::store::FrameStoreBuilder;
use crate::utils::time::format_elapsed;

/// Sampler configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Maximum number of candidate snapshots
    pub max_candidates: usize,
    /// Snapshot raster width in pixels
    pub frame_width: u32,
    /// Snapshot raster height in pixels
    pub frame_height: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            frame_width: 640,
            frame_height: 360,
        }
    }
}

/// Walks a sampling plan over one source.
///
/// Each position is sought and captured before the next one is issued, so
/// frames reach the deduplicator in timeline order.
pub struct Sampler {
    config: SamplerConfig,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample `source`, pushing kept snapshots into `builder`.
    ///
    /// Decode failures at single positions are skipped. Any other error, and
    /// cancellation, aborts the run; the caller then drops the builder.
    pub async fn run(
        &self,
        source: &mut dyn VideoSourcePort,
        deduplicator: &mut Deduplicator,
        builder: &mut FrameStoreBuilder,
        progress: &dyn ProgressCallback,
        cancel: &CancellationFlag,
    ) -> Result<ExtractionReport, DomainError> {
        let started = Instant::now();
        let duration = source.duration().await?;
        let plan = SamplingPlan::new(duration, self.config.max_candidates);
        let positions = plan.positions();

        info!(
            "Sampling {} positions every {}s (duration {})",
            positions.len(),
            plan.interval,
            plan.duration
                .map(|d| format!("{:.2}s", d))
                .unwrap_or_else(|| "unknown".to_string())
        );

        let mut report = ExtractionReport {
            interval: plan.interval,
            duration: plan.duration,
            ..ExtractionReport::default()
        };

        deduplicator.reset();
        let total = positions.len() as u64;
        progress.on_start(ProgressPhase::Sampling, Some(total));

        for (index, position) in positions.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Sampling cancelled before {:.2}s", position);
                progress.on_cancel();
                return Err(DomainError::Cancelled);
            }

            match self.sample_at(source, position).await {
                Ok(snapshot) => {
                    report.sampled += 1;
                    let decision = deduplicator.evaluate(&snapshot);
                    if decision.is_duplicate {
                        report.discarded += 1;
                        debug!(
                            "Discarded {:.2}s as near-duplicate (distance {:.2})",
                            position,
                            decision.distance.unwrap_or_default()
                        );
                    } else {
                        let id = builder.push_snapshot(&snapshot, decision.distance)?;
                        report.kept += 1;
                        debug!("Kept {:.2}s as {} ({:?})", position, id, decision.reason);
                    }
                }
                Err(e) if e.is_recoverable() => {
                    report.skipped += 1;
                    warn!("Skipping sample at {:.2}s: {}", position, e);
                }
                Err(e) => return Err(e),
            }

            progress.on_progress(
                ProgressPhase::Sampling,
                index as u64 + 1,
                Some(total),
                Some(format!("{} kept", report.kept)),
            );
        }

        info!(
            "Sampled {} snapshots, kept {}, discarded {}, skipped {} in {}",
            report.sampled,
            report.kept,
            report.discarded,
            report.skipped,
            format_elapsed(started.elapsed())
        );
        Ok(report)
    }

    async fn sample_at(
        &self,
        source: &mut dyn VideoSourcePort,
        position: f64,
    ) -> Result<crate::domain::model::Snapshot, DomainError> {
        source.seek_to(position).await?;
        let snapshot = source
            .capture(self.config.frame_width, self.config.frame_height)
            .await?;
        if snapshot.timestamp() != position {
            debug!(
                "Source reported {:.3}s for requested {:.3}s",
                snapshot.timestamp(),
                position
            );
        }
        Ok(snapshot)
    }
}
