//! Progress reporting and cooperative cancellation

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress phases
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Walking the timeline and comparing snapshots
    Sampling,
    /// Freezing the frame store after sampling
    Finalizing,
    /// Computing page geometry
    Layout,
    /// Rendering and delivering the document
    Writing,
}

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts
    fn on_start(&self, phase: ProgressPhase, total_work: Option<u64>);

    /// Called after each unit of work
    fn on_progress(&self, phase: ProgressPhase, completed: u64, total: Option<u64>, message: Option<String>);

    /// Called when the operation completes successfully
    fn on_complete(&self, message: Option<String>);

    /// Called when the operation is cancelled
    fn on_cancel(&self);
}

/// Callback that ignores every event
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_start(&self, _phase: ProgressPhase, _total_work: Option<u64>) {}
    fn on_progress(&self, _phase: ProgressPhase, _completed: u64, _total: Option<u64>, _message: Option<String>) {}
    fn on_complete(&self, _message: Option<String>) {}
    fn on_cancel(&self) {}
}

/// Callback that reports through `tracing`
pub struct TracingProgress;

impl ProgressCallback for TracingProgress {
    fn on_start(&self, phase: ProgressPhase, total_work: Option<u64>) {
        match total_work {
            Some(total) => tracing::info!("Starting {:?} ({} steps)", phase, total),
            None => tracing::info!("Starting {:?}", phase),
        }
    }

    fn on_progress(&self, phase: ProgressPhase, completed: u64, total: Option<u64>, message: Option<String>) {
        let percent = percent(completed, total);
        match message {
            Some(message) => tracing::debug!("{:?} {:>3.0}% {}", phase, percent, message),
            None => tracing::debug!("{:?} {:>3.0}%", phase, percent),
        }
    }

    fn on_complete(&self, message: Option<String>) {
        tracing::info!("{}", message.unwrap_or_else(|| "Completed".to_string()));
    }

    fn on_cancel(&self) {
        tracing::warn!("Operation cancelled");
    }
}

/// Completion percentage, 0 when the total is unknown or zero
pub fn percent(completed: u64, total: Option<u64>) -> f64 {
    match total {
        Some(total) if total > 0 => (completed as f64 / total as f64 * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// Shared flag checked between sampler iterations
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(5, Some(10)), 50.0);
        assert_eq!(percent(20, Some(10)), 100.0);
        assert_eq!(percent(3, Some(0)), 0.0);
        assert_eq!(percent(3, None), 0.0);
    }

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let flag = CancellationFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_cancelled());
        flag.cancel();
        assert!(observer.is_cancelled());
    }
}
