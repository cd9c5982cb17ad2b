//! Core extraction engine module

pub mod deduplicator;
pub mod progress;
pub mod sampler;

pub use deduplicator::{DedupDecision, DedupReason, Deduplicator, DEFAULT_THRESHOLD};
pub use progress::{CancellationFlag, NoopProgress, ProgressCallback, ProgressPhase, TracingProgress};
pub use sampler::{Sampler, SamplerConfig};
