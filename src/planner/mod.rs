//! Timeline sampling plan

use serde::Serialize;

use crate::domain::rules::SamplingRule;

/// Default cap on candidate snapshots per run
pub const DEFAULT_MAX_CANDIDATES: usize = 50;

/// Sample positions for one run over a video timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingPlan {
    /// Usable duration in seconds, `None` when unknown or non-positive
    pub duration: Option<f64>,
    /// Stride in whole seconds
    pub interval: u64,
    /// Upper bound on the number of positions
    pub max_candidates: usize,
}

impl SamplingPlan {
    /// Plan a run for a reported duration and candidate cap
    pub fn new(duration: Option<f64>, max_candidates: usize) -> Self {
        let duration = SamplingRule::usable_duration(duration);
        let interval = duration
            .map(|d| SamplingRule::interval(d, max_candidates))
            .unwrap_or(1);

        Self {
            duration,
            interval,
            max_candidates,
        }
    }

    /// Positions `0, interval, 2 * interval, ...` strictly below the duration,
    /// at most `max_candidates` of them
    pub fn positions(&self) -> Vec<f64> {
        let Some(duration) = self.duration else {
            return Vec::new();
        };

        let stride = self.interval as f64;
        let count = Self::count(duration, stride, self.max_candidates);
        (0..count).map(|k| k as f64 * stride).collect()
    }

    /// Number of planned positions
    pub fn len(&self) -> usize {
        self.duration
            .map_or(0, |d| Self::count(d, self.interval as f64, self.max_candidates))
    }

    /// Positions `k * stride < duration`, i.e. `ceil(duration / stride)`, capped
    fn count(duration: f64, stride: f64, max_candidates: usize) -> usize {
        let reachable = (duration / stride).ceil();
        if reachable >= max_candidates as f64 {
            max_candidates
        } else {
            reachable as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
