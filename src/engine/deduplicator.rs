//! Chain deduplication against the last kept snapshot

use crate::domain::model::{PixelLayout, Snapshot};
use crate::domain::rules::SimilarityRule;

/// Default mean-distance threshold on the 0-441 RGB scale
pub const DEFAULT_THRESHOLD: f64 = 15.0;

/// Why a snapshot was kept or dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupReason {
    /// No reference yet, first snapshot of the run
    First,
    /// Distance reached the threshold
    Distinct,
    /// Dimensions differ from the reference, cannot be compared
    Incomparable,
    /// Distance below the threshold
    NearDuplicate,
}

/// Outcome of comparing one snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupDecision {
    pub is_duplicate: bool,
    pub reason: DedupReason,
    /// Mean pixel distance to the reference, if one was computed
    pub distance: Option<f64>,
}

impl DedupDecision {
    pub fn is_kept(&self) -> bool {
        !self.is_duplicate
    }
}

/// Pixel buffer of the last kept snapshot
struct Reference {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Vec<u8>,
}

/// Order-dependent deduplicator.
///
/// Each snapshot is compared with the last *kept* one only; a kept snapshot
/// becomes the new reference.
pub struct Deduplicator {
    threshold: f64,
    reference: Option<Reference>,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Deduplicator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            reference: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Forget the reference; the next snapshot is kept unconditionally
    pub fn reset(&mut self) {
        self.reference = None;
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Decide whether `snapshot` is kept, updating the reference if so
    pub fn evaluate(&mut self, snapshot: &Snapshot) -> DedupDecision {
        let decision = match &self.reference {
            None => DedupDecision {
                is_duplicate: false,
                reason: DedupReason::First,
                distance: None,
            },
            Some(reference) => self.compare(reference, snapshot),
        };

        if decision.is_kept() {
            self.reference = Some(Reference {
                width: snapshot.width(),
                height: snapshot.height(),
                layout: snapshot.layout(),
                pixels: snapshot.pixels().to_vec(),
            });
        }

        decision
    }

    fn compare(&self, reference: &Reference, snapshot: &Snapshot) -> DedupDecision {
        let distance = if reference.width == snapshot.width() && reference.height == snapshot.height() {
            SimilarityRule::mean_color_distance(
                &reference.pixels,
                reference.layout,
                snapshot.pixels(),
                snapshot.layout(),
            )
        } else {
            None
        };

        match distance {
            None => DedupDecision {
                is_duplicate: false,
                reason: DedupReason::Incomparable,
                distance: None,
            },
            Some(d) if SimilarityRule::is_near_duplicate(d, self.threshold) => DedupDecision {
                is_duplicate: true,
                reason: DedupReason::NearDuplicate,
                distance: Some(d),
            },
            Some(d) => DedupDecision {
                is_duplicate: false,
                reason: DedupReason::Distinct,
                distance: Some(d),
            },
        }
    }
}
