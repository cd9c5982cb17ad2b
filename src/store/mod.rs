//! Frame store - ordered, identified frames of one extraction run

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::*;

/// JPEG quality used for sampled frames (0.8 on a 0-1 scale)
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Append-only writer for one run.
///
/// Dropping a builder discards everything pushed to it; only `finish` hands
/// frames over.
pub struct FrameStoreBuilder {
    source: String,
    jpeg_quality: u8,
    frames: Vec<Frame>,
}

impl FrameStoreBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_quality(source, DEFAULT_JPEG_QUALITY)
    }

    pub fn with_quality(source: impl Into<String>, jpeg_quality: u8) -> Self {
        Self {
            source: source.into(),
            jpeg_quality: jpeg_quality.clamp(1, 100),
            frames: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn next_id(&self) -> FrameId {
        FrameId(self.frames.len())
    }

    /// Capture order: timestamps never decrease within a run
    fn check_order(&self, timestamp: f64) -> Result<(), DomainError> {
        match self.frames.last() {
            Some(last) if timestamp < last.timestamp() => Err(DomainError::InvalidArgument(format!(
                "Frame at {}s arrived after frame at {}s",
                timestamp,
                last.timestamp()
            ))),
            _ => Ok(()),
        }
    }

    /// Encode a kept snapshot and append it
    pub fn push_snapshot(
        &mut self,
        snapshot: &Snapshot,
        similarity: Option<f64>,
    ) -> Result<FrameId, DomainError> {
        self.check_order(snapshot.timestamp())?;

        let image = encode_jpeg(snapshot, self.jpeg_quality)?;
        let id = self.next_id();
        debug!(
            "Stored {} at {:.2}s ({} bytes)",
            id,
            snapshot.timestamp(),
            image.len()
        );
        self.frames.push(Frame::new(
            id,
            image,
            snapshot.timestamp(),
            similarity,
            FrameOrigin::Sampled,
        ));
        Ok(id)
    }

    /// Append a frame supplied by an external provider, as-is
    pub fn push_provided(&mut self, frame: ProvidedFrame) -> Result<FrameId, DomainError> {
        if !frame.timestamp.is_finite() || frame.timestamp < 0.0 {
            return Err(DomainError::InvalidArgument(format!(
                "Provided frame has invalid timestamp {}",
                frame.timestamp
            )));
        }
        self.check_order(frame.timestamp)?;

        let id = self.next_id();
        self.frames.push(Frame::new(
            id,
            frame.image,
            frame.timestamp,
            None,
            FrameOrigin::Provided,
        ));
        Ok(id)
    }

    /// Freeze the run
    pub fn finish(self) -> FrameStore {
        FrameStore {
            source: self.source,
            frames: self.frames,
        }
    }
}

/// Immutable frames of one finished run, in capture order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStore {
    source: String,
    frames: Vec<Frame>,
}

impl FrameStore {
    /// Build a store from provider output, bypassing local deduplication
    pub fn from_provided(
        source: impl Into<String>,
        frames: Vec<ProvidedFrame>,
    ) -> Result<Self, DomainError> {
        let mut builder = FrameStoreBuilder::new(source);
        for frame in frames {
            builder.push_provided(frame)?;
        }
        Ok(builder.finish())
    }

    /// Source descriptor of the run
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Constant-time lookup; ids are positions in the run
    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get(id.index())
    }

    /// Selection covering every frame
    pub fn select_all(&self) -> Selection {
        self.frames.iter().map(Frame::id).collect()
    }

    /// Selected frames in capture order; unknown ids are skipped
    pub fn select(&self, selection: &Selection) -> Vec<&Frame> {
        for id in selection.iter() {
            if self.get(id).is_none() {
                warn!("Ignoring {}: not part of the current run", id);
            }
        }
        self.frames
            .iter()
            .filter(|frame| selection.contains(frame.id()))
            .collect()
    }
}

/// Holder of the active run
#[derive(Debug, Default)]
pub struct Workspace {
    store: FrameStore,
    generation: u64,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    /// Number of runs installed so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the active run in one step; returns the new generation
    pub fn replace_run(&mut self, store: FrameStore) -> u64 {
        let previous = std::mem::replace(&mut self.store, store);
        self.generation += 1;
        debug!(
            "Run {} installed ({} frames, replaced {})",
            self.generation,
            self.store.len(),
            previous.len()
        );
        self.generation
    }
}

/// Encode a snapshot as JPEG, dropping alpha
pub fn encode_jpeg(snapshot: &Snapshot, quality: u8) -> Result<EncodedImage, DomainError> {
    let rgb = snapshot.to_rgb();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(&rgb, snapshot.width(), snapshot.height(), ColorType::Rgb8)
        .map_err(|e| DomainError::EncodeFailure(e.to_string()))?;
    Ok(EncodedImage::new(ImageFormat::Jpeg, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provided(t: f64) -> ProvidedFrame {
        ProvidedFrame {
            image: EncodedImage::new(ImageFormat::Png, vec![1, 2, 3]),
            timestamp: t,
        }
    }

    #[test]
    fn test_ids_are_sequential_from_zero() {
        let mut builder = FrameStoreBuilder::new("clip.mp4");
        let a = builder.push_snapshot(&Snapshot::filled(8, 8, [0, 0, 0], 0.0), None).unwrap();
        let b = builder
            .push_snapshot(&Snapshot::filled(8, 8, [255, 0, 0], 2.0), Some(120.0))
            .unwrap();
        assert_eq!((a, b), (FrameId(0), FrameId(1)));

        let store = builder.finish();
        assert_eq!(store.source(), "clip.mp4");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(FrameId(1)).unwrap().timestamp(), 2.0);
        assert_eq!(store.get(FrameId(1)).unwrap().similarity(), Some(120.0));
        assert_eq!(store.get(FrameId(0)).unwrap().origin(), FrameOrigin::Sampled);
        assert!(store.get(FrameId(2)).is_none());
    }

    #[test]
    fn test_sampled_frames_are_jpeg_encoded() {
        let mut builder = FrameStoreBuilder::new("clip.mp4");
        builder.push_snapshot(&Snapshot::filled(32, 18, [10, 200, 30], 0.0), None).unwrap();
        let store = builder.finish();
        let image = store.frames()[0].image();
        assert_eq!(image.format(), ImageFormat::Jpeg);

        let decoded = image::load_from_memory(image.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 18));
    }

    #[test]
    fn test_out_of_order_snapshot_is_rejected() {
        let mut builder = FrameStoreBuilder::new("clip.mp4");
        builder.push_snapshot(&Snapshot::filled(4, 4, [0, 0, 0], 5.0), None).unwrap();
        let result = builder.push_snapshot(&Snapshot::filled(4, 4, [0, 0, 0], 1.0), None);
        assert!(result.is_err());
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_provided_frames_share_the_id_sequence() {
        let store = FrameStore::from_provided("https://example.com/v", vec![provided(0.15), provided(0.3)]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.frames()[1].id(), FrameId(1));
        assert_eq!(store.frames()[1].origin(), FrameOrigin::Provided);
        assert_eq!(store.frames()[1].similarity(), None);
    }

    #[test]
    fn test_provided_frame_with_bad_timestamp_fails() {
        let result = FrameStore::from_provided("remote", vec![provided(f64::NAN)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_provided_frames_out_of_order_are_rejected() {
        let result = FrameStore::from_provided("remote", vec![provided(5.0), provided(1.0)]);
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));

        let mut builder = FrameStoreBuilder::new("remote");
        builder.push_provided(provided(2.0)).unwrap();
        builder.push_provided(provided(2.0)).unwrap();
        assert!(builder.push_provided(provided(1.9)).is_err());
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_select_returns_capture_order_and_skips_unknown() {
        let store = FrameStore::from_provided("remote", (0..5).map(|t| provided(t as f64)).collect()).unwrap();
        let selection: Selection = [FrameId(3), FrameId(1), FrameId(42)].into_iter().collect();
        let ids: Vec<FrameId> = store.select(&selection).iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![FrameId(1), FrameId(3)]);

        assert_eq!(store.select(&store.select_all()).len(), 5);
        assert!(store.select(&Selection::new()).is_empty());
    }

    #[test]
    fn test_replace_run_swaps_whole_store() {
        let mut workspace = Workspace::new();
        assert_eq!(workspace.generation(), 0);
        assert!(workspace.store().is_empty());

        let first = FrameStore::from_provided("a", vec![provided(0.0), provided(1.0), provided(2.0)]).unwrap();
        assert_eq!(workspace.replace_run(first), 1);
        assert_eq!(workspace.store().len(), 3);

        let second = FrameStore::from_provided("b", vec![provided(0.0)]).unwrap();
        assert_eq!(workspace.replace_run(second), 2);
        assert_eq!(workspace.store().len(), 1);
        assert_eq!(workspace.store().source(), "b");
    }

    #[test]
    fn test_dropped_builder_leaves_workspace_untouched() {
        let mut workspace = Workspace::new();
        workspace.replace_run(FrameStore::from_provided("a", vec![provided(0.0)]).unwrap());

        let mut partial = FrameStoreBuilder::new("b");
        partial.push_provided(provided(0.0)).unwrap();
        drop(partial);

        assert_eq!(workspace.store().source(), "a");
        assert_eq!(workspace.generation(), 1);
    }
}
