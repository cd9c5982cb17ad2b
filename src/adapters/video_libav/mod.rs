//! Video source adapter using libav bindings
//!
//! Seeks with the demuxer, decodes forward to the requested position and
//! scales the decoded picture to packed RGB24.

use async_trait::async_trait;
use ffmpeg_next::{
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{self, context::Input, Pixel},
    frame::Video as VideoFrame,
    media,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    Rational,
};
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::ports::*;

/// Units of `Input::duration` and container-level seek timestamps
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Decoded frames this close before the target count as "at" the target
const POSITION_TOLERANCE: f64 = 0.001;

/// One opened video file
pub struct LibavVideoSource {
    descriptor: String,
    input: Input,
    stream_index: usize,
    time_base: Rational,
    decoder: VideoDecoder,
    current: Option<VideoFrame>,
    position: f64,
}

impl LibavVideoSource {
    /// Open a local file or any URL libav can demux
    pub fn open(source: &str) -> Result<Self, DomainError> {
        ffmpeg_next::init()
            .map_err(|e| DomainError::SourceUnavailable(format!("FFmpeg initialization failed: {}", e)))?;

        let input = format::input(&source)
            .map_err(|e| DomainError::SourceUnavailable(format!("Failed to open {}: {}", source, e)))?;

        let stream = input
            .streams()
            .best(media::Type::Video)
            .ok_or_else(|| DomainError::SourceUnavailable(format!("No video stream in {}", source)))?;
        let stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|e| {
                DomainError::SourceUnavailable(format!("Failed to create video decoder: {}", e))
            })?;

        info!(
            "Opened {} (stream {}, {}x{}, {:?})",
            source,
            stream_index,
            decoder.width(),
            decoder.height(),
            decoder.format()
        );

        Ok(Self {
            descriptor: source.to_string(),
            input,
            stream_index,
            time_base,
            decoder,
            current: None,
            position: 0.0,
        })
    }

    fn container_duration(&self) -> Option<f64> {
        let container = self.input.duration();
        if container > 0 {
            return Some(container as f64 / AV_TIME_BASE);
        }

        let stream = self.input.stream(self.stream_index)?;
        let duration = stream.duration();
        (duration > 0).then(|| duration as f64 * f64::from(self.time_base))
    }

    fn frame_seconds(&self, frame: &VideoFrame) -> Option<f64> {
        frame
            .timestamp()
            .or_else(|| frame.pts())
            .map(|pts| pts as f64 * f64::from(self.time_base))
    }

    fn decode_failure(&self, position: f64, reason: impl std::fmt::Display) -> DomainError {
        DomainError::DecodeFailure {
            position,
            reason: format!("{}: {}", self.descriptor, reason),
        }
    }

    /// Decode forward from the last seek until a frame at or past `target`
    fn decode_until(&mut self, target: f64) -> Result<VideoFrame, DomainError> {
        let mut decoded = VideoFrame::empty();
        let mut last: Option<VideoFrame> = None;

        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }
            self.decoder
                .send_packet(&packet)
                .map_err(|e| DomainError::DecodeFailure {
                    position: target,
                    reason: e.to_string(),
                })?;

            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let seconds = decoded
                    .timestamp()
                    .or_else(|| decoded.pts())
                    .map(|pts| pts as f64 * f64::from(self.time_base));
                if seconds.map_or(false, |s| s + POSITION_TOLERANCE >= target) {
                    return Ok(decoded);
                }
                last = Some(decoded.clone());
            }
        }

        // End of stream: drain buffered pictures
        self.decoder
            .send_eof()
            .map_err(|e| self.decode_failure(target, e))?;
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            if self
                .frame_seconds(&decoded)
                .map_or(false, |s| s + POSITION_TOLERANCE >= target)
            {
                return Ok(decoded);
            }
            last = Some(decoded.clone());
        }

        last.ok_or_else(|| self.decode_failure(target, "no picture decoded"))
    }
}

#[async_trait]
impl VideoSourcePort for LibavVideoSource {
    fn describe(&self) -> String {
        self.descriptor.clone()
    }

    async fn duration(&mut self) -> Result<Option<f64>, DomainError> {
        Ok(self.container_duration())
    }

    async fn seek_to(&mut self, seconds: f64) -> Result<(), DomainError> {
        self.current = None;
        let timestamp = (seconds * AV_TIME_BASE) as i64;
        self.input
            .seek(timestamp, ..timestamp)
            .map_err(|e| self.decode_failure(seconds, format!("seek failed: {}", e)))?;
        self.decoder.flush();

        let frame = self.decode_until(seconds)?;
        debug!(
            "Decoded frame at {:.3}s for target {:.3}s",
            self.frame_seconds(&frame).unwrap_or(seconds),
            seconds
        );
        self.current = Some(frame);
        self.position = seconds;
        Ok(())
    }

    async fn capture(&mut self, width: u32, height: u32) -> Result<Snapshot, DomainError> {
        let frame = self
            .current
            .as_ref()
            .ok_or_else(|| self.decode_failure(self.position, "capture before a successful seek"))?;

        let mut scaler = ScalingContext::get(
            frame.format(),
            frame.width(),
            frame.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| self.decode_failure(self.position, format!("scaler setup failed: {}", e)))?;

        let mut rgb = VideoFrame::empty();
        scaler
            .run(frame, &mut rgb)
            .map_err(|e| self.decode_failure(self.position, format!("scaling failed: {}", e)))?;

        let row_bytes = width as usize * 3;
        let stride = rgb.stride(0);
        let data = rgb.data(0);
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            pixels.extend_from_slice(&data[start..start + row_bytes]);
        }

        Snapshot::new(width, height, PixelLayout::Rgb, pixels, self.position)
    }
}

/// Opens `LibavVideoSource`s
#[derive(Debug, Default, Clone)]
pub struct LibavSourceFactory;

impl LibavSourceFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VideoSourceFactory for LibavSourceFactory {
    async fn open(&self, source: &str) -> Result<Box<dyn VideoSourcePort>, DomainError> {
        Ok(Box::new(LibavVideoSource::open(source)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_source_unavailable() {
        let result = LibavSourceFactory::new()
            .open("/definitely/not/here/video.mp4")
            .await;
        assert!(matches!(result, Err(DomainError::SourceUnavailable(_))));
    }
}
