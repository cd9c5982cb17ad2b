// Domain models - Core types and data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// Byte layout of a snapshot's pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelLayout {
    /// 3 bytes per pixel
    Rgb,
    /// 4 bytes per pixel, alpha last
    Rgba,
}

impl PixelLayout {
    /// Bytes per pixel
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

/// Transient raster captured at one timeline position
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Vec<u8>,
    timestamp: f64,
}

impl Snapshot {
    /// Create a snapshot, validating buffer size and timestamp
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        pixels: Vec<u8>,
        timestamp: f64,
    ) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidArgument(format!(
                "Snapshot dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * layout.channels();
        if pixels.len() != expected {
            return Err(DomainError::InvalidArgument(format!(
                "Pixel buffer holds {} bytes, expected {} for {}x{} {:?}",
                pixels.len(),
                expected,
                width,
                height,
                layout
            )));
        }
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(DomainError::InvalidArgument(format!(
                "Snapshot timestamp must be a non-negative number of seconds, got {}",
                timestamp
            )));
        }

        Ok(Self {
            width,
            height,
            layout,
            pixels,
            timestamp,
        })
    }

    /// Snapshot where every pixel has the same RGB color
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], timestamp: f64) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            layout: PixelLayout::Rgb,
            pixels,
            timestamp: timestamp.max(0.0),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Capture position in seconds
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixel buffer with any alpha channel dropped
    pub fn to_rgb(&self) -> Vec<u8> {
        match self.layout {
            PixelLayout::Rgb => self.pixels.clone(),
            PixelLayout::Rgba => {
                let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
                for chunk in self.pixels.chunks_exact(4) {
                    rgb.extend_from_slice(&chunk[..3]);
                }
                rgb
            }
        }
    }
}

/// Run-scoped, zero-based frame identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameId(pub usize);

impl FrameId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

impl FromStr for FrameId {
    type Err = DomainError;

    /// Accepts either `frame-{n}` or a bare index
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("frame-").unwrap_or(trimmed);
        digits
            .parse::<usize>()
            .map(FrameId)
            .map_err(|_| DomainError::InvalidArgument(format!("Invalid frame id: {}", s)))
    }
}

/// Encoding of a frame payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    /// Guess the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

/// Compressed image payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Where a frame came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameOrigin {
    /// Produced by the local sampler and deduplicator
    Sampled,
    /// Supplied by an external frame provider
    Provided,
}

/// Kept, immutable unit of one extraction run
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    id: FrameId,
    image: EncodedImage,
    timestamp: f64,
    similarity: Option<f64>,
    origin: FrameOrigin,
}

impl Frame {
    pub(crate) fn new(
        id: FrameId,
        image: EncodedImage,
        timestamp: f64,
        similarity: Option<f64>,
        origin: FrameOrigin,
    ) -> Self {
        Self {
            id,
            image,
            timestamp,
            similarity,
            origin,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    /// Capture position in seconds
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Mean pixel distance to the previously kept frame (diagnostic)
    pub fn similarity(&self) -> Option<f64> {
        self.similarity
    }

    pub fn origin(&self) -> FrameOrigin {
        self.origin
    }
}

/// Frame handed over by an external provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidedFrame {
    pub image: EncodedImage,
    pub timestamp: f64,
}

/// Operator-chosen set of frame ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<FrameId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: FrameId) {
        self.ids.insert(id);
    }

    pub fn deselect(&mut self, id: FrameId) {
        self.ids.remove(&id);
    }

    /// Flip the selection state of one id
    pub fn toggle(&mut self, id: FrameId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FrameId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<FrameId> for Selection {
    fn from_iter<I: IntoIterator<Item = FrameId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Fixed page size and margin, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4_portrait()
    }
}

impl PageGeometry {
    /// 210 x 297 mm with a 20 mm margin
    pub fn a4_portrait() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
        }
    }

    /// Create geometry, rejecting sizes that leave no content box
    pub fn new(page_width_mm: f64, page_height_mm: f64, margin_mm: f64) -> Result<Self, DomainError> {
        let geometry = Self {
            page_width_mm,
            page_height_mm,
            margin_mm,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let values = [self.page_width_mm, self.page_height_mm, self.margin_mm];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(DomainError::InvalidArgument(
                "Page dimensions and margin must be finite and non-negative".to_string(),
            ));
        }
        if self.content_width_mm() <= 0.0 || self.max_image_height_mm() <= 0.0 {
            return Err(DomainError::InvalidArgument(format!(
                "Margin {}mm leaves no content box on a {}x{}mm page",
                self.margin_mm, self.page_width_mm, self.page_height_mm
            )));
        }
        Ok(())
    }

    /// Page width minus both side margins
    pub fn content_width_mm(&self) -> f64 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    /// Page height minus top, bottom and caption margins
    pub fn max_image_height_mm(&self) -> f64 {
        self.page_height_mm - 3.0 * self.margin_mm
    }

    pub fn center_x_mm(&self) -> f64 {
        self.page_width_mm / 2.0
    }
}

/// Rectangle on a page, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl Rect {
    pub fn bottom_mm(&self) -> f64 {
        self.y_mm + self.height_mm
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// One horizontally centred line of text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub font_size_pt: f64,
    pub weight: FontWeight,
    pub center_x_mm: f64,
    /// Baseline distance from the top edge of the page
    pub baseline_y_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitlePage {
    pub title: String,
    pub generated_on: NaiveDate,
    pub frame_count: usize,
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramePage {
    pub frame_id: FrameId,
    /// 1-based position within the document
    pub ordinal: usize,
    pub total: usize,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub placement: Rect,
    pub caption: TextLine,
}

/// Positional page sequence of one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLayout {
    pub geometry: PageGeometry,
    pub title_page: TitlePage,
    pub frame_pages: Vec<FramePage>,
}

impl DocumentLayout {
    /// Title page plus one page per frame
    pub fn page_count(&self) -> usize {
        1 + self.frame_pages.len()
    }
}

/// Summary of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionReport {
    /// Snapshots captured and compared
    pub sampled: usize,
    pub kept: usize,
    pub discarded: usize,
    /// Sample points skipped after a decode failure
    pub skipped: usize,
    /// Sampling stride in seconds
    pub interval: u64,
    pub duration: Option<f64>,
}
