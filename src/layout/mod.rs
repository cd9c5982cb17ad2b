//! Page layout for frame documents
//!
//! Layout is a pure function of the ordered frames, the title, the injected
//! date and the page geometry. Rendering happens later in `output`.

use chrono::NaiveDate;
use std::io::Cursor;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::ScalingRule;
use crate::utils::time::format_timestamp;

pub const TITLE_HEADING: &str = "Video Frame Export";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const HEADING_SIZE_PT: f64 = 24.0;
const TITLE_SIZE_PT: f64 = 16.0;
const DETAIL_SIZE_PT: f64 = 12.0;
const CAPTION_SIZE_PT: f64 = 10.0;

const HEADING_Y_MM: f64 = 50.0;
const TITLE_Y_MM: f64 = 70.0;
const DATE_Y_MM: f64 = 90.0;
const COUNT_Y_MM: f64 = 105.0;

/// Gap between the image bottom edge and the caption baseline
pub const CAPTION_OFFSET_MM: f64 = 15.0;

/// Computes page geometry for a document
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    geometry: PageGeometry,
}

impl LayoutEngine {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Lay out a title page followed by one page per frame, in input order.
    ///
    /// Fails on the first frame whose image cannot be decoded; no partial
    /// layout is returned.
    pub fn layout(
        &self,
        frames: &[&Frame],
        title: &str,
        generated_on: NaiveDate,
    ) -> Result<DocumentLayout, DomainError> {
        self.layout_with_progress(frames, title, generated_on, &mut |_, _| {})
    }

    /// Same as [`layout`](Self::layout), calling `on_page(done, total)` after
    /// each frame page
    pub fn layout_with_progress(
        &self,
        frames: &[&Frame],
        title: &str,
        generated_on: NaiveDate,
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<DocumentLayout, DomainError> {
        self.geometry.validate()?;

        let total = frames.len();
        let mut frame_pages = Vec::with_capacity(total);
        for (index, frame) in frames.iter().enumerate() {
            frame_pages.push(self.frame_page(frame, index + 1, total)?);
            on_page(index + 1, total);
        }

        debug!("Laid out {} frame pages for '{}'", frame_pages.len(), title);

        Ok(DocumentLayout {
            geometry: self.geometry,
            title_page: self.title_page(title, generated_on, total),
            frame_pages,
        })
    }

    fn title_page(&self, title: &str, generated_on: NaiveDate, frame_count: usize) -> TitlePage {
        let lines = vec![
            self.centered(TITLE_HEADING.to_string(), HEADING_SIZE_PT, FontWeight::Bold, HEADING_Y_MM),
            self.centered(title.to_string(), TITLE_SIZE_PT, FontWeight::Regular, TITLE_Y_MM),
            self.centered(
                format!("Generated on {}", generated_on.format(DATE_FORMAT)),
                DETAIL_SIZE_PT,
                FontWeight::Regular,
                DATE_Y_MM,
            ),
            self.centered(
                format!("{} frames selected", frame_count),
                DETAIL_SIZE_PT,
                FontWeight::Regular,
                COUNT_Y_MM,
            ),
        ];

        TitlePage {
            title: title.to_string(),
            generated_on,
            frame_count,
            lines,
        }
    }

    fn frame_page(&self, frame: &Frame, ordinal: usize, total: usize) -> Result<FramePage, DomainError> {
        let (pixel_width, pixel_height) =
            image_dimensions(frame.image()).map_err(|reason| DomainError::ImageDecodeFailure {
                frame: frame.id().to_string(),
                reason,
            })?;

        let placement = ScalingRule::fit(pixel_width, pixel_height, &self.geometry)?;
        let caption = self.centered(
            caption_text(ordinal, total, frame.timestamp()),
            CAPTION_SIZE_PT,
            FontWeight::Regular,
            placement.bottom_mm() + CAPTION_OFFSET_MM,
        );

        Ok(FramePage {
            frame_id: frame.id(),
            ordinal,
            total,
            pixel_width,
            pixel_height,
            placement,
            caption,
        })
    }

    fn centered(&self, text: String, font_size_pt: f64, weight: FontWeight, baseline_y_mm: f64) -> TextLine {
        TextLine {
            text,
            font_size_pt,
            weight,
            center_x_mm: self.geometry.center_x_mm(),
            baseline_y_mm,
        }
    }
}

/// `Frame {ordinal} of {total} • Timestamp: {m:ss}`
pub fn caption_text(ordinal: usize, total: usize, timestamp: f64) -> String {
    format!(
        "Frame {} of {} \u{2022} Timestamp: {}",
        ordinal,
        total,
        format_timestamp(timestamp)
    )
}

/// Natural pixel size read from the image header
pub fn image_dimensions(image: &EncodedImage) -> Result<(u32, u32), String> {
    if image.is_empty() {
        return Err("empty image payload".to_string());
    }
    image::io::Reader::new(Cursor::new(image.bytes()))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FrameStore;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

    fn png(width: u32, height: u32) -> EncodedImage {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 120, 200])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png).unwrap();
        EncodedImage::new(ImageFormat::Png, bytes)
    }

    fn store(images: Vec<(EncodedImage, f64)>) -> FrameStore {
        FrameStore::from_provided(
            "test.mp4",
            images
                .into_iter()
                .map(|(image, timestamp)| ProvidedFrame { image, timestamp })
                .collect(),
        )
        .unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_wide_image_fills_content_width() {
        let store = store(vec![(png(200, 100), 125.7)]);
        let frames: Vec<&Frame> = store.iter().collect();
        let layout = LayoutEngine::default().layout(&frames, "Lecture", date()).unwrap();

        assert_eq!(layout.page_count(), 2);
        let page = &layout.frame_pages[0];
        assert_eq!((page.pixel_width, page.pixel_height), (200, 100));
        assert!((page.placement.width_mm - 170.0).abs() < 1e-9);
        assert!((page.placement.height_mm - 85.0).abs() < 1e-9);
        assert!((page.placement.x_mm - 20.0).abs() < 1e-9);
        assert_eq!(page.placement.y_mm, 20.0);
        assert_eq!(page.caption.text, "Frame 1 of 1 \u{2022} Timestamp: 2:05");
        assert!((page.caption.baseline_y_mm - 120.0).abs() < 1e-9);
        assert_eq!(page.caption.font_size_pt, 10.0);
    }

    #[test]
    fn test_tall_image_is_capped_at_max_height() {
        let store = store(vec![(png(100, 200), 0.0)]);
        let frames: Vec<&Frame> = store.iter().collect();
        let layout = LayoutEngine::default().layout(&frames, "Lecture", date()).unwrap();

        let rect = layout.frame_pages[0].placement;
        assert!((rect.height_mm - 237.0).abs() < 1e-9);
        assert!((rect.width_mm - 118.5).abs() < 1e-9);
        assert!((rect.x_mm - 45.75).abs() < 1e-9);
    }

    #[test]
    fn test_title_page_lines() {
        let store = store(vec![(png(4, 4), 0.0), (png(4, 4), 2.0), (png(4, 4), 4.0)]);
        let frames: Vec<&Frame> = store.iter().collect();
        let layout = LayoutEngine::default().layout(&frames, "Quarterly review", date()).unwrap();

        let texts: Vec<&str> = layout.title_page.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Video Frame Export",
                "Quarterly review",
                "Generated on 2024-03-09",
                "3 frames selected"
            ]
        );
        let heading = &layout.title_page.lines[0];
        assert_eq!(heading.weight, FontWeight::Bold);
        assert_eq!(heading.font_size_pt, 24.0);
        assert!(layout.title_page.lines.iter().all(|l| l.center_x_mm == 105.0));

        let ordinals: Vec<usize> = layout.frame_pages.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert!(layout.frame_pages.iter().all(|p| p.total == 3));
    }

    #[test]
    fn test_empty_selection_yields_title_page_only() {
        let layout = LayoutEngine::default().layout(&[], "Nothing", date()).unwrap();
        assert_eq!(layout.page_count(), 1);
        assert!(layout.frame_pages.is_empty());
        assert_eq!(layout.title_page.lines[3].text, "0 frames selected");
    }

    #[test]
    fn test_undecodable_frame_aborts_layout() {
        let broken = EncodedImage::new(ImageFormat::Jpeg, b"not an image".to_vec());
        let store = store(vec![(png(10, 10), 0.0), (broken, 1.0)]);
        let frames: Vec<&Frame> = store.iter().collect();

        let err = LayoutEngine::default().layout(&frames, "Broken", date()).unwrap_err();
        match err {
            DomainError::ImageDecodeFailure { frame, .. } => assert_eq!(frame, "frame-1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let store = store(vec![(png(64, 36), 0.0), (png(36, 64), 61.0)]);
        let frames: Vec<&Frame> = store.iter().collect();
        let engine = LayoutEngine::default();

        let first = engine.layout(&frames, "Same", date()).unwrap();
        let second = engine.layout(&frames, "Same", date()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_caption_text_formats_timestamp() {
        assert_eq!(caption_text(2, 7, 59.9), "Frame 2 of 7 \u{2022} Timestamp: 0:59");
    }
}
