//! PDF rendering of a laid-out document

use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::*;

/// Resolution used to size embedded rasters before scaling
const IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const MM_PER_PT: f64 = 0.352_778;

/// Mean Helvetica advance as a fraction of the font size
const REGULAR_ADVANCE: f64 = 0.5;
const BOLD_ADVANCE: f64 = 0.55;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, DomainError> {
        Ok(Self {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
        })
    }

    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Writes a `DocumentLayout` into PDF bytes with printpdf
pub struct PdfWriter {
    document_title: String,
}

impl PdfWriter {
    pub fn new(document_title: impl Into<String>) -> Self {
        Self {
            document_title: document_title.into(),
        }
    }

    /// Render the title page and then one page per frame.
    ///
    /// `frames` must match `layout.frame_pages` one to one.
    pub fn render(&self, layout: &DocumentLayout, frames: &[&Frame]) -> Result<Vec<u8>, DomainError> {
        self.render_with_progress(layout, frames, &mut |_, _| {})
    }

    /// Render, calling `on_page(done, total)` after each frame page
    pub fn render_with_progress(
        &self,
        layout: &DocumentLayout,
        frames: &[&Frame],
        on_page: &mut dyn FnMut(usize, usize),
    ) -> Result<Vec<u8>, DomainError> {
        let geometry = &layout.geometry;
        let page_width = Mm(geometry.page_width_mm as f32);
        let page_height = Mm(geometry.page_height_mm as f32);

        let (doc, title_page, title_layer) =
            PdfDocument::new(self.document_title.as_str(), page_width, page_height, "Title");
        let fonts = Fonts::load(&doc)?;

        let layer = doc.get_page(title_page).get_layer(title_layer);
        for line in &layout.title_page.lines {
            write_line(&layer, line, geometry, &fonts);
        }

        let total = layout.frame_pages.len();
        for (index, (page, frame)) in layout.frame_pages.iter().zip(frames).enumerate() {
            let (page_index, layer_index) =
                doc.add_page(page_width, page_height, format!("Frame {}", page.ordinal));
            let layer = doc.get_page(page_index).get_layer(layer_index);

            place_image(&layer, page, frame, geometry)?;
            write_line(&layer, &page.caption, geometry, &fonts);
            debug!("Rendered page {} for {}", page.ordinal + 1, frame.id());
            on_page(index + 1, total);
        }

        doc.save_to_bytes().map_err(pdf_error)
    }
}

fn place_image(
    layer: &PdfLayerReference,
    page: &FramePage,
    frame: &Frame,
    geometry: &PageGeometry,
) -> Result<(), DomainError> {
    let decoded = image::load_from_memory(frame.image().bytes()).map_err(|e| {
        DomainError::ImageDecodeFailure {
            frame: frame.id().to_string(),
            reason: e.to_string(),
        }
    })?;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let rect = page.placement;
    let natural_width_mm = rgb.width() as f64 / IMAGE_DPI * MM_PER_INCH;
    let natural_height_mm = rgb.height() as f64 / IMAGE_DPI * MM_PER_INCH;

    // PDF origin is bottom-left
    let bottom_y_mm = geometry.page_height_mm - rect.y_mm - rect.height_mm;

    Image::from_dynamic_image(&rgb).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(rect.x_mm as f32)),
            translate_y: Some(Mm(bottom_y_mm as f32)),
            scale_x: Some((rect.width_mm / natural_width_mm) as f32),
            scale_y: Some((rect.height_mm / natural_height_mm) as f32),
            dpi: Some(IMAGE_DPI as f32),
            ..Default::default()
        },
    );
    Ok(())
}

fn write_line(layer: &PdfLayerReference, line: &TextLine, geometry: &PageGeometry, fonts: &Fonts) {
    let left_mm = (line.center_x_mm - text_width_mm(line) / 2.0).max(0.0);
    let baseline_mm = geometry.page_height_mm - line.baseline_y_mm;
    layer.use_text(
        line.text.as_str(),
        line.font_size_pt as f32,
        Mm(left_mm as f32),
        Mm(baseline_mm as f32),
        fonts.get(line.weight),
    );
}

/// Approximate rendered width; built-in fonts carry no metrics here
pub fn text_width_mm(line: &TextLine) -> f64 {
    let advance = match line.weight {
        FontWeight::Regular => REGULAR_ADVANCE,
        FontWeight::Bold => BOLD_ADVANCE,
    };
    line.text.chars().count() as f64 * line.font_size_pt * advance * MM_PER_PT
}

fn pdf_error<E: std::fmt::Debug>(err: E) -> DomainError {
    DomainError::EncodeFailure(format!("PDF rendering failed: {:?}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_scales_with_size_and_weight() {
        let line = TextLine {
            text: "abcd".to_string(),
            font_size_pt: 10.0,
            weight: FontWeight::Regular,
            center_x_mm: 105.0,
            baseline_y_mm: 50.0,
        };
        let regular = text_width_mm(&line);
        assert!((regular - 4.0 * 10.0 * 0.5 * MM_PER_PT).abs() < 1e-9);

        let bold = TextLine {
            weight: FontWeight::Bold,
            ..line
        };
        assert!(text_width_mm(&bold) > regular);
    }
}
