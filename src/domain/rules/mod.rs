// Domain rules - Sampling, similarity and scaling policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Largest possible mean distance between two 8-bit RGB pixels, sqrt(3 * 255^2)
pub const MAX_COLOR_DISTANCE: f64 = 441.672_955_930_063_7;

/// Timeline stride rules
pub struct SamplingRule;

impl SamplingRule {
    /// Whole-second stride: `max(1, floor(duration / max_candidates))`
    pub fn interval(duration: f64, max_candidates: usize) -> u64 {
        if !duration.is_finite() || duration <= 0.0 || max_candidates == 0 {
            return 1;
        }
        let stride = (duration / max_candidates as f64).floor();
        if stride < 1.0 {
            1
        } else {
            stride as u64
        }
    }

    /// Normalize a reported duration; unknown, non-finite and non-positive values become `None`
    pub fn usable_duration(duration: Option<f64>) -> Option<f64> {
        duration.filter(|d| d.is_finite() && *d > 0.0)
    }
}

/// Pixel-distance similarity between two rasters
pub struct SimilarityRule;

impl SimilarityRule {
    /// Mean per-pixel Euclidean RGB distance between two buffers.
    ///
    /// Alpha is ignored. Returns `None` when the buffers do not describe the
    /// same number of pixels or are empty.
    pub fn mean_color_distance(
        a: &[u8],
        a_layout: PixelLayout,
        b: &[u8],
        b_layout: PixelLayout,
    ) -> Option<f64> {
        let a_step = a_layout.channels();
        let b_step = b_layout.channels();
        let pixels = a.len() / a_step;
        if pixels == 0 || a.len() % a_step != 0 || b.len() % b_step != 0 || b.len() / b_step != pixels {
            return None;
        }

        let total: f64 = a
            .chunks_exact(a_step)
            .zip(b.chunks_exact(b_step))
            .map(|(p, q)| {
                let dr = p[0] as f64 - q[0] as f64;
                let dg = p[1] as f64 - q[1] as f64;
                let db = p[2] as f64 - q[2] as f64;
                (dr * dr + dg * dg + db * db).sqrt()
            })
            .sum();

        Some(total / pixels as f64)
    }

    /// Distance between two snapshots of identical dimensions
    pub fn snapshot_distance(a: &Snapshot, b: &Snapshot) -> Option<f64> {
        if a.width() != b.width() || a.height() != b.height() {
            return None;
        }
        Self::mean_color_distance(a.pixels(), a.layout(), b.pixels(), b.layout())
    }

    /// Near-duplicate test: strictly below the threshold
    pub fn is_near_duplicate(distance: f64, threshold: f64) -> bool {
        distance < threshold
    }
}

/// Aspect-preserving placement of an image inside the content box
pub struct ScalingRule;

impl ScalingRule {
    /// Fit an image of the given pixel size onto a page.
    ///
    /// The image takes the full content width unless that makes it taller than
    /// the maximum image height, in which case it is scaled down to that height.
    /// It is centred horizontally with its top edge on the margin.
    pub fn fit(
        pixel_width: u32,
        pixel_height: u32,
        geometry: &PageGeometry,
    ) -> Result<Rect, DomainError> {
        if pixel_width == 0 || pixel_height == 0 {
            return Err(DomainError::InvalidArgument(format!(
                "Cannot place an image of {}x{} pixels",
                pixel_width, pixel_height
            )));
        }

        let aspect_ratio = pixel_width as f64 / pixel_height as f64;
        let (width, height) =
            Self::fit_aspect(aspect_ratio, geometry.content_width_mm(), geometry.max_image_height_mm());

        Ok(Rect {
            x_mm: (geometry.page_width_mm - width) / 2.0,
            y_mm: geometry.margin_mm,
            width_mm: width,
            height_mm: height,
        })
    }

    /// Width and height for an aspect ratio within the given bounds
    pub fn fit_aspect(aspect_ratio: f64, content_width: f64, max_height: f64) -> (f64, f64) {
        let mut width = content_width;
        let mut height = width / aspect_ratio;

        if height > max_height {
            height = max_height;
            width = height * aspect_ratio;
        }

        (width, height)
    }
}
