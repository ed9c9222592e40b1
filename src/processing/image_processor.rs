use std::path::Path;

use image::GrayImage;
use imageproc::contrast::{adaptive_threshold, otsu_level, threshold};
use imageproc::filter::median_filter;
use log::debug;

use crate::utils::ReconcileError;

/// ImageProcessor produces alternate pixel representations of one payment
/// screenshot. The variants exist purely to feed extra OCR passes; which of
/// them reads best varies wildly with screenshot compression and theme.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Load an image from disk and convert to grayscale, the base
    /// representation for every variant.
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<GrayImage, ReconcileError> {
        let image = image::open(path.as_ref()).map_err(|e| {
            ReconcileError::ImageProcessing(format!(
                "Failed to load {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(image.to_luma8())
    }

    /// Preprocessing variants of a grayscale image: adaptive threshold,
    /// Otsu threshold, median-filter denoise, and the grayscale itself.
    pub fn preprocess_variants(gray: &GrayImage) -> Vec<GrayImage> {
        let mut variants = Vec::with_capacity(4);

        variants.push(adaptive_threshold(gray, 11));

        let level = otsu_level(gray);
        variants.push(threshold(gray, level));

        variants.push(median_filter(gray, 2, 2));

        variants.push(gray.clone());

        debug!("Produced {} preprocessing variants", variants.len());
        variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn checkerboard(size: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([230u8])
            } else {
                Luma([25u8])
            }
        })
    }

    #[test]
    fn test_variants_preserve_dimensions() {
        let gray = checkerboard(32);
        let variants = ImageProcessor::preprocess_variants(&gray);
        assert_eq!(variants.len(), 4);
        for variant in &variants {
            assert_eq!(variant.dimensions(), (32, 32));
        }
    }

    #[test]
    fn test_otsu_variant_is_binary() {
        let gray = checkerboard(32);
        let variants = ImageProcessor::preprocess_variants(&gray);
        assert!(variants[1].pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ImageProcessor::load_grayscale("/nonexistent/shot.png");
        assert!(result.is_err());
    }
}
