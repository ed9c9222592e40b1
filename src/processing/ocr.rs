use std::io::{Cursor, Write};
use std::path::Path;

use image::GrayImage;
use log::warn;
use tempfile::NamedTempFile;
use tesseract::{PageSegMode, Tesseract};

use crate::processing::ImageProcessor;
use crate::utils::ReconcileError;

// Payment screenshots are busy layouts; no single segmentation mode wins
// consistently, so the original image is retried across several.
const PSM_SWEEP: [(PageSegMode, &str); 5] = [
    (PageSegMode::PsmAuto, "auto"),
    (PageSegMode::PsmSingleColumn, "single-column"),
    (PageSegMode::PsmSingleBlock, "single-block"),
    (PageSegMode::PsmSingleWord, "single-word"),
    (PageSegMode::PsmSparseText, "sparse-text"),
];

/// OcrProcessor drives Tesseract over one screenshot and its preprocessing
/// variants. Individual passes are allowed to fail; whatever text survives
/// is handed back for merging.
pub struct OcrProcessor;

impl OcrProcessor {
    /// Run one Tesseract pass over an image file.
    pub fn recognize<P: AsRef<Path>>(
        image_path: P,
        psm: PageSegMode,
    ) -> Result<String, ReconcileError> {
        let path_str = image_path
            .as_ref()
            .to_str()
            .ok_or_else(|| ReconcileError::Ocr("Could not convert path to string".to_string()))?;

        let mut tess = Tesseract::new(None, Some("eng"))
            .map_err(|e| ReconcileError::Ocr(format!("Failed to initialize Tesseract: {}", e)))?;
        tess.set_page_seg_mode(psm);

        let mut tess = tess
            .set_image(path_str)
            .map_err(|e| ReconcileError::Ocr(format!("Failed to set image: {}", e)))?;

        tess.get_text()
            .map_err(|e| ReconcileError::Ocr(format!("Failed to extract text: {}", e)))
    }

    /// Run one pass over an in-memory grayscale variant via a temp file.
    fn recognize_variant(variant: &GrayImage) -> Result<String, ReconcileError> {
        let mut encoded = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(variant.clone())
            .write_to(&mut encoded, image::ImageOutputFormat::Png)
            .map_err(|e| ReconcileError::Ocr(format!("Failed to encode variant: {}", e)))?;

        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(encoded.get_ref())?;

        Self::recognize(temp_file.path(), PageSegMode::PsmSingleBlock)
    }

    /// Gather every raw text reading obtainable from one screenshot: the
    /// original image, each preprocessing variant, then the original again
    /// under a sweep of segmentation modes. Any single pass failing is
    /// logged and skipped; only the surviving texts are returned.
    pub fn gather_texts<P: AsRef<Path>>(image_path: P) -> Vec<String> {
        let path = image_path.as_ref();
        let mut texts = Vec::new();

        match Self::recognize(path, PageSegMode::PsmSingleBlock) {
            Ok(text) => texts.push(text),
            Err(e) => warn!("OCR failed on original image {}: {}", path.display(), e),
        }

        match ImageProcessor::load_grayscale(path) {
            Ok(gray) => {
                for (i, variant) in ImageProcessor::preprocess_variants(&gray).iter().enumerate() {
                    match Self::recognize_variant(variant) {
                        Ok(text) => texts.push(text),
                        Err(e) => warn!("OCR failed on variant {} of {}: {}", i, path.display(), e),
                    }
                }
            }
            Err(e) => warn!("Preprocessing failed for {}: {}", path.display(), e),
        }

        for (psm, label) in PSM_SWEEP {
            match Self::recognize(path, psm) {
                Ok(text) => texts.push(text),
                Err(e) => warn!("OCR failed at {} psm on {}: {}", label, path.display(), e),
            }
        }

        texts
    }
}
