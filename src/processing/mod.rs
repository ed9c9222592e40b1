pub mod extract;
pub mod image_processor;
pub mod ocr;
pub mod text;

pub use extract::FieldExtractor;
pub use image_processor::ImageProcessor;
pub use ocr::OcrProcessor;
