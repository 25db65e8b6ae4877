//! OCR plumbing: engine contract, Tesseract backend, raster preparation
//! and region-scoped symbol extraction.

pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::{Layout, OcrEngine, OcrToken, TesseractEngine};
pub use extract::{extract_symbols, RecognizedSymbol, RegionScan, DIGIT_WHITELIST};
pub use setup::TesseractPaths;
