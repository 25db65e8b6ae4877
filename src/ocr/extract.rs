use std::sync::Arc;

use image::RgbaImage;
use log::debug;

use super::engine::{Layout, OcrEngine};
use super::preprocess::{crop_region, prepare_for_ocr};
use crate::error::RecognitionError;
use crate::geometry::{BBox, Rect};

/// Characters the engine may report when reading axis labels.
pub const DIGIT_WHITELIST: &str = "0123456789";

/// One character reported by the OCR engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedSymbol {
    pub text: String,
    /// Engine certainty, 0-100
    pub confidence: f32,
    pub bbox: BBox,
}

impl RecognizedSymbol {
    /// The symbol's digit, if its text is exactly one ASCII digit.
    pub fn digit(&self) -> Option<u8> {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_digit(10).map(|d| d as u8),
            _ => None,
        }
    }
}

/// Symbols recognized inside one region, with boxes still in the region's
/// local pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionScan {
    /// Pixel origin of the region within the full image
    pub origin: (f32, f32),
    pub symbols: Vec<RecognizedSymbol>,
}

impl RegionScan {
    /// Translates every box into full-image coordinates by adding the
    /// region origin. Required before symbols from different regions meet.
    pub fn into_image_space(self) -> Vec<RecognizedSymbol> {
        let (dx, dy) = self.origin;
        self.symbols
            .into_iter()
            .map(|s| RecognizedSymbol {
                bbox: s.bbox.translate(dx, dy),
                ..s
            })
            .collect()
    }
}

/// Runs the engine over one native-pixel region of `image`.
///
/// The region is clamped into the image and rasterized into its own bitmap
/// (at least 1x1). Recognition runs on a blocking worker so the caller's
/// executor stays responsive. Engine failures propagate; an engine that
/// simply sees nothing yields an empty scan.
pub async fn extract_symbols<E: OcrEngine>(
    engine: Arc<E>,
    image: &RgbaImage,
    region: &Rect,
    layout: Layout,
    binarize_threshold: Option<u8>,
) -> Result<RegionScan, RecognitionError> {
    let (cropped, (x0, y0)) = crop_region(image, region);
    let prepared = prepare_for_ocr(&cropped, binarize_threshold);

    debug!(
        "OCR region at ({}, {}) size {}x{} ({:?})",
        x0,
        y0,
        prepared.width(),
        prepared.height(),
        layout
    );

    let tokens = tokio::task::spawn_blocking(move || {
        engine.recognize(&prepared, DIGIT_WHITELIST, layout)
    })
    .await
    .map_err(|e| RecognitionError::Unavailable(format!("OCR worker failed: {}", e)))??;

    let symbols = tokens
        .into_iter()
        .map(|t| RecognizedSymbol {
            text: t.text,
            confidence: t.confidence,
            bbox: t.bbox,
        })
        .collect();

    Ok(RegionScan {
        origin: (x0 as f32, y0 as f32),
        symbols,
    })
}
