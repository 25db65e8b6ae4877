//! Automatic proposal of the grid rectangle from a raw photo.
//!
//! The result is a starting point for the user to adjust, not a
//! guaranteed localization. It either comes back with a usable rectangle
//! in the sheet's aspect ratio or fails with a reason.

use std::sync::Arc;

use image::RgbaImage;
use log::info;

use super::axis::confident_digits;
use crate::config::AppConfig;
use crate::config::DetectionConfig;
use crate::error::DetectError;
use crate::geometry::{scale_rect, Rect, Size};
use crate::ocr::preprocess::downsample_to_long_edge;
use crate::ocr::{extract_symbols, Layout, OcrEngine, RecognizedSymbol};

/// Derives the grid rectangle, in working-image pixels, from digit symbols
/// recognized over the whole working image.
pub fn bounds_from_symbols(
    symbols: &[RecognizedSymbol],
    working: Size,
    settings: &DetectionConfig,
    min_confidence: f32,
) -> Result<Rect, DetectError> {
    let digits: Vec<&RecognizedSymbol> = confident_digits(symbols, min_confidence)
        .map(|(_, s)| s)
        .collect();

    if digits.len() < settings.min_symbols {
        return Err(DetectError::GridNotFound("Not enough digits detected".to_string()));
    }

    let top_limit = working.height * settings.margin_fraction;
    let left_limit = working.width * settings.margin_fraction;
    let top: Vec<&&RecognizedSymbol> = digits.iter().filter(|s| s.bbox.y1 < top_limit).collect();
    let left: Vec<&&RecognizedSymbol> = digits.iter().filter(|s| s.bbox.x1 < left_limit).collect();

    info!(
        "Grid detection: {} digits, {} near top, {} near left",
        digits.len(),
        top.len(),
        left.len()
    );

    if top.len() < settings.min_edge_symbols || left.len() < settings.min_edge_symbols {
        return Err(DetectError::GridNotFound(
            "Could not locate top/left digits".to_string(),
        ));
    }

    let min_x = top.iter().map(|s| s.bbox.x0).fold(f32::INFINITY, f32::min);
    let max_x = top.iter().map(|s| s.bbox.x1).fold(f32::NEG_INFINITY, f32::max);
    let min_y = left.iter().map(|s| s.bbox.y0).fold(f32::INFINITY, f32::min);
    let max_y = left.iter().map(|s| s.bbox.y1).fold(f32::NEG_INFINITY, f32::max);

    let mut width = (max_x - min_x).max(settings.min_extent);
    let mut height = (max_y - min_y).max(settings.min_extent);

    // Grow whichever side is short of the sheet ratio
    let wanted_height = width * settings.sheet_aspect;
    if height < wanted_height {
        height = wanted_height;
    } else {
        width = height / settings.sheet_aspect;
    }

    let x = min_x.min(working.width - width).max(0.0);
    let y = min_y.min(working.height - height).max(0.0);

    Ok(Rect::new(x, y, width, height))
}

/// Proposes the grid rectangle for `photo`, in display coordinates.
///
/// The photo is downsampled to the configured working resolution and
/// scanned once as a whole.
pub async fn detect_grid<E: OcrEngine>(
    engine: Arc<E>,
    photo: &RgbaImage,
    display_size: Size,
    config: &AppConfig,
) -> Result<Rect, DetectError> {
    let (working, scale) = downsample_to_long_edge(photo, config.detection.working_long_edge);
    let working_size = Size::from_dimensions(working.dimensions());

    info!(
        "Detecting grid on {}x{} working image (scale {:.3})",
        working_size.width, working_size.height, scale
    );

    let full = Rect::new(0.0, 0.0, working_size.width, working_size.height);
    let scan = extract_symbols(
        engine,
        &working,
        &full,
        Layout::FullImage,
        config.ocr.binarize_threshold,
    )
    .await?;
    let symbols = scan.into_image_space();

    let working_rect = bounds_from_symbols(
        &symbols,
        working_size,
        &config.detection,
        config.ocr.min_confidence,
    )?;
    let display_rect = scale_rect(&working_rect, working_size, display_size);

    if display_rect.is_empty() {
        return Err(DetectError::GridNotFound("Display size is empty".to_string()));
    }

    info!(
        "Proposed grid at ({:.1}, {:.1}) {:.1}x{:.1} display",
        display_rect.x, display_rect.y, display_rect.w, display_rect.h
    );
    Ok(display_rect)
}
