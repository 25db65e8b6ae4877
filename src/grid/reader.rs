//! Reads both axes of a grid the user has aligned an overlay onto.

use std::sync::Arc;

use image::RgbaImage;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::axis::{resolve_axis, Axis};
use crate::config::AppConfig;
use crate::error::ReadError;
use crate::geometry::{to_native_rect, Rect, Size};
use crate::ocr::{extract_symbols, Layout, OcrEngine};
use crate::pool::{AxisDigits, AXIS_LEN};

/// Digits read from the column (top) and row (left) edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisReadout {
    pub columns: AxisDigits,
    pub rows: AxisDigits,
}

impl AxisReadout {
    /// Combines the readout with the pool's previous axes. An axis that
    /// resolved nothing keeps the previous configuration; any other axis
    /// replaces it whole.
    pub fn merge_into(
        &self,
        previous_columns: Option<AxisDigits>,
        previous_rows: Option<AxisDigits>,
    ) -> (Option<AxisDigits>, Option<AxisDigits>) {
        let pick = |read: AxisDigits, previous: Option<AxisDigits>| {
            if read.is_empty() { previous } else { Some(read) }
        };
        (pick(self.columns, previous_columns), pick(self.rows, previous_rows))
    }
}

/// Bands just outside the grid where the labels are printed: the top strip
/// above the grid's columns and the left strip beside its rows, each
/// `strip_cells` cells thick and clipped at the image edge.
pub fn axis_strips(grid: &Rect, strip_cells: f32) -> (Rect, Rect) {
    let cell_w = grid.w / AXIS_LEN as f32;
    let cell_h = grid.h / AXIS_LEN as f32;

    let top_y = (grid.y - cell_h * strip_cells).max(0.0);
    let top = Rect::new(grid.x, top_y, grid.w, grid.y - top_y);

    let left_x = (grid.x - cell_w * strip_cells).max(0.0);
    let left = Rect::new(left_x, grid.y, grid.x - left_x, grid.h);

    (top, left)
}

/// Reads the column digits from the top strip, then the row digits from the
/// left strip, of the grid under `overlay` (display coordinates).
///
/// `cancel` is checked after each strip so an abandoned request never hands
/// back digits for an overlay that has since moved.
pub async fn read_axes<E: OcrEngine>(
    engine: Arc<E>,
    photo: &RgbaImage,
    overlay: &Rect,
    display_size: Size,
    config: &AppConfig,
    cancel: &CancellationToken,
) -> Result<AxisReadout, ReadError> {
    let native_size = Size::from_dimensions(photo.dimensions());
    let grid = to_native_rect(overlay, display_size, native_size);
    let (top_strip, left_strip) = axis_strips(&grid, config.detection.strip_cells);
    let binarize = config.ocr.binarize_threshold;

    info!(
        "Reading axes for grid ({:.0}, {:.0}) {:.0}x{:.0} px",
        grid.x, grid.y, grid.w, grid.h
    );

    let top = extract_symbols(engine.clone(), photo, &top_strip, Layout::Strip, binarize).await?;
    if cancel.is_cancelled() {
        warn!("Axis reading cancelled after top strip");
        return Err(ReadError::Cancelled);
    }

    let left = extract_symbols(engine, photo, &left_strip, Layout::Strip, binarize).await?;
    if cancel.is_cancelled() {
        warn!("Axis reading cancelled after left strip");
        return Err(ReadError::Cancelled);
    }

    let min_confidence = config.ocr.min_confidence;
    let columns = resolve_axis(&top.into_image_space(), Axis::X, &grid, min_confidence);
    let rows = resolve_axis(&left.into_image_space(), Axis::Y, &grid, min_confidence);

    info!("Columns: [{}]  Rows: [{}]", columns, rows);
    Ok(AxisReadout { columns, rows })
}
