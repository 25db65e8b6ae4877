//! Coordinate conversion utilities.
//!
//! Converts rectangles between the on-screen display space the overlay is
//! dragged in and the photo's native pixel space. Scaling is applied per
//! axis, since the display and native aspect ratios can differ slightly
//! due to rounding.

use super::rect::{Rect, Size};

/// Maps a rectangle from display coordinates into native photo pixels.
///
/// The result is clamped so it fits inside `[0, native_size]`: `x, y` are
/// floored at 0 and `w, h` are trimmed so the far edges do not pass the
/// native extent. Degenerate input yields a zero-size rectangle.
pub fn to_native_rect(display_rect: &Rect, display_size: Size, native_size: Size) -> Rect {
    scale_and_clamp(display_rect, display_size, native_size)
}

/// Maps a rectangle from native photo pixels back into display coordinates.
pub fn to_display_rect(native_rect: &Rect, native_size: Size, display_size: Size) -> Rect {
    scale_and_clamp(native_rect, native_size, display_size)
}

/// Scales a rectangle between two spaces without clamping, preserving its
/// proportions when both spaces share an aspect ratio.
pub fn scale_rect(rect: &Rect, from: Size, to: Size) -> Rect {
    if from.is_empty() || to.is_empty() {
        return Rect::default();
    }

    let sx = to.width / from.width;
    let sy = to.height / from.height;
    Rect::new(rect.x * sx, rect.y * sy, rect.w * sx, rect.h * sy)
}

fn scale_and_clamp(rect: &Rect, from: Size, to: Size) -> Rect {
    if from.is_empty() || to.is_empty() {
        return Rect::default();
    }

    let sx = to.width / from.width;
    let sy = to.height / from.height;

    let x = (rect.x * sx).clamp(0.0, to.width);
    let y = (rect.y * sy).clamp(0.0, to.height);
    let w = (rect.w * sx).max(0.0).min(to.width - x);
    let h = (rect.h * sy).max(0.0).min(to.height - y);

    Rect { x, y, w, h }
}
