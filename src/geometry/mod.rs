//! Rectangles and the display <-> native pixel mapping.

pub mod coords;
pub mod rect;

pub use coords::{scale_rect, to_display_rect, to_native_rect};
pub use rect::{BBox, Rect, Size};
