//! Grid localization and axis digit reading.
//!
//! This module provides:
//! - Bucketing of edge symbols into ten ordinal slots (`resolve_axis`)
//! - Automatic grid rectangle proposal from a raw photo (`detect_grid`)
//! - The two-strip axis reading pass over an aligned overlay (`read_axes`)

pub mod axis;
pub mod bounds;
pub mod reader;

pub use axis::{resolve_axis, Axis};
pub use bounds::{bounds_from_symbols, detect_grid};
pub use reader::{axis_strips, read_axes, AxisReadout};
