//! Squares pool scanner
//!
//! Reads the axis digits printed along a photographed 10x10 squares grid,
//! evaluates which cell wins at each scoring checkpoint, and keeps pool
//! scores in step with a live scoreboard feed.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod ocr;
pub mod paths;
pub mod pool;
pub mod scores;
