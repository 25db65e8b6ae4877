//! Pool records, their immutable grid values, manual input handling,
//! win evaluation and the JSON store.

pub mod digits;
pub mod input;
pub mod model;
pub mod squares;
pub mod store;
pub mod winners;

pub use digits::{AxisDigits, AXIS_LEN};
pub use input::{sanitize_digit_input, sanitize_score_input};
pub use model::{Pool, PoolType, Quarter, QuarterScores, ScorePair};
pub use squares::{Cell, SquareGrid};
pub use store::PoolStore;
pub use winners::{resolve_cell, resolve_wins, Checkpoint, WinRecord};
