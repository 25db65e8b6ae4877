//! Score pair -> grid cell mapping and per-checkpoint win evaluation.

use serde::Serialize;

use super::digits::AxisDigits;
use super::model::{Pool, PoolType, Quarter, ScorePair};
use super::squares::Cell;

/// A moment at which a pool pays out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Checkpoint {
    Quarter(Quarter),
    /// The live, in-progress score
    Current,
}

impl Checkpoint {
    pub fn label(self) -> &'static str {
        match self {
            Checkpoint::Quarter(q) => q.label(),
            Checkpoint::Current => "Current",
        }
    }
}

/// Outcome of one checkpoint. Recomputed on every evaluation, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WinRecord {
    pub checkpoint: Checkpoint,
    pub label: &'static str,
    pub score: ScorePair,
    /// Last digit of (away, home)
    pub digits: (u8, u8),
    /// None when either axis lacks the digit
    pub cell: Option<Cell>,
    pub is_mine: bool,
}

/// Finds the cell whose column label is the last digit of `score_a` and
/// whose row label is the last digit of `score_b`.
pub fn resolve_cell(
    col_digits: &AxisDigits,
    row_digits: &AxisDigits,
    score_a: u32,
    score_b: u32,
) -> Option<Cell> {
    let col = col_digits.position_of((score_a % 10) as u8)?;
    let row = row_digits.position_of((score_b % 10) as u8)?;
    Some(Cell { row, col })
}

/// Quarter checkpoints evaluated for a pool type.
pub fn quarter_checkpoints(pool_type: PoolType) -> &'static [Quarter] {
    match pool_type {
        PoolType::HalfFinal => &[Quarter::Q2, Quarter::Q4],
        PoolType::Quarters | PoolType::EveryScore | PoolType::Minute => &Quarter::ALL,
    }
}

/// Evaluates every applicable checkpoint of `pool` that has a score.
///
/// Records come out in checkpoint order. Ownership annotates a record and
/// never filters it. Pool types that track the live score get a trailing
/// `Current` record when `live_score` is given and differs from every
/// listed pair.
pub fn resolve_wins(pool: &Pool, live_score: Option<ScorePair>) -> Vec<WinRecord> {
    let mut scored: Vec<(Checkpoint, ScorePair)> = quarter_checkpoints(pool.pool_type)
        .iter()
        .filter_map(|&q| pool.scores.get(q).map(|pair| (Checkpoint::Quarter(q), pair)))
        .collect();

    if pool.pool_type.tracks_live_score() {
        if let Some(live) = live_score {
            if !scored.iter().any(|(_, pair)| *pair == live) {
                scored.push((Checkpoint::Current, live));
            }
        }
    }

    scored
        .into_iter()
        .map(|(checkpoint, score)| {
            let cell = match (&pool.col_numbers, &pool.row_numbers) {
                (Some(cols), Some(rows)) => resolve_cell(cols, rows, score.away(), score.home()),
                _ => None,
            };
            WinRecord {
                checkpoint,
                label: checkpoint.label(),
                score,
                digits: score.last_digits(),
                cell,
                is_mine: cell.is_some_and(|c| pool.my_squares.is_owned(c)),
            }
        })
        .collect()
}
