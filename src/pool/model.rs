//! Pool records and their score fields.
//!
//! Every update helper returns a new value with one field replaced, so a
//! reader holding the previous pool never observes a half-applied change.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::digits::AxisDigits;
use super::squares::SquareGrid;

/// Cumulative score at a moment in the game, serialized `[away, home]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScorePair(pub u32, pub u32);

impl ScorePair {
    pub fn away(&self) -> u32 {
        self.0
    }

    pub fn home(&self) -> u32 {
        self.1
    }

    /// Last digit of each side, the squares-pool lookup key.
    pub fn last_digits(&self) -> (u8, u8) {
        ((self.0 % 10) as u8, (self.1 % 10) as u8)
    }
}

impl fmt::Display for ScorePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// Regular-time scoring checkpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// 1-based period number.
    pub fn number(self) -> usize {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Half",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Final",
        }
    }

    pub fn from_number(n: usize) -> Option<Self> {
        Self::ALL.get(n.checked_sub(1)?).copied()
    }
}

/// End-of-quarter scores for a pool. `None` means the quarter has no known
/// score yet, from any source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterScores {
    #[serde(default, deserialize_with = "deserialize_quarter")]
    pub q1: Option<ScorePair>,
    #[serde(default, deserialize_with = "deserialize_quarter")]
    pub q2: Option<ScorePair>,
    #[serde(default, deserialize_with = "deserialize_quarter")]
    pub q3: Option<ScorePair>,
    #[serde(default, deserialize_with = "deserialize_quarter")]
    pub q4: Option<ScorePair>,
}

/// Accepts `null`, `[null, null]` (both unknown) or `[away, home]`.
/// A half-filled pair is treated as unknown.
fn deserialize_quarter<'de, D>(deserializer: D) -> Result<Option<ScorePair>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<[Option<u32>; 2]> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some([Some(away), Some(home)]) => Some(ScorePair(away, home)),
        _ => None,
    })
}

impl QuarterScores {
    pub fn get(&self, quarter: Quarter) -> Option<ScorePair> {
        match quarter {
            Quarter::Q1 => self.q1,
            Quarter::Q2 => self.q2,
            Quarter::Q3 => self.q3,
            Quarter::Q4 => self.q4,
        }
    }

    pub fn with(&self, quarter: Quarter, pair: Option<ScorePair>) -> Self {
        let mut next = *self;
        match quarter {
            Quarter::Q1 => next.q1 = pair,
            Quarter::Q2 => next.q2 = pair,
            Quarter::Q3 => next.q3 = pair,
            Quarter::Q4 => next.q4 = pair,
        }
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (Quarter, Option<ScorePair>)> + '_ {
        Quarter::ALL.into_iter().map(move |q| (q, self.get(q)))
    }

    pub fn known_count(&self) -> usize {
        self.iter().filter(|(_, pair)| pair.is_some()).count()
    }
}

/// Payout schedule of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    Quarters,
    HalfFinal,
    EveryScore,
    Minute,
}

impl PoolType {
    /// Pool types that also pay on the live, in-progress score.
    pub fn tracks_live_score(self) -> bool {
        matches!(self, PoolType::EveryScore | PoolType::Minute)
    }
}

/// A squares pool as seen by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub pool_type: PoolType,
    #[serde(default)]
    pub col_numbers: Option<AxisDigits>,
    #[serde(default)]
    pub row_numbers: Option<AxisDigits>,
    #[serde(default)]
    pub my_squares: SquareGrid,
    #[serde(default)]
    pub scores: QuarterScores,
    #[serde(default)]
    pub game_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Pool {
    pub fn new(name: &str, pool_type: PoolType) -> Self {
        let created_at = Utc::now();
        Self {
            id: format!("pool-{}", created_at.timestamp_millis()),
            name: name.to_string(),
            pool_type,
            col_numbers: None,
            row_numbers: None,
            my_squares: SquareGrid::empty(),
            scores: QuarterScores::default(),
            game_id: None,
            created_at,
        }
    }

    pub fn with_axes(&self, col_numbers: Option<AxisDigits>, row_numbers: Option<AxisDigits>) -> Self {
        Self {
            col_numbers,
            row_numbers,
            ..self.clone()
        }
    }

    pub fn with_squares(&self, my_squares: SquareGrid) -> Self {
        Self {
            my_squares,
            ..self.clone()
        }
    }

    pub fn with_scores(&self, scores: QuarterScores) -> Self {
        Self {
            scores,
            ..self.clone()
        }
    }

    pub fn with_game(&self, game_id: Option<String>) -> Self {
        Self {
            game_id,
            ..self.clone()
        }
    }

    /// Manual entry for one quarter. Always allowed, even over a live value.
    pub fn with_manual_score(&self, quarter: Quarter, pair: Option<ScorePair>) -> Self {
        self.with_scores(self.scores.with(quarter, pair))
    }
}
