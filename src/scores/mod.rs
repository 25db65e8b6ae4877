//! Score sources and their reconciliation into pools.
//!
//! This module provides:
//! - Strict feed records and the HTTP scoreboard client (`feed`)
//! - Cumulative quarter checkpoints from linescores (`derive_checkpoints`)
//! - The non-destructive live/manual merge (`reconcile`)
//! - The owned live-game store and its poller (`live`)

pub mod checkpoints;
pub mod feed;
pub mod live;
pub mod reconcile;

pub use checkpoints::derive_checkpoints;
pub use feed::{GameRecord, GameStatus, HttpScoreFeed, Linescores, ScoreFeed, TeamScore};
pub use live::{poll_once, referenced_games, LiveGameStore, LivePoller};
pub use reconcile::{apply_live_scores, reconcile, reconcile_pool};
