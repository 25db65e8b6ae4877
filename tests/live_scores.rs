//! Feed -> reconcile -> winners, with a scripted feed and a temp pools file.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use squares_scan::error::FeedError;
use squares_scan::pool::{
    resolve_wins, AxisDigits, Cell, Checkpoint, Pool, PoolStore, PoolType, Quarter, ScorePair,
    SquareGrid,
};
use squares_scan::scores::feed::parse_scoreboard;
use squares_scan::scores::{
    apply_live_scores, poll_once, referenced_games, GameRecord, GameStatus, LiveGameStore,
    LivePoller, ScoreFeed,
};

const COLUMNS: [u8; 10] = [3, 7, 0, 9, 1, 5, 2, 8, 4, 6];
const ROWS: [u8; 10] = [8, 1, 4, 0, 6, 2, 9, 5, 7, 3];

struct ScriptedFeed {
    reply: Mutex<Result<Vec<GameRecord>, FeedError>>,
}

impl ScriptedFeed {
    fn new(reply: Result<Vec<GameRecord>, FeedError>) -> Self {
        Self {
            reply: Mutex::new(reply),
        }
    }

    fn set(&self, reply: Result<Vec<GameRecord>, FeedError>) {
        *self.reply.lock().unwrap() = reply;
    }
}

impl ScoreFeed for ScriptedFeed {
    async fn fetch_games(&self, _date: Option<NaiveDate>) -> Result<Vec<GameRecord>, FeedError> {
        self.reply.lock().unwrap().clone()
    }
}

/// Answers slowly, with the away side scoring one more point in the first
/// quarter on every poll.
#[derive(Default)]
struct SlowCountingFeed {
    polls: AtomicU32,
}

impl ScoreFeed for SlowCountingFeed {
    async fn fetch_games(&self, _date: Option<NaiveDate>) -> Result<Vec<GameRecord>, FeedError> {
        tokio::time::sleep(Duration::from_millis(40)).await;
        let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(scoreboard("in", &[n], &[0]))
    }
}

fn scoreboard(state: &str, away: &[u32], home: &[u32]) -> Vec<GameRecord> {
    let lines = |points: &[u32]| {
        points
            .iter()
            .map(|p| format!(r#"{{ "value": {} }}"#, p))
            .collect::<Vec<_>>()
            .join(",")
    };
    let json = format!(
        r#"{{ "events": [{{
            "id": "401",
            "status": {{ "period": {period}, "displayClock": "0:00", "type": {{ "state": "{state}" }} }},
            "competitions": [{{ "competitors": [
                {{ "homeAway": "away", "score": "{away_total}", "team": {{ "abbreviation": "SF" }}, "linescores": [{away_lines}] }},
                {{ "homeAway": "home", "score": "{home_total}", "team": {{ "abbreviation": "KC" }}, "linescores": [{home_lines}] }}
            ] }}]
        }}] }}"#,
        period = away.len(),
        state = state,
        away_total = away.iter().sum::<u32>(),
        home_total = home.iter().sum::<u32>(),
        away_lines = lines(away),
        home_lines = lines(home),
    );
    parse_scoreboard(&json).unwrap()
}

fn linked_pool(pool_type: PoolType) -> Pool {
    let squares = SquareGrid::empty()
        .with_cell(Cell { row: 3, col: 1 }, true)
        .with_cell(Cell { row: 8, col: 1 }, true);
    Pool::new("office", pool_type)
        .with_axes(
            Some(AxisDigits::from_digits(COLUMNS)),
            Some(AxisDigits::from_digits(ROWS)),
        )
        .with_squares(squares)
        .with_game(Some("401".to_string()))
}

#[tokio::test]
async fn final_game_settles_every_quarter() {
    let feed = ScriptedFeed::new(Ok(scoreboard("post", &[7, 3, 0, 7], &[0, 10, 7, 0])));
    let store = LiveGameStore::new();
    let pools = vec![linked_pool(PoolType::Quarters), Pool::new("unlinked", PoolType::Quarters)];

    let found = poll_once(&feed, &store, &referenced_games(&pools)).await.unwrap();
    assert_eq!(found, 1);

    let (pools, changed) = apply_live_scores(&pools, &store);
    assert_eq!(changed, 1);

    let wins = resolve_wins(&pools[0], store.live_score("401"));
    let summary: Vec<(&str, ScorePair, Option<Cell>, bool)> = wins
        .iter()
        .map(|w| (w.label, w.score, w.cell, w.is_mine))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("Q1", ScorePair(7, 0), Some(Cell { row: 3, col: 1 }), true),
            ("Half", ScorePair(10, 10), Some(Cell { row: 3, col: 2 }), false),
            ("Q3", ScorePair(10, 17), Some(Cell { row: 8, col: 2 }), false),
            ("Final", ScorePair(17, 17), Some(Cell { row: 8, col: 1 }), true),
        ]
    );
    assert!(resolve_wins(&pools[1], None).is_empty());
}

#[tokio::test]
async fn every_score_pool_tracks_the_live_score() {
    let feed = ScriptedFeed::new(Ok(scoreboard("in", &[7, 3, 3], &[0, 10, 0])));
    let store = LiveGameStore::new();
    let pools = vec![linked_pool(PoolType::EveryScore)];

    poll_once(&feed, &store, &referenced_games(&pools)).await.unwrap();
    let (pools, _) = apply_live_scores(&pools, &store);

    let wins = resolve_wins(&pools[0], store.live_score("401"));
    let last = wins.last().unwrap();
    assert_eq!(wins.len(), 3);
    assert_eq!(last.checkpoint, Checkpoint::Quarter(Quarter::Q3));
    assert_eq!(last.score, ScorePair(13, 10));

    // Mid-quarter the live score moves ahead of the last checkpoint
    feed.set(Ok(scoreboard("in", &[7, 3, 3, 4], &[0, 10, 0, 0])));
    poll_once(&feed, &store, &referenced_games(&pools)).await.unwrap();
    let live = store.live_score("401");
    assert_eq!(live, Some(ScorePair(17, 10)));

    let half_final = linked_pool(PoolType::HalfFinal).with_scores(pools[0].scores);
    let labels: Vec<&str> = resolve_wins(&half_final, live).iter().map(|w| w.label).collect();
    assert_eq!(labels, vec!["Half"]);

    let wins = resolve_wins(&pools[0], live);
    let current = wins.last().unwrap();
    assert_eq!(current.checkpoint, Checkpoint::Current);
    assert_eq!(current.label, "Current");
    assert_eq!(current.cell, Some(Cell { row: 3, col: 1 }));
    assert!(current.is_mine);
}

#[tokio::test]
async fn offline_feed_keeps_manual_and_last_known_scores() {
    let feed = ScriptedFeed::new(Ok(scoreboard("in", &[7], &[0])));
    let store = LiveGameStore::new();
    let pools = vec![linked_pool(PoolType::Quarters).with_manual_score(Quarter::Q3, Some(ScorePair(14, 3)))];
    let watched: BTreeSet<String> = referenced_games(&pools);

    poll_once(&feed, &store, &watched).await.unwrap();
    let (pools, _) = apply_live_scores(&pools, &store);

    feed.set(Err(FeedError::Unavailable("timeout".to_string())));
    assert!(poll_once(&feed, &store, &watched).await.is_err());
    assert!(!store.is_online());

    let (pools, changed) = apply_live_scores(&pools, &store);
    assert_eq!(changed, 0);
    assert_eq!(pools[0].scores.q1, Some(ScorePair(7, 0)));
    assert_eq!(pools[0].scores.q2, None);
    assert_eq!(pools[0].scores.q3, Some(ScorePair(14, 3)));
}

#[tokio::test]
async fn reconciled_pools_survive_a_save_and_reload() {
    let dir = tempdir().unwrap();
    let pools_file = PoolStore::new(dir.path().join("pools.json"));

    let partial = Pool::new("partial", PoolType::Quarters)
        .with_axes(
            Some(AxisDigits::unknown().with_digit(0, Some(4)).with_digit(9, Some(2))),
            None,
        )
        .with_game(Some("401".to_string()));
    pools_file.save(&[partial]).unwrap();

    let feed = ScriptedFeed::new(Ok(scoreboard("in", &[3, 0], &[7, 7])));
    let store = LiveGameStore::new();
    let loaded = pools_file.load().unwrap();
    poll_once(&feed, &store, &referenced_games(&loaded)).await.unwrap();

    let (updated, changed) = apply_live_scores(&loaded, &store);
    assert_eq!(changed, 1);
    pools_file.save(&updated).unwrap();

    let reloaded = pools_file.load().unwrap();
    assert_eq!(reloaded, updated);
    assert_eq!(reloaded[0].scores.q2, Some(ScorePair(3, 14)));
    assert_eq!(reloaded[0].col_numbers.unwrap().get(5), None);
    assert_eq!(reloaded[0].row_numbers, None);

    // Unresolvable cells still produce records, just without a cell
    let wins = resolve_wins(&reloaded[0], None);
    assert_eq!(wins.len(), 2);
    assert!(wins.iter().all(|w| w.cell.is_none() && !w.is_mine));
    assert!(matches!(wins[0].checkpoint, Checkpoint::Quarter(Quarter::Q1)));
    assert_eq!(GameStatus::InProgress, store.game("401").unwrap().status);
}

#[tokio::test]
async fn reconciling_on_poll_signal_sees_that_poll() {
    let feed = Arc::new(SlowCountingFeed::default());
    let store = LiveGameStore::new();
    let mut pools = vec![linked_pool(PoolType::Quarters)];
    let mut poller = LivePoller::new();
    let mut polled = poller.subscribe();

    poller
        .sync(feed, store.clone(), referenced_games(&pools), Duration::from_millis(300))
        .await
        .unwrap();

    for expected in 1..=3 {
        tokio::time::timeout(Duration::from_secs(5), polled.changed())
            .await
            .unwrap()
            .unwrap();
        let (updated, _) = apply_live_scores(&pools, &store);
        pools = updated;
        assert_eq!(pools[0].scores.q1, Some(ScorePair(expected, 0)));
    }

    poller.stop().await.unwrap();
}
