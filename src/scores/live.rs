//! Live game store and the feed poller that keeps it fresh.
//!
//! The store is owned by whoever starts polling and handed to the
//! reconciler explicitly. The poller runs only while at least one pool
//! references a game and restarts when that set changes.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::feed::{GameRecord, ScoreFeed};
use crate::error::FeedError;
use crate::pool::{Pool, ScorePair};

#[derive(Debug, Default)]
struct StoreState {
    games: HashMap<String, GameRecord>,
    online: bool,
    last_updated: Option<DateTime<Utc>>,
}

/// Last-known feed games keyed by feed id. Cloning shares the same store.
#[derive(Debug, Clone, Default)]
pub struct LiveGameStore {
    state: Arc<RwLock<StoreState>>,
}

impl LiveGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the given games and marks the feed online.
    pub fn update_games(&self, games: Vec<GameRecord>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        for game in games {
            state.games.insert(game.id.clone(), game);
        }
        state.online = true;
        state.last_updated = Some(Utc::now());
    }

    /// Drops every game not in `watched`.
    pub fn retain_games(&self, watched: &BTreeSet<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.games.retain(|id, _| watched.contains(id));
    }

    /// Records a failed poll. Known games are kept as last-known values.
    pub fn mark_unavailable(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.online = false;
    }

    pub fn game(&self, id: &str) -> Option<GameRecord> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.games.get(id).cloned()
    }

    /// The instantaneous score of a started game.
    pub fn live_score(&self, id: &str) -> Option<ScorePair> {
        self.game(id).and_then(|g| g.current_score())
    }

    pub fn is_online(&self) -> bool {
        self.state.read().unwrap_or_else(|e| e.into_inner()).online
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).last_updated
    }
}

/// Feed ids referenced by any pool.
pub fn referenced_games(pools: &[Pool]) -> BTreeSet<String> {
    pools.iter().filter_map(|p| p.game_id.clone()).collect()
}

/// Fetches the scoreboard once and stores the referenced games.
///
/// Games no longer referenced are evicted first. On failure the store is
/// marked offline and keeps its last-known games. Returns how many
/// referenced games the feed reported.
pub async fn poll_once<F: ScoreFeed>(
    feed: &F,
    store: &LiveGameStore,
    games: &BTreeSet<String>,
) -> Result<usize, FeedError> {
    store.retain_games(games);
    match feed.fetch_games(None).await {
        Ok(all) => {
            let wanted: Vec<GameRecord> = all.into_iter().filter(|g| games.contains(&g.id)).collect();
            let found = wanted.len();
            store.update_games(wanted);
            Ok(found)
        }
        Err(e) => {
            store.mark_unavailable();
            Err(e)
        }
    }
}

async fn poll_loop<F: ScoreFeed>(
    feed: Arc<F>,
    store: LiveGameStore,
    games: BTreeSet<String>,
    interval: Duration,
    polls: Arc<watch::Sender<u64>>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match poll_once(feed.as_ref(), &store, &games).await {
                    Ok(found) => info!("Polled feed: {} of {} watched game(s) reported", found, games.len()),
                    Err(err) => warn!("Feed poll failed, keeping last-known scores: {}", err),
                }
                polls.send_modify(|n| *n += 1);
            }
            _ = cancel_token.cancelled() => {
                info!("Feed polling shutting down");
                break;
            }
        }
    }
}

/// Owns the background polling task.
///
/// Every finished poll, successful or not, bumps a counter that
/// [`LivePoller::subscribe`] receivers observe. The counter survives
/// restarts.
pub struct LivePoller {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    watched: BTreeSet<String>,
    polls: Arc<watch::Sender<u64>>,
}

impl Default for LivePoller {
    fn default() -> Self {
        Self::new()
    }
}

impl LivePoller {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            watched: BTreeSet::new(),
            polls: Arc::new(watch::Sender::new(0)),
        }
    }

    /// Receiver that wakes after each completed poll.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.polls.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn watched(&self) -> &BTreeSet<String> {
        &self.watched
    }

    /// Brings polling in line with the referenced games: stops when none
    /// are referenced, restarts when the set changed, otherwise leaves the
    /// running task alone.
    pub async fn sync<F: ScoreFeed>(
        &mut self,
        feed: Arc<F>,
        store: LiveGameStore,
        games: BTreeSet<String>,
        interval: Duration,
    ) -> Result<()> {
        if games.is_empty() {
            return self.stop().await;
        }
        if self.is_running() && games == self.watched {
            return Ok(());
        }

        self.stop().await?;

        info!("Starting feed polling for {} game(s) every {:?}", games.len(), interval);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            feed,
            store,
            games.clone(),
            interval,
            self.polls.clone(),
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.watched = games;
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.watched.clear();

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("feed polling task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}
