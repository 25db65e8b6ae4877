//! External score feed: strict game records and the HTTP scoreboard client.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::pool::ScorePair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub abbr: String,
    pub score: u32,
}

/// Per-period points. A period the feed has not reported is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linescores {
    pub away: Vec<u32>,
    pub home: Vec<u32>,
}

/// One game as reported by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub status: GameStatus,
    pub period: u32,
    pub clock: String,
    pub away: TeamScore,
    pub home: TeamScore,
    pub linescores: Linescores,
}

impl GameRecord {
    /// The instantaneous score, once the game has started.
    pub fn current_score(&self) -> Option<ScorePair> {
        match self.status {
            GameStatus::Scheduled => None,
            GameStatus::InProgress | GameStatus::Final => {
                Some(ScorePair(self.away.score, self.home.score))
            }
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} @ {} {} ({:?}, period {} {})",
            self.away.abbr,
            self.away.score,
            self.home.abbr,
            self.home.score,
            self.status,
            self.period,
            self.clock
        )
    }
}

/// Source of game records, optionally filtered to one date.
pub trait ScoreFeed: Send + Sync + 'static {
    fn fetch_games(
        &self,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<GameRecord>, FeedError>> + Send;
}

/// Scoreboard client for ESPN-style JSON endpoints.
#[derive(Debug, Clone)]
pub struct HttpScoreFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpScoreFeed {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("squares-scan")
            .build()
            .map_err(|e| FeedError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.scoreboard_url.clone(),
        })
    }
}

impl ScoreFeed for HttpScoreFeed {
    async fn fetch_games(&self, date: Option<NaiveDate>) -> Result<Vec<GameRecord>, FeedError> {
        let mut request = self.client.get(&self.url);
        if let Some(date) = date {
            request = request.query(&[("dates", date.format("%Y%m%d").to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedError::Unavailable(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Unavailable(format!("Failed to read body: {}", e)))?;

        let games = parse_scoreboard(&body)?;
        info!("Feed returned {} game(s)", games.len());
        Ok(games)
    }
}

#[derive(Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Deserialize)]
struct Event {
    id: String,
    #[serde(default)]
    status: EventStatus,
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Deserialize, Default)]
struct EventStatus {
    #[serde(default)]
    period: u32,
    #[serde(default, rename = "displayClock")]
    display_clock: String,
    #[serde(default, rename = "type")]
    kind: StatusType,
}

#[derive(Deserialize, Default)]
struct StatusType {
    #[serde(default)]
    state: String,
}

#[derive(Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Deserialize)]
struct Competitor {
    #[serde(rename = "homeAway")]
    home_away: String,
    #[serde(default)]
    score: Option<NumberOrText>,
    #[serde(default)]
    team: Team,
    #[serde(default)]
    linescores: Vec<LineScore>,
}

#[derive(Deserialize, Default)]
struct Team {
    #[serde(default)]
    abbreviation: String,
}

#[derive(Deserialize)]
struct LineScore {
    #[serde(default)]
    value: Option<NumberOrText>,
}

/// The scoreboard reports points as strings in some places and numbers in others.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn points(&self) -> Option<u32> {
        match self {
            NumberOrText::Number(n) if *n >= 0.0 => Some(n.round() as u32),
            NumberOrText::Number(_) => None,
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Decodes a scoreboard payload into game records. Events without both
/// an away and a home competitor are skipped.
pub fn parse_scoreboard(json: &str) -> Result<Vec<GameRecord>, FeedError> {
    let board: Scoreboard = serde_json::from_str(json)
        .map_err(|e| FeedError::Unavailable(format!("Malformed scoreboard: {}", e)))?;

    Ok(board.events.into_iter().filter_map(game_from_event).collect())
}

fn game_from_event(event: Event) -> Option<GameRecord> {
    let competition = event.competitions.into_iter().next()?;
    let mut away = None;
    let mut home = None;
    for competitor in competition.competitors {
        match competitor.home_away.as_str() {
            "away" => away = Some(competitor),
            "home" => home = Some(competitor),
            _ => {}
        }
    }
    let (away, home) = match (away, home) {
        (Some(a), Some(h)) => (a, h),
        _ => {
            debug!("Skipping event {} without both sides", event.id);
            return None;
        }
    };

    let status = match event.status.kind.state.as_str() {
        "in" => GameStatus::InProgress,
        "post" => GameStatus::Final,
        _ => GameStatus::Scheduled,
    };

    Some(GameRecord {
        id: event.id,
        status,
        period: event.status.period,
        clock: event.status.display_clock,
        linescores: Linescores {
            away: period_points(&away.linescores),
            home: period_points(&home.linescores),
        },
        away: team_score(away),
        home: team_score(home),
    })
}

/// Reported periods in order, stopping at the first one without points.
fn period_points(lines: &[LineScore]) -> Vec<u32> {
    lines
        .iter()
        .map_while(|l| l.value.as_ref().and_then(NumberOrText::points))
        .collect()
}

fn team_score(competitor: Competitor) -> TeamScore {
    TeamScore {
        abbr: competitor.team.abbreviation,
        score: competitor
            .score
            .as_ref()
            .and_then(NumberOrText::points)
            .unwrap_or(0),
    }
}
