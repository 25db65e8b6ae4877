//! Squares pool scanner
//!
//! Command-line front end: proposes grid bounds on a photo, reads the axis
//! digits under an aligned overlay, edits pools and reports winners from
//! manual or live scores.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use image::RgbaImage;
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use squares_scan::config::{get_config, init_config, AppConfig};
use squares_scan::geometry::{Rect, Size};
use squares_scan::grid::{detect_grid, read_axes};
use squares_scan::logging::init_logging;
use squares_scan::ocr::TesseractEngine;
use squares_scan::paths;
use squares_scan::pool::{
    resolve_wins, sanitize_digit_input, sanitize_score_input, AxisDigits, Cell, Pool, PoolStore,
    PoolType, Quarter, ScorePair, AXIS_LEN,
};
use squares_scan::scores::{
    apply_live_scores, poll_once, reconcile_pool, referenced_games, HttpScoreFeed, LiveGameStore,
    LivePoller,
};

#[derive(Parser)]
#[command(name = "squares-scan", version, about = "Read squares pool grids and track winners")]
struct Cli {
    /// Config file (defaults to config.json next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pools file (overrides the configured one)
    #[arg(long, global = true)]
    pools: Option<PathBuf>,

    /// Also append log lines to logs/squares_scan.log
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Propose the grid rectangle on a photo
    Detect {
        photo: PathBuf,
        /// Display size the rectangle is reported in, as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_size)]
        display: Option<Size>,
    },
    /// Read both axes of the grid under an overlay
    ReadAxes {
        photo: PathBuf,
        /// Overlay rectangle in display coordinates, as X,Y,W,H
        #[arg(long, value_parser = parse_rect)]
        overlay: Rect,
        #[arg(long, value_parser = parse_size)]
        display: Option<Size>,
        /// Store the digits on this pool
        #[arg(long)]
        pool: Option<String>,
    },
    /// Create a pool
    Create {
        name: String,
        #[arg(long, value_enum, default_value_t = PoolKind::Quarters)]
        kind: PoolKind,
    },
    /// List stored pools
    List,
    /// Set one axis label by hand; text without a digit clears the slot
    Axis {
        pool: String,
        #[arg(value_enum)]
        axis: AxisName,
        index: usize,
        value: String,
    },
    /// Show the winning cells of a pool
    Wins {
        pool: String,
        /// Refresh the linked game from the feed first
        #[arg(long)]
        live: bool,
    },
    /// Enter a quarter score by hand
    Score {
        pool: String,
        /// Quarter number, 1 to 4
        quarter: usize,
        away: Option<String>,
        home: Option<String>,
        /// Forget the stored score for the quarter
        #[arg(long)]
        clear: bool,
    },
    /// Claim or release a square
    Toggle { pool: String, row: usize, col: usize },
    /// Link a pool to a feed game id, or unlink it when no id is given
    Link { pool: String, game: Option<String> },
    /// Poll the feed for every linked pool until interrupted
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum PoolKind {
    Quarters,
    HalfFinal,
    EveryScore,
    Minute,
}

impl From<PoolKind> for PoolType {
    fn from(kind: PoolKind) -> Self {
        match kind {
            PoolKind::Quarters => PoolType::Quarters,
            PoolKind::HalfFinal => PoolType::HalfFinal,
            PoolKind::EveryScore => PoolType::EveryScore,
            PoolKind::Minute => PoolType::Minute,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AxisName {
    Columns,
    Rows,
}

fn parse_size(text: &str) -> Result<Size, String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", text))?;
    let width: f32 = w.trim().parse().map_err(|e| format!("bad width: {}", e))?;
    let height: f32 = h.trim().parse().map_err(|e| format!("bad height: {}", e))?;
    Ok(Size::new(width, height))
}

fn parse_rect(text: &str) -> Result<Rect, String> {
    let parts: Vec<f32> = text
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("bad number {:?}: {}", p, e)))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(Rect::new(*x, *y, *w, *h)),
        _ => Err(format!("expected X,Y,W,H, got {:?}", text)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    std::panic::set_hook(Box::new(|panic_info| {
        error!("[PANIC] {}", panic_info);
    }));

    if let Err(e) = paths::ensure_directories() {
        eprintln!("Failed to create output directories: {}", e);
    }
    init_logging(cli.log_file);
    init_config(cli.config.as_deref());
    let config = get_config();

    let pools_path = cli
        .pools
        .clone()
        .or_else(|| config.storage.pools_file.clone())
        .unwrap_or_else(paths::get_default_pools_path);
    let store = PoolStore::new(pools_path);

    let result = run(cli.command, config, &store).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn run(command: Command, config: &AppConfig, store: &PoolStore) -> Result<()> {
    match command {
        Command::Detect { photo, display } => {
            let image = load_photo(&photo)?;
            let display = display.unwrap_or_else(|| Size::from_dimensions(image.dimensions()));
            let engine = Arc::new(TesseractEngine::from_config(&config.ocr)?);

            let rect = detect_grid(engine, &image, display, config).await?;
            println!("{:.1},{:.1},{:.1},{:.1}", rect.x, rect.y, rect.w, rect.h);
        }
        Command::ReadAxes {
            photo,
            overlay,
            display,
            pool,
        } => {
            let image = load_photo(&photo)?;
            let display = display.unwrap_or_else(|| Size::from_dimensions(image.dimensions()));
            let engine = Arc::new(TesseractEngine::from_config(&config.ocr)?);

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            let readout = read_axes(engine, &image, &overlay, display, config, &cancel).await?;
            println!("columns: {}", readout.columns);
            println!("rows:    {}", readout.rows);

            if let Some(id) = pool {
                let updated = store.update(&id, |p| {
                    let (cols, rows) = readout.merge_into(p.col_numbers, p.row_numbers);
                    p.with_axes(cols, rows)
                })?;
                info!("Stored axes on pool {}", updated.id);
            }
        }
        Command::Create { name, kind } => {
            let mut pools = store.load()?;
            let pool = Pool::new(&name, kind.into());
            println!("{}", pool.id);
            pools.push(pool);
            store.save(&pools)?;
        }
        Command::List => {
            for pool in store.load()? {
                println!(
                    "{}  {:<24} {:?}  squares: {}  game: {}",
                    pool.id,
                    pool.name,
                    pool.pool_type,
                    pool.my_squares.owned_count(),
                    pool.game_id.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Axis {
            pool,
            axis,
            index,
            value,
        } => {
            if index >= AXIS_LEN {
                bail!("Axis index must be below {}", AXIS_LEN);
            }
            let digit = sanitize_digit_input(&value);
            let updated = store.update(&pool, |p| {
                let set = |current: Option<AxisDigits>| {
                    Some(current.unwrap_or_default().with_digit(index, digit))
                };
                match axis {
                    AxisName::Columns => p.with_axes(set(p.col_numbers), p.row_numbers),
                    AxisName::Rows => p.with_axes(p.col_numbers, set(p.row_numbers)),
                }
            })?;
            print_axes(&updated);
        }
        Command::Wins { pool, live } => {
            let mut current = find_pool(store, &pool)?;
            let games = LiveGameStore::new();

            if live {
                match refresh_pool(config, &games, &current).await {
                    Ok(Some(updated)) => {
                        current = store.update(&current.id, move |_| updated)?;
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Live scores unavailable, using stored scores: {:#}", e),
                }
            }

            let live_score = current.game_id.as_deref().and_then(|id| games.live_score(id));
            print_wins(&current, live_score);
        }
        Command::Score {
            pool,
            quarter,
            away,
            home,
            clear,
        } => {
            let quarter = Quarter::from_number(quarter)
                .ok_or_else(|| anyhow!("Quarter must be 1 to 4, got {}", quarter))?;
            let pair = if clear {
                None
            } else {
                let away = away.as_deref().and_then(sanitize_score_input);
                let home = home.as_deref().and_then(sanitize_score_input);
                match (away, home) {
                    (Some(a), Some(h)) => Some(ScorePair(a, h)),
                    _ => bail!("Both scores need at least one digit (use --clear to forget a quarter)"),
                }
            };

            let updated = store.update(&pool, |p| p.with_manual_score(quarter, pair))?;
            info!("{} {} set to {:?}", updated.name, quarter.label(), pair);
            print_wins(&updated, None);
        }
        Command::Toggle { pool, row, col } => {
            if row >= AXIS_LEN || col >= AXIS_LEN {
                bail!("Row and column must be below {}", AXIS_LEN);
            }
            let cell = Cell { row, col };
            let updated = store.update(&pool, |p| p.with_squares(p.my_squares.toggle(cell)))?;
            let state = if updated.my_squares.is_owned(cell) { "claimed" } else { "released" };
            println!("Square ({}, {}) {}", row, col, state);
        }
        Command::Link { pool, game } => {
            let updated = store.update(&pool, |p| p.with_game(game.clone()))?;
            match &updated.game_id {
                Some(id) => println!("{} linked to game {}", updated.name, id),
                None => println!("{} unlinked", updated.name),
            }
        }
        Command::Watch => watch(config, store).await?,
    }

    Ok(())
}

fn load_photo(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(image.to_rgba8())
}

fn find_pool(store: &PoolStore, id: &str) -> Result<Pool> {
    store
        .load()?
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| anyhow!("No pool with id {}", id))
}

/// Polls the feed once for the pool's linked game and returns the
/// reconciled pool when its scores moved.
async fn refresh_pool(config: &AppConfig, games: &LiveGameStore, pool: &Pool) -> Result<Option<Pool>> {
    let watched = referenced_games(std::slice::from_ref(pool));
    if watched.is_empty() {
        info!("Pool {} is not linked to a game", pool.id);
        return Ok(None);
    }

    let feed = HttpScoreFeed::new(&config.feed)?;
    poll_once(&feed, games, &watched).await?;
    Ok(reconcile_pool(pool, games))
}

async fn watch(config: &AppConfig, store: &PoolStore) -> Result<()> {
    let feed = Arc::new(HttpScoreFeed::new(&config.feed)?);
    let games = LiveGameStore::new();
    let mut poller = LivePoller::new();
    let interval = Duration::from_secs(config.feed.poll_interval_secs.max(1));

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    // The poll set is resynced on its own tick; reconciling waits for the
    // poll itself to finish
    let mut polled = poller.subscribe();
    let mut resync = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = resync.tick() => {
                let pools = store.load()?;
                poller
                    .sync(feed.clone(), games.clone(), referenced_games(&pools), interval)
                    .await?;
                if !poller.is_running() {
                    info!("No pool is linked to a game; waiting");
                }
            }
            changed = polled.changed() => {
                if changed.is_err() {
                    break;
                }
                reconcile_and_report(store, &games)?;
            }
            _ = shutdown.cancelled() => {
                info!("Stopping watch");
                break;
            }
        }
    }

    poller.stop().await
}

/// Applies the store's games to the saved pools and prints every linked one.
fn reconcile_and_report(store: &PoolStore, games: &LiveGameStore) -> Result<()> {
    if !games.is_online() {
        warn!("Feed offline, showing last-known scores");
    }

    let pools = store.load()?;
    let (updated, changed) = apply_live_scores(&pools, games);
    if changed > 0 {
        store.save(&updated)?;
    }
    for pool in updated.iter().filter(|p| p.game_id.is_some()) {
        let live_score = pool.game_id.as_deref().and_then(|id| games.live_score(id));
        print_wins(pool, live_score);
    }
    Ok(())
}

fn print_axes(pool: &Pool) {
    let show = |digits: Option<AxisDigits>| digits.map_or_else(|| "-".to_string(), |d| d.to_string());
    println!("columns: {}", show(pool.col_numbers));
    println!("rows:    {}", show(pool.row_numbers));
}

fn print_wins(pool: &Pool, live_score: Option<ScorePair>) {
    println!("{} ({:?})", pool.name, pool.pool_type);
    let records = resolve_wins(pool, live_score);
    if records.is_empty() {
        println!("  no scores yet");
        return;
    }

    for record in records {
        let cell = match record.cell {
            Some(c) => format!("row {} col {}", c.row, c.col),
            None => "axes incomplete".to_string(),
        };
        let mine = if record.is_mine { "  <- yours" } else { "" };
        println!("  {:<8} {:>7}  {}{}", record.label, record.score.to_string(), cell, mine);
    }
}
