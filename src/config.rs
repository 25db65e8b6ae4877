//! Configuration types.
//!
//! Loads settings from config.json at startup. Provides OCR backend
//! settings, grid detection thresholds, and score feed polling parameters.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{info, warn};

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// OCR backend settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Explicit path to the tesseract executable (otherwise searched on PATH)
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory (otherwise TESSDATA_PREFIX or system paths)
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract language
    pub language: String,
    /// Page segmentation mode for narrow axis strips
    pub strip_psm: u8,
    /// Page segmentation mode for whole-photo scans (sparse text)
    pub full_image_psm: u8,
    /// Pixels darker than this become black, the rest white. None = plain grayscale.
    pub binarize_threshold: Option<u8>,
    /// Symbols below this confidence (0-100) are discarded as noise
    pub min_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: "eng".to_string(),
            strip_psm: 6,
            full_image_psm: 11,
            binarize_threshold: None,
            min_confidence: 40.0,
        }
    }
}

/// Grid localization and axis reading parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Long edge of the working image used for bounds detection
    pub working_long_edge: u32,
    /// Fraction of the image (from the top / left) searched for axis digits
    pub margin_fraction: f32,
    /// Minimum surviving digit symbols over the whole photo
    pub min_symbols: usize,
    /// Minimum symbols in each of the top and left candidate sets
    pub min_edge_symbols: usize,
    /// Minimum provisional width/height in working pixels
    pub min_extent: f32,
    /// Printed sheet ratio: height = width * sheet_aspect
    pub sheet_aspect: f32,
    /// Thickness of the axis strips read outside the grid, in cells
    pub strip_cells: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            working_long_edge: 900,
            margin_fraction: 0.4,
            min_symbols: 10,
            min_edge_symbols: 5,
            min_extent: 50.0,
            sheet_aspect: 1.414,
            strip_cells: 1.0,
        }
    }
}

/// External score feed parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Scoreboard endpoint returning the day's games
    pub scoreboard_url: String,
    /// Seconds between polls while any pool references a game
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            scoreboard_url: default_scoreboard_url(),
            poll_interval_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

fn default_scoreboard_url() -> String {
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard".to_string()
}

/// Where pool records live.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Pools file; defaults to the platform data directory
    pub pools_file: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ocr: OcrConfig,
    pub detection: DetectionConfig,
    pub feed: FeedConfig,
    pub storage: StorageConfig,
}

/// Loads configuration from the given path or returns defaults.
///
/// A missing or malformed file is logged and replaced by defaults so the
/// tool still starts.
pub fn load_config(config_path: &Path) -> AppConfig {
    info!("Looking for config at: {}", config_path.display());

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!("Config loaded from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", config_path.display(), e);
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}. Using defaults.", config_path.display(), e);
            }
        }
    } else {
        info!("{} not found. Using default config.", config_path.display());
    }

    AppConfig::default()
}

/// Initializes the global configuration. Call once at startup.
///
/// Without an explicit path, config.json next to the executable is used.
pub fn init_config(path: Option<&Path>) {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(crate::paths::get_config_path);
    let _ = CONFIG.set(load_config(&path));
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}
