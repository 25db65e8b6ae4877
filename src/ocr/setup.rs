use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::OcrConfig;
use crate::error::RecognitionError;

#[derive(Debug, Clone, PartialEq)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    /// None lets Tesseract fall back to its compiled-in data directory.
    pub tessdata: Option<PathBuf>,
}

const COMMON_EXECUTABLES: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

const COMMON_TESSDATA_DIRS: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

impl TesseractPaths {
    /// Finds the executable and a tessdata directory holding the configured
    /// language. A missing executable makes recognition unavailable.
    pub fn locate(config: &OcrConfig) -> Result<Self, RecognitionError> {
        let executable = find_tesseract_executable(config.tesseract_path.as_deref())?;
        let tessdata = find_tessdata_dir(config.tessdata_dir.as_deref(), &config.language);

        info!(
            "Tesseract at {} (tessdata: {})",
            executable.display(),
            tessdata
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        );

        Ok(Self { executable, tessdata })
    }
}

/// Finds the Tesseract executable, checking the configured path first,
/// then PATH, then common install locations.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf, RecognitionError> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(RecognitionError::Unavailable(format!(
            "Configured tesseract not found at {}",
            path.display()
        )));
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    for path in COMMON_EXECUTABLES {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(RecognitionError::Unavailable(
        "Tesseract not found. Please install Tesseract-OCR or set ocr.tesseract_path.".to_string(),
    ))
}

/// Finds a tessdata directory containing `<language>.traineddata`.
pub fn find_tessdata_dir(configured: Option<&Path>, language: &str) -> Option<PathBuf> {
    let traineddata = format!("{}.traineddata", language);

    if let Some(dir) = configured {
        if dir.join(&traineddata).exists() {
            return Some(dir.to_path_buf());
        }
        debug!("Configured tessdata {} lacks {}", dir.display(), traineddata);
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if p.join(&traineddata).exists() {
            return Some(p);
        }
        let p = p.join("tessdata");
        if p.join(&traineddata).exists() {
            return Some(p);
        }
    }

    COMMON_TESSDATA_DIRS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.join(&traineddata).exists())
}
