use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::TesseractPaths;
use crate::config::OcrConfig;
use crate::error::RecognitionError;
use crate::geometry::BBox;

/// One recognized word with its confidence and pixel box, in the
/// coordinate space of the image that was handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrToken {
    pub text: String,
    pub confidence: f32,
    pub bbox: BBox,
}

/// How the text is laid out in the image handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// A narrow strip holding one row or column of labels
    Strip,
    /// A whole photo with scattered labels
    FullImage,
}

/// Contract for an OCR backend: raster in, characters with boxes out.
///
/// Implementations block; async callers run them on a blocking worker.
pub trait OcrEngine: Send + Sync + 'static {
    fn recognize(
        &self,
        image: &GrayImage,
        whitelist: &str,
        layout: Layout,
    ) -> Result<Vec<OcrToken>, RecognitionError>;
}

/// Runs the Tesseract executable and reads its TSV output.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    language: String,
    strip_psm: u8,
    full_image_psm: u8,
}

impl TesseractEngine {
    pub fn new(paths: TesseractPaths, config: &OcrConfig) -> Self {
        Self {
            executable: paths.executable,
            tessdata: paths.tessdata,
            language: config.language.clone(),
            strip_psm: config.strip_psm,
            full_image_psm: config.full_image_psm,
        }
    }

    /// Locates Tesseract according to the config and builds an engine.
    pub fn from_config(config: &OcrConfig) -> Result<Self, RecognitionError> {
        let paths = TesseractPaths::locate(config)?;
        Ok(Self::new(paths, config))
    }

    fn psm(&self, layout: Layout) -> u8 {
        match layout {
            Layout::Strip => self.strip_psm,
            Layout::FullImage => self.full_image_psm,
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(
        &self,
        image: &GrayImage,
        whitelist: &str,
        layout: Layout,
    ) -> Result<Vec<OcrToken>, RecognitionError> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")
            .map_err(|e| unavailable("Failed to create temp image", e))?;
        image
            .save(temp_input.path())
            .map_err(|e| unavailable("Failed to write temp image", e))?;

        // Tesseract appends .tsv to the output base
        let temp_output =
            NamedTempFile::new().map_err(|e| unavailable("Failed to create temp output", e))?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).arg(&output_base);
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }
        let output = command
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.psm(layout).to_string())
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", whitelist))
            .arg("tsv")
            .output()
            .map_err(|e| unavailable("Failed to run tesseract", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Unavailable(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| unavailable("Failed to read Tesseract output", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

fn unavailable(what: &str, e: impl std::fmt::Display) -> RecognitionError {
    RecognitionError::Unavailable(format!("{}: {}", what, e))
}

/// Parses Tesseract TSV output into word tokens with boxes.
///
/// TSV fields: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Only level 5 (word) rows with a
/// non-negative confidence and non-empty text are kept.
pub fn parse_tsv_output(tsv: &str) -> Vec<OcrToken> {
    let mut tokens = Vec::new();

    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = fields[0].parse().unwrap_or(-1);
        if level != 5 {
            continue;
        }

        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        let text = fields[11].trim();
        if conf < 0.0 || text.is_empty() {
            continue;
        }

        let left: f32 = fields[6].parse().unwrap_or(0.0);
        let top: f32 = fields[7].parse().unwrap_or(0.0);
        let width: f32 = fields[8].parse().unwrap_or(0.0);
        let height: f32 = fields[9].parse().unwrap_or(0.0);

        tokens.push(OcrToken {
            text: text.to_string(),
            confidence: conf,
            bbox: BBox::new(left, top, left + width, top + height),
        });
    }

    tokens
}
