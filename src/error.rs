//! Error taxonomy for the recognition and scoring engine.
//!
//! Every failure here is local and recoverable. Callers surface the message
//! and leave previously stored digits, rectangles and scores untouched.

use thiserror::Error;

/// The OCR backend could not produce a result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecognitionError {
    #[error("Recognition unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the automatic grid bounds proposal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("Grid not found: {0}")]
    GridNotFound(String),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

/// Failures of an axis reading pass over a user-adjusted overlay.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error("Axis reading was cancelled")]
    Cancelled,
}

/// The external score feed could not be reached or decoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("Score feed unavailable: {0}")]
    Unavailable(String),
}
