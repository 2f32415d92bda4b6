//! Error types for the cardscan-core library.

use thiserror::Error;

/// Main error type for the cardscan library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The text recognizer failed on a frame.
    #[error("recognition error: {0}")]
    Recognition(#[from] OcrError),

    /// No frame source could be opened, so no session was started.
    #[error("no capture device available: {0}")]
    NoDeviceAvailable(String),

    /// Image loading error.
    #[cfg(feature = "native")]
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Transcript or configuration could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by text recognition backends.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The frame payload cannot be processed by this backend.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

/// Result type for the cardscan library.
pub type Result<T> = std::result::Result<T, ScanError>;
