//! Text recognition capability and its backends.
//!
//! The scanner never sees images: a [`TextRecognizer`] turns one frame into
//! an unordered list of text lines. Backends are chosen at the boundary:
//! - [`OnnxRecognizer`] runs `pure-onnx-ocr` on images (feature `native`)
//! - [`ScriptedRecognizer`] replays recorded OCR transcripts
//! - WASM hosts run their own OCR and pass lines straight to the scanner

#[cfg(feature = "native")]
mod pure_engine;
mod scripted;

#[cfg(feature = "native")]
pub use pure_engine::OnnxRecognizer;
pub use scripted::{RecordedFrame, ScriptedRecognizer, Transcript};

use crate::error::OcrError;

/// One captured frame. The id is opaque to the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<P> {
    /// Frame identifier or timestamp.
    pub id: u64,
    /// Backend-specific content (an image, recorded lines, ...).
    pub payload: P,
}

impl<P> Frame<P> {
    pub fn new(id: u64, payload: P) -> Self {
        Self { id, payload }
    }
}

/// Turns a frame into recognized text lines.
pub trait TextRecognizer {
    /// What a frame carries for this backend.
    type Payload;

    /// Recognize the text lines in a frame. Line order carries no meaning.
    fn recognize(&self, frame: &Frame<Self::Payload>) -> Result<Vec<String>, OcrError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}
