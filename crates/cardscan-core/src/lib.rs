//! Core library for payment card scanning.
//!
//! This crate provides:
//! - Line classification for card number, holder name, and expiry date
//! - Luhn and expiry validation
//! - A field accumulator that merges partial OCR results across batches
//! - A scan session that drives a text recognizer one frame at a time

pub mod card;
pub mod error;
pub mod models;
pub mod ocr;

pub use error::{OcrError, Result, ScanError};
pub use models::card::{CardNumber, CardScheme, CreditCardModel, ExpiryDate, FieldKind};
pub use models::config::{CardscanConfig, MergePolicy, OcrConfig, ScanConfig};
pub use card::{Accumulator, Candidate, CardScanner, ScanState};
#[cfg(feature = "native")]
pub use card::{FrameOutcome, ScanSession};
pub use ocr::{Frame, RecordedFrame, ScriptedRecognizer, TextRecognizer, Transcript};
#[cfg(feature = "native")]
pub use ocr::OnnxRecognizer;
