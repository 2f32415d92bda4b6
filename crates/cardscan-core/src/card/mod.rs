//! Payment card field extraction and scan accumulation.

pub mod accumulator;
pub mod rules;
mod scanner;
#[cfg(feature = "native")]
mod session;
pub mod validation;

pub use accumulator::{Accumulator, Candidate};
pub use scanner::{CardScanner, ScanState};
#[cfg(feature = "native")]
pub use session::{FrameOutcome, ScanSession};
pub use validation::{is_expired, is_valid_month, luhn_check_digit, validate_luhn};
