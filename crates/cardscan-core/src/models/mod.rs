//! Data models and configuration.

pub mod card;
pub mod config;

pub use card::{CardNumber, CardScheme, CreditCardModel, ExpiryDate, FieldKind};
pub use config::{CardscanConfig, MergePolicy, OcrConfig, ScanConfig};
