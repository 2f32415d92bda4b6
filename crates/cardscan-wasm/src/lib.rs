//! WASM bindings for payment card OCR scanning.
//!
//! The host runs its own text recognizer (for example a browser OCR library)
//! and passes each frame's recognized lines to [`CardScanner::process_lines`].

use serde::Serialize;
use wasm_bindgen::prelude::*;

use cardscan_core::card::rules::format_card_number;
use cardscan_core::card::{Candidate, CardScanner as Scanner, ScanState};
use cardscan_core::models::card::{CardNumber, CardScheme, CreditCardModel};
use cardscan_core::models::config::ScanConfig;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn digits_of(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Whether `number` is a 13-19 digit card number passing the Luhn checksum.
/// Spaces and dashes are ignored.
#[wasm_bindgen(js_name = validateCardNumber)]
pub fn validate_card_number(number: &str) -> bool {
    if number.chars().any(|c| !c.is_ascii_digit() && c != ' ' && c != '-') {
        return false;
    }
    CardNumber::new(digits_of(number)).is_some_and(|n| n.is_luhn_valid())
}

/// Card scheme name for a number's issuer prefix (e.g. "Visa").
#[wasm_bindgen(js_name = detectScheme)]
pub fn detect_scheme(number: &str) -> String {
    CardScheme::detect(&digits_of(number)).display_name().to_string()
}

/// Group a card number the way its scheme prints it.
#[wasm_bindgen(js_name = formatCardNumber)]
pub fn format_card(number: &str) -> String {
    format_card_number(&digits_of(number))
}

/// Mask all but the first six and last four digits.
#[wasm_bindgen(js_name = maskCardNumber)]
pub fn mask_card_number(number: &str) -> Option<String> {
    CardNumber::new(digits_of(number)).map(|n| n.masked())
}

/// A scanned card as seen from JavaScript.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardJs {
    #[serde(skip_serializing_if = "Option::is_none")]
    number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_masked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiry_year: Option<i32>,
}

impl From<&CreditCardModel> for CardJs {
    fn from(card: &CreditCardModel) -> Self {
        Self {
            number: card.number.as_ref().map(|n| n.digits().to_string()),
            number_masked: card.number.as_ref().map(|n| n.masked()),
            scheme: card.number.as_ref().map(|n| n.scheme().display_name().to_string()),
            holder: card.holder.clone(),
            expiry: card.expiry.map(|e| e.to_string()),
            expiry_month: card.expiry.map(|e| e.month()),
            expiry_year: card.expiry.map(|e| e.year()),
        }
    }
}

#[derive(Serialize)]
struct MatchJs {
    field: &'static str,
    value: String,
    confidence: f32,
}

impl From<&Candidate> for MatchJs {
    fn from(candidate: &Candidate) -> Self {
        Self {
            field: candidate.kind().as_str(),
            value: candidate.describe(),
            confidence: candidate.confidence(),
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Card scanner class for browser use.
///
/// Fields accumulate across `processLines` calls until every required field
/// is known; the completed card is returned once and the scanner starts over.
#[wasm_bindgen]
pub struct CardScanner {
    inner: Scanner,
}

#[wasm_bindgen]
impl CardScanner {
    /// Create a scanner. `config` is an optional object with the scan
    /// options (`check_card_number`, `use_luhn_validation`, ...).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CardScanner, JsValue> {
        let config: ScanConfig = if config.is_undefined() || config.is_null() {
            ScanConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        let inner = Scanner::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    /// Classify one frame's lines. Returns the card when this frame
    /// completes it, `null` otherwise.
    #[wasm_bindgen(js_name = processLines)]
    pub fn process_lines(&mut self, lines: Vec<String>) -> Result<JsValue, JsValue> {
        match self.inner.process_batch(&lines) {
            Some(card) => to_js(&CardJs::from(&card)),
            None => Ok(JsValue::NULL),
        }
    }

    /// Show which fields a single line matches, without accumulating.
    #[wasm_bindgen(js_name = classifyLine)]
    pub fn classify_line(&self, line: &str) -> Result<JsValue, JsValue> {
        let matches: Vec<MatchJs> = self.inner.classify_line(line).iter().map(MatchJs::from).collect();
        to_js(&matches)
    }

    /// Discard accumulated fields.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// "scanning" or "complete".
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        match self.inner.state() {
            ScanState::Scanning => "scanning".to_string(),
            ScanState::Complete => "complete".to_string(),
        }
    }

    /// Names of the fields accumulated so far.
    #[wasm_bindgen]
    pub fn filled(&self) -> js_sys::Array {
        self.inner
            .accumulator()
            .filled()
            .into_iter()
            .map(|kind| JsValue::from_str(kind.as_str()))
            .collect()
    }

    /// Cards emitted by this scanner.
    #[wasm_bindgen]
    pub fn emissions(&self) -> u32 {
        self.inner.emissions() as u32
    }
}
