//! Expiry date extraction.

use chrono::NaiveDate;

use super::patterns::{EXPIRY_DATE, EXPIRY_LABEL};
use super::{ExtractionMatch, FieldExtractor};
use crate::card::validation::{is_expired, is_valid_month};
use crate::models::card::ExpiryDate;

/// Expiry date field extractor.
pub struct ExpiryExtractor {
    /// When set, dates that ended before this day are discarded.
    reference_date: Option<NaiveDate>,
}

impl ExpiryExtractor {
    pub fn new() -> Self {
        Self {
            reference_date: None,
        }
    }

    /// Discard dates that already expired on `today`.
    pub fn with_expiry_check(mut self, today: NaiveDate) -> Self {
        self.reference_date = Some(today);
        self
    }
}

impl Default for ExpiryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ExpiryExtractor {
    type Output = ExtractionMatch<ExpiryDate>;

    /// The latest date on the line, so "VALID FROM 01/22 THRU 09/27" yields 09/27.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// All dates on the line, latest first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();
        let labeled = EXPIRY_LABEL.is_match(text);
        let confidence = if labeled { 0.95 } else { 0.8 };

        for caps in EXPIRY_DATE.captures_iter(text) {
            let full_match = caps.get(0).unwrap();

            // Reject dates embedded in longer digit runs
            let digit_before = text[..full_match.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit());
            let digit_after = text[full_match.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit());
            if digit_before || digit_after {
                continue;
            }

            let month: u32 = caps[1].parse().unwrap_or(0);
            let Some(year) = parse_year(&caps[2]) else {
                continue;
            };
            if !is_valid_month(month) {
                continue;
            }

            let Some(date) = ExpiryDate::new(month, year) else {
                continue;
            };

            if let Some(today) = self.reference_date {
                if is_expired(&date, today) {
                    continue;
                }
            }

            if results.iter().any(|r| r.value == date) {
                continue;
            }

            results.push(
                ExtractionMatch::new(date, confidence, text)
                    .with_position(full_match.start(), full_match.end()),
            );
        }

        results.sort_by(|a, b| b.value.cmp(&a.value));
        results
    }
}

/// Extract the expiry date from a line.
pub fn extract_expiry(text: &str) -> Option<ExpiryDate> {
    ExpiryExtractor::new().extract(text).map(|m| m.value)
}

/// Two-digit years are taken as 20YY; four-digit years as written.
fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    match s.len() {
        2 => Some(2000 + year),
        4 if (2000..=2099).contains(&year) => Some(year),
        _ => None,
    }
}
