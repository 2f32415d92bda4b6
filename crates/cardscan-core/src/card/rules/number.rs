//! Card number (PAN) extraction.

use std::borrow::Cow;

use super::patterns::NUMBER_LINE;
use super::{ExtractionMatch, FieldExtractor};
use crate::models::card::{CardNumber, CardScheme};

/// Minimum digits a line needs before digit-confusion correction applies.
const CORRECTION_MIN_DIGITS: usize = 8;

/// Card number field extractor.
pub struct NumberExtractor {
    validate: bool,
    auto_correct: bool,
}

impl NumberExtractor {
    /// Create a new number extractor.
    pub fn new() -> Self {
        Self {
            validate: true,
            auto_correct: false,
        }
    }

    /// Set whether to require a passing Luhn checksum.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set whether to map letters OCR commonly confuses with digits.
    pub fn with_auto_correct(mut self, auto_correct: bool) -> Self {
        self.auto_correct = auto_correct;
        self
    }
}

impl Default for NumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NumberExtractor {
    type Output = ExtractionMatch<CardNumber>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let line = text.trim();
        let line = if self.auto_correct {
            correct_digit_confusions(line)
        } else {
            Cow::Borrowed(line)
        };

        if !NUMBER_LINE.is_match(&line) {
            return Vec::new();
        }

        let digits: String = line.chars().filter(|c| c.is_ascii_digit()).collect();
        let Some(number) = CardNumber::new(digits) else {
            return Vec::new();
        };

        if self.validate && !number.is_luhn_valid() {
            return Vec::new();
        }

        // Unchecked numbers stay upgradeable by a later checksum-valid read
        let confidence = if number.is_luhn_valid() { 0.95 } else { 0.6 };

        vec![ExtractionMatch::new(number, confidence, text).with_position(0, text.len())]
    }
}

/// Extract a Luhn-valid card number from a line.
pub fn extract_card_number(text: &str) -> Option<String> {
    NumberExtractor::new()
        .extract(text)
        .map(|m| m.value.digits().to_string())
}

/// Replace letters OCR commonly reads in place of digits.
///
/// Lines with fewer than eight real digits are returned untouched so that
/// names and labels are never rewritten.
pub fn correct_digit_confusions(text: &str) -> Cow<'_, str> {
    let digit_count = text.chars().filter(|c| c.is_ascii_digit()).count();
    if digit_count < CORRECTION_MIN_DIGITS {
        return Cow::Borrowed(text);
    }

    let corrected: String = text
        .chars()
        .map(|c| match c {
            'O' | 'o' | 'D' | 'Q' => '0',
            'I' | 'l' | '|' => '1',
            'Z' | 'z' => '2',
            'S' | 's' => '5',
            'B' => '8',
            other => other,
        })
        .collect();

    if corrected == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(corrected)
    }
}

/// Format a card number in the grouping printed on the card.
///
/// American Express uses 4-6-5, 14-digit Diners Club 4-6-4, everything else
/// groups of four.
pub fn format_card_number(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();

    let groups: &[usize] = match (CardScheme::detect(&digits), digits.len()) {
        (CardScheme::AmericanExpress, 15) => &[4, 6, 5],
        (CardScheme::DinersClub, 14) => &[4, 6, 4],
        _ => &[],
    };

    if groups.is_empty() {
        return digits
            .chars()
            .collect::<Vec<char>>()
            .chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<String>>()
            .join(" ");
    }

    let mut parts = Vec::with_capacity(groups.len());
    let mut start = 0;
    for &len in groups {
        parts.push(&digits[start..start + len]);
        start += len;
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::validation::luhn_check_digit;

    fn with_check_digit(partial: &str) -> String {
        format!("{}{}", partial, luhn_check_digit(partial).unwrap())
    }

    #[test]
    fn test_extract_grouped_number() {
        let result = NumberExtractor::new().extract("4539 1488 0343 6467").unwrap();
        assert_eq!(result.value.digits(), "4539148803436467");
        assert_eq!(result.value.scheme(), CardScheme::Visa);
        assert_eq!(result.source, "4539 1488 0343 6467");
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn test_extract_ungrouped_and_dashed() {
        assert_eq!(
            extract_card_number("4539148803436467"),
            Some("4539148803436467".to_string())
        );
        assert_eq!(
            extract_card_number(" 3782-822463-10005 "),
            Some("378282246310005".to_string())
        );
    }

    #[test]
    fn test_accepts_every_valid_length() {
        let body = "453914880343646712";
        for len in 13..=19 {
            let number = with_check_digit(&body[..len - 1]);
            assert!(
                NumberExtractor::new().extract(&number).is_some(),
                "{} should be accepted",
                number
            );
        }
    }

    #[test]
    fn test_rejects_failing_checksum_at_every_length() {
        let body = "453914880343646712";
        for len in 13..=19 {
            let partial = &body[..len - 1];
            let wrong = (luhn_check_digit(partial).unwrap() + 1) % 10;
            let number = format!("{}{}", partial, wrong);
            assert!(
                NumberExtractor::new().extract(&number).is_none(),
                "{} should be rejected",
                number
            );
        }
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let extractor = NumberExtractor::new().with_validation(false);
        assert!(extractor.extract("1234").is_none());
        assert!(extractor.extract("4539 1488 0343").is_none());
        assert!(extractor.extract("4539 1488 0343 6467 1234").is_none());
    }

    #[test]
    fn test_rejects_non_numeric_structure() {
        let extractor = NumberExtractor::new();
        assert!(extractor.extract("JOHN SMITH").is_none());
        assert!(extractor.extract("VALID THRU 09/27").is_none());
        assert!(extractor.extract("CARD 4539 1488 0343 6467").is_none());
        assert!(extractor.extract("").is_none());
    }

    #[test]
    fn test_without_validation_keeps_flag() {
        let extractor = NumberExtractor::new().with_validation(false);
        let result = extractor.extract("4539 1488 0343 6468").unwrap();
        assert!(!result.value.is_luhn_valid());
        assert!(result.confidence < 0.9);

        assert!(NumberExtractor::new().extract("4539 1488 0343 6468").is_none());
    }

    #[test]
    fn test_auto_correct() {
        let line = "4539 l488 O343 6467";
        assert!(NumberExtractor::new().extract(line).is_none());

        let result = NumberExtractor::new().with_auto_correct(true).extract(line).unwrap();
        assert_eq!(result.value.digits(), "4539148803436467");
        assert_eq!(result.source, line);
    }

    #[test]
    fn test_correction_leaves_short_lines_alone() {
        assert_eq!(correct_digit_confusions("JOHN SMITH"), "JOHN SMITH");
        assert_eq!(correct_digit_confusions("SO 09/27"), "SO 09/27");
        assert!(matches!(correct_digit_confusions("4539148803436467"), Cow::Borrowed(_)));
        assert_eq!(correct_digit_confusions("4539 I488 0343 64S7"), "4539 1488 0343 6457");
    }

    #[test]
    fn test_format_card_number() {
        assert_eq!(format_card_number("4539148803436467"), "4539 1488 0343 6467");
        assert_eq!(format_card_number("378282246310005"), "3782 822463 10005");
        assert_eq!(format_card_number("30569309025904"), "3056 930902 5904");
        assert_eq!(format_card_number("4222222222222"), "4222 2222 2222 2");
        assert_eq!(format_card_number("4539-1488-0343-6467"), "4539 1488 0343 6467");
    }
}
