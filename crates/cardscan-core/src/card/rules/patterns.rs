//! Common regex patterns and word lists for card text classification.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Number lines: digits with spaces, dashes or dots between groups
    pub static ref NUMBER_LINE: Regex = Regex::new(
        r"^[0-9\s.\-]+$"
    ).unwrap();

    // MM/YY, MM-YY, MM/YYYY; digit boundaries are checked by the extractor
    pub static ref EXPIRY_DATE: Regex = Regex::new(
        r"([0-9]{1,2})\s*[/\-]\s*([0-9]{2,4})"
    ).unwrap();

    // Labels printed next to the expiry date
    pub static ref EXPIRY_LABEL: Regex = Regex::new(
        r"(?i)(?:valid\s*(?:thru|through|to|until)|good\s*(?:thru|through)|expir(?:es|y|ation)|\bexp\b|\bthru\b)"
    ).unwrap();

    // One word of a holder name: letters with internal . - ' separators
    pub static ref NAME_TOKEN: Regex = Regex::new(
        r"^\p{L}+(?:[.\-']\p{L}*)*$"
    ).unwrap();

    /// Words printed on cards that are never part of a holder name.
    pub static ref HOLDER_DENY_WORDS: HashSet<&'static str> = [
        // Expiry labels
        "VALID", "THRU", "THROUGH", "GOOD", "EXPIRES", "EXPIRY", "EXP", "MEMBER", "SINCE",
        "FROM", "MONTH", "YEAR", "END", "UNTIL",
        // Card boilerplate
        "DEBIT", "CREDIT", "CARD", "BANK", "PLATINUM", "GOLD", "CLASSIC", "BUSINESS", "WORLD",
        "SIGNATURE", "INFINITE", "PREPAID", "ELECTRON", "CONTACTLESS", "INTERNATIONAL",
        "AUTHORIZED", "CUSTOMER", "SERVICE",
        // Networks
        "VISA", "MASTERCARD", "MAESTRO", "AMEX", "AMERICAN", "EXPRESS", "DISCOVER", "JCB",
        "UNIONPAY", "DINERS", "CLUB", "MIR",
        // Months, leaving out those that double as given names
        "JAN", "FEB", "MAR", "APR", "JUN", "JUL", "AUG", "SEP", "SEPT", "OCT", "NOV",
        "DEC", "JANUARY", "FEBRUARY", "SEPTEMBER", "OCTOBER", "NOVEMBER", "DECEMBER",
    ]
    .into_iter()
    .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_line() {
        assert!(NUMBER_LINE.is_match("4539 1488 0343 6467"));
        assert!(NUMBER_LINE.is_match("4539-1488-0343-6467"));
        assert!(!NUMBER_LINE.is_match("VALID THRU 09/27"));
        assert!(!NUMBER_LINE.is_match("4539 1488 0343 646A"));
    }

    #[test]
    fn test_name_token() {
        assert!(NAME_TOKEN.is_match("JOHN"));
        assert!(NAME_TOKEN.is_match("J."));
        assert!(NAME_TOKEN.is_match("MARY-JANE"));
        assert!(NAME_TOKEN.is_match("O'BRIEN"));
        assert!(NAME_TOKEN.is_match("MÜLLER"));
        assert!(!NAME_TOKEN.is_match("-JOHN"));
        assert!(!NAME_TOKEN.is_match("JOHN3"));
        assert!(!NAME_TOKEN.is_match("J@HN"));
    }

    #[test]
    fn test_expiry_label() {
        assert!(EXPIRY_LABEL.is_match("VALID THRU"));
        assert!(EXPIRY_LABEL.is_match("validthru"));
        assert!(EXPIRY_LABEL.is_match("GOOD THROUGH"));
        assert!(EXPIRY_LABEL.is_match("Expires"));
        assert!(EXPIRY_LABEL.is_match("EXP 09/27"));
        assert!(!EXPIRY_LABEL.is_match("MEMBER SINCE"));
        assert!(!EXPIRY_LABEL.is_match("EXPRESS"));
    }
}
