//! Checksum and date validation for card fields.

use chrono::{Datelike, NaiveDate};

use crate::models::card::ExpiryDate;

/// Validate a digit sequence with the Luhn (mod 10) checksum.
///
/// Spaces and dashes are ignored; any other non-digit makes the input
/// invalid. Fewer than two digits never validates.
pub fn validate_luhn(number: &str) -> bool {
    let mut digits = Vec::with_capacity(number.len());
    for c in number.chars() {
        match c {
            ' ' | '-' => continue,
            _ => match c.to_digit(10) {
                Some(d) => digits.push(d),
                None => return false,
            },
        }
    }

    if digits.len() < 2 {
        return false;
    }

    luhn_sum(&digits) % 10 == 0
}

/// Compute the Luhn check digit that completes `partial`.
pub fn luhn_check_digit(partial: &str) -> Option<u32> {
    let mut digits: Vec<u32> = partial
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<_>>()?;

    if digits.is_empty() {
        return None;
    }

    // Append a zero placeholder so the doubling positions line up.
    digits.push(0);
    let sum = luhn_sum(&digits);
    Some((10 - sum % 10) % 10)
}

/// Sum with every second digit from the right doubled.
fn luhn_sum(digits: &[u32]) -> u32 {
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum()
}

/// Whether `month` is a calendar month number.
pub fn is_valid_month(month: u32) -> bool {
    (1..=12).contains(&month)
}

/// A card stays valid through the last day of its expiry month.
pub fn is_expired(expiry: &ExpiryDate, today: NaiveDate) -> bool {
    (expiry.year(), expiry.month()) < (today.year(), today.month())
}
