//! Validate command - check a card number.

use clap::Args;
use console::style;
use serde::Serialize;

use cardscan_core::card::validation::{luhn_check_digit, validate_luhn};
use cardscan_core::models::card::{CardNumber, CardScheme};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Card number; spaces and dashes are ignored
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    number: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Print the full number instead of a masked one
    #[arg(long)]
    reveal: bool,
}

#[derive(Debug, Serialize)]
struct Validation {
    number: String,
    valid: bool,
    luhn_valid: bool,
    length_ok: bool,
    scheme: &'static str,
    scheme_length_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_check_digit: Option<u32>,
}

fn validate_number(input: &str, reveal: bool) -> anyhow::Result<Validation> {
    let digits: String = input.chars().filter(|c| !matches!(c, ' ' | '-')).collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        anyhow::bail!("Not a card number: {}", input);
    }

    let card = CardNumber::new(digits.as_str());
    let luhn_valid = validate_luhn(&digits);
    let scheme = CardScheme::detect(&digits);

    let number = match &card {
        Some(card) if reveal => card.formatted(),
        Some(card) => card.masked(),
        None => digits.clone(),
    };

    let expected_check_digit = if luhn_valid {
        None
    } else {
        luhn_check_digit(&digits[..digits.len() - 1])
    };

    Ok(Validation {
        number,
        valid: card.is_some() && luhn_valid,
        luhn_valid,
        length_ok: card.is_some(),
        scheme: scheme.display_name(),
        scheme_length_ok: card.as_ref().is_some_and(|c| c.has_scheme_length()),
        expected_check_digit,
    })
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let input = args.number.join(" ");
    let result = validate_number(&input, args.reveal)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let verdict = if result.valid {
            style("✓ valid").green()
        } else {
            style("✗ invalid").red()
        };
        println!("{} {}", result.number, verdict);
        if result.length_ok && !result.scheme_length_ok {
            println!("  Scheme: {} (unusual length for this scheme)", result.scheme);
        } else {
            println!("  Scheme: {}", result.scheme);
        }
        println!("  Length: {}", if result.length_ok { "ok" } else { "out of range (13-19)" });
        println!("  Luhn:   {}", if result.luhn_valid { "pass" } else { "fail" });
        if let Some(digit) = result.expected_check_digit {
            println!("  Expected check digit: {}", digit);
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_number() {
        let result = validate_number("4539 1488 0343 6467", false).unwrap();
        assert!(result.valid);
        assert_eq!(result.number, "453914******6467");
        assert_eq!(result.scheme, "Visa");
        assert!(result.scheme_length_ok);
        assert_eq!(result.expected_check_digit, None);
    }

    #[test]
    fn test_unusual_scheme_length() {
        // Mastercard prefix with 15 digits
        let result = validate_number("555555555555444", false).unwrap();
        assert!(result.length_ok);
        assert_eq!(result.scheme, "Mastercard");
        assert!(!result.scheme_length_ok);
    }

    #[test]
    fn test_typo_reports_check_digit() {
        let result = validate_number("4539-1488-0343-6468", true).unwrap();
        assert!(!result.valid);
        assert!(result.length_ok);
        assert_eq!(result.number, "4539 1488 0343 6468");
        assert_eq!(result.expected_check_digit, Some(7));
    }

    #[test]
    fn test_short_number() {
        let result = validate_number("79927398713", false).unwrap();
        assert!(result.luhn_valid);
        assert!(!result.length_ok);
        assert!(!result.valid);
        assert_eq!(result.number, "79927398713");
    }

    #[test]
    fn test_rejects_letters() {
        assert!(validate_number("4539 ABCD", false).is_err());
    }
}
