//! Payment card data models.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::card::validation::validate_luhn;

/// The kind of field a text line can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Primary account number.
    Number,
    /// Embossed card holder name.
    Holder,
    /// Expiry month and year.
    Expiry,
}

impl FieldKind {
    /// All field kinds in display order.
    pub const ALL: [FieldKind; 3] = [FieldKind::Number, FieldKind::Holder, FieldKind::Expiry];

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::Holder => "holder",
            FieldKind::Expiry => "expiry",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card network, detected from the issuer identification number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardScheme {
    Visa,
    Mastercard,
    AmericanExpress,
    Discover,
    Jcb,
    DinersClub,
    UnionPay,
    Maestro,
    Mir,
    Unknown,
}

impl CardScheme {
    /// Detect the scheme from the leading digits of a card number.
    pub fn detect(digits: &str) -> Self {
        let p1 = prefix(digits, 1);
        let p2 = prefix(digits, 2);
        let p3 = prefix(digits, 3);
        let p4 = prefix(digits, 4);

        if matches!(p2, Some(34 | 37)) {
            CardScheme::AmericanExpress
        } else if matches!(p3, Some(300..=305)) || matches!(p2, Some(36 | 38 | 39)) {
            CardScheme::DinersClub
        } else if matches!(p4, Some(3528..=3589)) {
            CardScheme::Jcb
        } else if p1 == Some(4) {
            CardScheme::Visa
        } else if matches!(p4, Some(2200..=2204)) {
            CardScheme::Mir
        } else if matches!(p2, Some(51..=55)) || matches!(p4, Some(2221..=2720)) {
            CardScheme::Mastercard
        } else if p4 == Some(6011) || matches!(p3, Some(644..=649)) || p2 == Some(65) {
            CardScheme::Discover
        } else if p2 == Some(62) {
            CardScheme::UnionPay
        } else if matches!(p2, Some(50 | 56..=58 | 63 | 67)) {
            CardScheme::Maestro
        } else {
            CardScheme::Unknown
        }
    }

    /// Number lengths issued under this scheme.
    pub fn lengths(&self) -> &'static [usize] {
        match self {
            CardScheme::Visa => &[13, 16, 19],
            CardScheme::Mastercard => &[16],
            CardScheme::AmericanExpress => &[15],
            CardScheme::Discover | CardScheme::Jcb | CardScheme::UnionPay | CardScheme::Mir => {
                &[16, 17, 18, 19]
            }
            CardScheme::DinersClub => &[14, 15, 16, 17, 18, 19],
            CardScheme::Maestro | CardScheme::Unknown => &[13, 14, 15, 16, 17, 18, 19],
        }
    }

    /// Human-readable scheme name.
    pub fn display_name(&self) -> &'static str {
        match self {
            CardScheme::Visa => "Visa",
            CardScheme::Mastercard => "Mastercard",
            CardScheme::AmericanExpress => "American Express",
            CardScheme::Discover => "Discover",
            CardScheme::Jcb => "JCB",
            CardScheme::DinersClub => "Diners Club",
            CardScheme::UnionPay => "UnionPay",
            CardScheme::Maestro => "Maestro",
            CardScheme::Mir => "Mir",
            CardScheme::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CardScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn prefix(digits: &str, len: usize) -> Option<u32> {
    digits.get(..len)?.parse().ok()
}

/// A well-formed card number: 13 to 19 ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CardNumber {
    digits: String,
    scheme: CardScheme,
    luhn_valid: bool,
}

impl CardNumber {
    /// Shortest accepted number length.
    pub const MIN_LEN: usize = 13;
    /// Longest accepted number length.
    pub const MAX_LEN: usize = 19;

    /// Build from a normalized digit string. Returns `None` unless the input
    /// is 13 to 19 ASCII digits.
    pub fn new(digits: impl Into<String>) -> Option<Self> {
        let digits = digits.into();
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&digits.len())
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let scheme = CardScheme::detect(&digits);
        let luhn_valid = validate_luhn(&digits);

        Some(Self {
            digits,
            scheme,
            luhn_valid,
        })
    }

    /// The digit string.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn scheme(&self) -> CardScheme {
        self.scheme
    }

    /// Whether the number passes the Luhn checksum.
    pub fn is_luhn_valid(&self) -> bool {
        self.luhn_valid
    }

    /// Whether the length is one the detected scheme issues.
    pub fn has_scheme_length(&self) -> bool {
        self.scheme.lengths().contains(&self.digits.len())
    }

    pub fn last_four(&self) -> &str {
        &self.digits[self.digits.len() - 4..]
    }

    /// First six and last four digits visible, the rest starred.
    pub fn masked(&self) -> String {
        let len = self.digits.len();
        format!(
            "{}{}{}",
            &self.digits[..6],
            "*".repeat(len - 10),
            &self.digits[len - 4..]
        )
    }

    /// Digits grouped the way the scheme prints them.
    pub fn formatted(&self) -> String {
        crate::card::rules::format_card_number(&self.digits)
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Card expiry month. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExpiryDate {
    year: i32,
    month: u32,
}

impl ExpiryDate {
    /// Build from a month (1-12) and a four-digit year.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// `MM/YY` form as printed on cards.
    pub fn short(&self) -> String {
        format!("{:02}/{:02}", self.month, self.year % 100)
    }

    /// Last calendar day on which the card is valid.
    pub fn last_valid_day(&self) -> Option<NaiveDate> {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// A scanned card. Fields that were not required by the scan are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreditCardModel {
    /// Card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<CardNumber>,

    /// Holder name, uppercase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,

    /// Expiry date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<ExpiryDate>,
}

impl fmt::Display for CreditCardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(number) = &self.number {
            parts.push(format!("number={} ({})", number.masked(), number.scheme()));
        }
        if let Some(holder) = &self.holder {
            parts.push(format!("holder={}", holder));
        }
        if let Some(expiry) = &self.expiry {
            parts.push(format!("expiry={}", expiry));
        }
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scheme_detection() {
        assert_eq!(CardScheme::detect("4539148803436467"), CardScheme::Visa);
        assert_eq!(CardScheme::detect("5555555555554444"), CardScheme::Mastercard);
        assert_eq!(CardScheme::detect("2223003122003222"), CardScheme::Mastercard);
        assert_eq!(CardScheme::detect("378282246310005"), CardScheme::AmericanExpress);
        assert_eq!(CardScheme::detect("6011111111111117"), CardScheme::Discover);
        assert_eq!(CardScheme::detect("3530111333300000"), CardScheme::Jcb);
        assert_eq!(CardScheme::detect("30569309025904"), CardScheme::DinersClub);
        assert_eq!(CardScheme::detect("6200000000000005"), CardScheme::UnionPay);
        assert_eq!(CardScheme::detect("2200000000000004"), CardScheme::Mir);
        assert_eq!(CardScheme::detect("6759649826438453"), CardScheme::Maestro);
        assert_eq!(CardScheme::detect("9999999999999"), CardScheme::Unknown);
    }

    #[test]
    fn test_scheme_lengths() {
        let cases = [
            ("4222222222222", true),
            ("4539148803436467", true),
            ("45391488034364", false),
            ("5555555555554444", true),
            ("555555555555444", false),
            ("378282246310005", true),
            ("3782822463100050", false),
            ("6011111111111117", true),
            ("601111111111111", false),
            ("3530111333300000", true),
            ("353011133330000", false),
            ("30569309025904", true),
            ("3056930902590", false),
            ("6200000000000005", true),
            ("620000000000000", false),
            ("2200000000000004", true),
            ("220000000000000", false),
            ("6759649826438453", true),
            ("9999999999999", true),
        ];

        for (digits, expected) in cases {
            let number = CardNumber::new(digits).unwrap();
            assert_eq!(number.has_scheme_length(), expected, "{} ({})", digits, number.scheme());
        }
    }

    #[test]
    fn test_card_number_rejects_bad_input() {
        assert!(CardNumber::new("123456789012").is_none());
        assert!(CardNumber::new("12345678901234567890").is_none());
        assert!(CardNumber::new("4539 1488 0343 6467").is_none());
    }

    #[test]
    fn test_card_number_attributes() {
        let number = CardNumber::new("4539148803436467").unwrap();
        assert_eq!(number.scheme(), CardScheme::Visa);
        assert!(number.is_luhn_valid());
        assert_eq!(number.last_four(), "6467");
        assert_eq!(number.masked(), "453914******6467");
        assert_eq!(number.to_string(), "453914******6467");

        let bad = CardNumber::new("4539148803436468").unwrap();
        assert!(!bad.is_luhn_valid());
    }

    #[test]
    fn test_expiry_date() {
        assert!(ExpiryDate::new(0, 2027).is_none());
        assert!(ExpiryDate::new(13, 2027).is_none());
        assert!(ExpiryDate::new(9, 27).is_none());

        let expiry = ExpiryDate::new(9, 2027).unwrap();
        assert_eq!(expiry.to_string(), "09/2027");
        assert_eq!(expiry.short(), "09/27");
        assert_eq!(expiry.last_valid_day(), NaiveDate::from_ymd_opt(2027, 9, 30));

        let december = ExpiryDate::new(12, 2027).unwrap();
        assert_eq!(december.last_valid_day(), NaiveDate::from_ymd_opt(2027, 12, 31));
        assert!(december > expiry);
        assert!(ExpiryDate::new(1, 2028).unwrap() > december);
    }

    #[test]
    fn test_model_serialization_skips_disabled_fields() {
        let model = CreditCardModel {
            number: CardNumber::new("4539148803436467"),
            holder: Some("JOHN SMITH".to_string()),
            expiry: None,
        };

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["number"]["digits"], "4539148803436467");
        assert_eq!(json["number"]["scheme"], "visa");
        assert_eq!(json["holder"], "JOHN SMITH");
        assert!(json.get("expiry").is_none());
    }

    #[test]
    fn test_model_display_masks_number() {
        let model = CreditCardModel {
            number: CardNumber::new("4539148803436467"),
            holder: Some("JOHN SMITH".to_string()),
            expiry: ExpiryDate::new(9, 2027),
        };
        assert_eq!(
            model.to_string(),
            "number=453914******6467 (Visa) holder=JOHN SMITH expiry=09/2027"
        );
    }
}
