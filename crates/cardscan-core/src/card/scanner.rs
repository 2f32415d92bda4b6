//! Per-batch classification: matchers over every line, accumulation, emission.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use super::accumulator::{Accumulator, Candidate};
use super::rules::{ExpiryExtractor, FieldExtractor, HolderExtractor, NumberExtractor};
use crate::error::Result;
use crate::models::card::CreditCardModel;
use crate::models::config::ScanConfig;

/// Scanner state between batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    /// Accepting batches and accumulating fields.
    Scanning,
    /// The last batch completed a card; the next batch starts a new scan.
    Complete,
}

/// Classifies recognized text batches and emits a card once every enabled
/// field is known.
///
/// The scanner is synchronous and backend-agnostic. It owns its accumulator,
/// so values persist across batches until a card is emitted or
/// [`CardScanner::reset`] is called.
pub struct CardScanner {
    config: ScanConfig,
    numbers: NumberExtractor,
    holders: HolderExtractor,
    expiries: ExpiryExtractor,
    accumulator: Accumulator,
    state: ScanState,
    batches: u64,
    emissions: u64,
}

impl CardScanner {
    /// Create a scanner. Expiry checks, when enabled, use today's local date.
    pub fn new(config: ScanConfig) -> Result<Self> {
        Self::with_reference_date(config, Local::now().date_naive())
    }

    /// Create a scanner that judges expiry against `today`.
    pub fn with_reference_date(config: ScanConfig, today: NaiveDate) -> Result<Self> {
        config.validate()?;

        let numbers = NumberExtractor::new()
            .with_validation(config.use_luhn_validation)
            .with_auto_correct(config.auto_correct);
        let holders = HolderExtractor::new().with_deny_words(&config.extra_deny_words);
        let expiries = if config.reject_expired {
            ExpiryExtractor::new().with_expiry_check(today)
        } else {
            ExpiryExtractor::new()
        };

        Ok(Self {
            accumulator: Accumulator::new(config.merge_policy),
            config,
            numbers,
            holders,
            expiries,
            state: ScanState::Scanning,
            batches: 0,
            emissions: 0,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Number of batches processed so far.
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Number of cards emitted so far.
    pub fn emissions(&self) -> u64 {
        self.emissions
    }

    /// Read-only view of the accumulated fields.
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Run every enabled matcher over one line.
    pub fn classify_line(&self, line: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        if self.config.check_card_number {
            if let Some(m) = self.numbers.extract(line) {
                candidates.push(Candidate::Number(m));
            }
        }
        if self.config.check_card_holder {
            if let Some(m) = self.holders.extract(line) {
                candidates.push(Candidate::Holder(m));
            }
        }
        if self.config.check_card_expiry_date {
            if let Some(m) = self.expiries.extract(line) {
                candidates.push(Candidate::Expiry(m));
            }
        }

        candidates
    }

    /// Process the recognized lines of one frame.
    ///
    /// Returns the card exactly once, on the batch that completes it; the
    /// accumulator is reset at that point so stale frames cannot re-emit it.
    pub fn process_batch<I, S>(&mut self, lines: I) -> Option<CreditCardModel>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.batches += 1;
        self.state = ScanState::Scanning;

        let mut line_count = 0usize;
        let mut matched = 0usize;
        for line in lines {
            line_count += 1;
            for candidate in self.classify_line(line.as_ref()) {
                matched += 1;
                self.trace_candidate(&candidate);
                self.accumulator.offer(candidate);
            }
        }

        debug!(
            "Batch {}: {} lines, {} candidates, filled {:?}",
            self.batches,
            line_count,
            matched,
            self.accumulator.filled()
        );

        let model = self.accumulator.snapshot(&self.config)?;
        self.accumulator.reset();
        self.state = ScanState::Complete;
        self.emissions += 1;

        if self.config.debug_logging {
            info!("Assembled card at batch {}: {}", self.batches, model);
        } else {
            info!("Card scanned at batch {}", self.batches);
        }

        Some(model)
    }

    /// Drop every accumulated value and start over.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.state = ScanState::Scanning;
    }

    fn trace_candidate(&self, candidate: &Candidate) {
        if self.config.debug_logging {
            info!(
                "Matched {} {:?} -> {} (confidence {:.2})",
                candidate.kind(),
                mask_digits(candidate.source()),
                candidate.describe(),
                candidate.confidence()
            );
        } else {
            debug!(
                "Matched {} (confidence {:.2})",
                candidate.kind(),
                candidate.confidence()
            );
        }
    }
}

/// Replace all but the last four digits of a line before it is logged.
fn mask_digits(line: &str) -> String {
    let total = line.chars().filter(|c| c.is_ascii_digit()).count();
    if total < 8 {
        return line.to_string();
    }

    let mut seen = 0;
    line.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen <= total - 4 { '*' } else { c }
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::card::{CardNumber, ExpiryDate, FieldKind};
    use crate::models::config::MergePolicy;
    use pretty_assertions::assert_eq;

    fn scanner(config: ScanConfig) -> CardScanner {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        CardScanner::with_reference_date(config, today).unwrap()
    }

    #[test]
    fn test_single_frame_emits_card() {
        let mut scanner = scanner(ScanConfig::default());

        let model = scanner
            .process_batch(["4539 1488 0343 6467", "JOHN SMITH", "VALID THRU 09/27"])
            .unwrap();

        assert_eq!(
            model,
            CreditCardModel {
                number: CardNumber::new("4539148803436467"),
                holder: Some("JOHN SMITH".to_string()),
                expiry: ExpiryDate::new(9, 2027),
            }
        );
        assert_eq!(scanner.state(), ScanState::Complete);
        assert_eq!(scanner.emissions(), 1);
        assert!(scanner.accumulator().is_empty());
    }

    #[test]
    fn test_line_order_is_irrelevant() {
        let mut scanner = scanner(ScanConfig::default());
        let model = scanner.process_batch(["VALID THRU 09/27", "JOHN SMITH", "4539 1488 0343 6467"]);
        assert!(model.is_some());
    }

    #[test]
    fn test_short_number_never_emits() {
        let config = ScanConfig::default().with_fields(true, true, false);
        let mut scanner = scanner(config);

        assert_eq!(scanner.process_batch(["1234", "JOHN SMITH"]), None);
        assert_eq!(scanner.state(), ScanState::Scanning);
        assert_eq!(scanner.accumulator().filled(), vec![FieldKind::Holder]);
    }

    #[test]
    fn test_accumulates_across_frames() {
        let mut scanner = scanner(ScanConfig::default());

        assert_eq!(scanner.process_batch(["JOHN SMITH", "VALID THRU 09/27"]), None);
        assert_eq!(scanner.emissions(), 0);

        let model = scanner.process_batch(["4539 1488 0343 6467"]).unwrap();
        assert_eq!(model.holder.as_deref(), Some("JOHN SMITH"));
        assert_eq!(model.expiry, ExpiryDate::new(9, 2027));
        assert_eq!(scanner.batches(), 2);
        assert_eq!(scanner.emissions(), 1);
    }

    #[test]
    fn test_stale_frames_do_not_re_emit() {
        let mut scanner = scanner(ScanConfig::default());
        assert!(scanner.process_batch(["JOHN SMITH", "VALID THRU 09/27"]).is_none());
        assert!(scanner.process_batch(["4539 1488 0343 6467"]).is_some());

        // Partial stale frame after emission: fields must be collected again
        assert!(scanner.process_batch(["4539 1488 0343 6467"]).is_none());
        assert_eq!(scanner.state(), ScanState::Scanning);
        assert_eq!(scanner.emissions(), 1);

        assert!(scanner.process_batch(["JOHN SMITH", "09/27"]).is_some());
        assert_eq!(scanner.emissions(), 2);
    }

    #[test]
    fn test_disabled_fields_are_ignored() {
        let config = ScanConfig::default().with_fields(true, false, false);
        let mut scanner = scanner(config);

        assert!(scanner.classify_line("JOHN SMITH").is_empty());
        let model = scanner.process_batch(["JOHN SMITH", "4539148803436467"]).unwrap();
        assert_eq!(model.holder, None);
        assert_eq!(model.expiry, None);
        assert!(model.number.is_some());
    }

    #[test]
    fn test_noise_lines_are_ignored() {
        let mut scanner = scanner(ScanConfig::default());
        let model = scanner.process_batch([
            "VISA",
            "DEBIT",
            "",
            "4539 1488 0343 6468",
            "CUSTOMER SERVICE",
            "4539 1488 0343 6467",
            "JOHN SMITH",
            "MEMBER SINCE 2019",
            "VALID FROM 01/22 VALID THRU 09/27",
        ]);

        let model = model.unwrap();
        assert_eq!(model.number.unwrap().digits(), "4539148803436467");
        assert_eq!(model.expiry, ExpiryDate::new(9, 2027));
    }

    #[test]
    fn test_without_luhn_accepts_failing_number() {
        let config = ScanConfig::default()
            .with_fields(true, false, false)
            .with_luhn_validation(false);
        let mut scanner = scanner(config);

        let model = scanner.process_batch(["4539 1488 0343 6468"]).unwrap();
        assert!(!model.number.unwrap().is_luhn_valid());
    }

    #[test]
    fn test_reject_expired() {
        let mut config = ScanConfig::default().with_fields(false, false, true);
        config.reject_expired = true;
        let mut scanner = scanner(config);

        assert!(scanner.process_batch(["VALID THRU 09/26"]).is_none());
        assert!(scanner.process_batch(["VALID THRU 09/28"]).is_some());
    }

    #[test]
    fn test_keep_first_policy_across_frames() {
        let config = ScanConfig::default().with_fields(true, true, true);
        let mut scanner = scanner(config);

        scanner.process_batch(["JOHN SMITH"]);
        scanner.process_batch(["JOHN SMYTH", "4539 1488 0343 6467"]);
        let model = scanner.process_batch(["09/27"]).unwrap();
        assert_eq!(model.holder.as_deref(), Some("JOHN SMITH"));
    }

    #[test]
    fn test_keep_latest_policy_across_frames() {
        let config = ScanConfig::default().with_merge_policy(MergePolicy::KeepLatest);
        let mut scanner = scanner(config);

        scanner.process_batch(["JOHN SMITH"]);
        scanner.process_batch(["JOHN SMYTH", "4539 1488 0343 6467"]);
        let model = scanner.process_batch(["09/27"]).unwrap();
        assert_eq!(model.holder.as_deref(), Some("JOHN SMYTH"));
    }

    #[test]
    fn test_extra_deny_words_from_config() {
        let mut config = ScanConfig::default().with_fields(false, true, false);
        config.extra_deny_words = vec!["ACME".to_string()];
        let mut scanner = scanner(config);

        assert!(scanner.process_batch(["ACME FINANCIAL"]).is_none());
        assert!(scanner.process_batch(["JANE DOE"]).is_some());
    }

    #[test]
    fn test_reset_discards_partial_scan() {
        let mut scanner = scanner(ScanConfig::default());
        scanner.process_batch(["JOHN SMITH", "09/27"]);
        scanner.reset();
        assert!(scanner.process_batch(["4539 1488 0343 6467"]).is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScanConfig::default().with_fields(false, false, false);
        assert!(CardScanner::new(config).is_err());
    }

    #[test]
    fn test_mask_digits() {
        assert_eq!(mask_digits("4539 1488 0343 6467"), "**** **** **** 6467");
        assert_eq!(mask_digits("VALID THRU 09/27"), "VALID THRU 09/27");
    }
}
