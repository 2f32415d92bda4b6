//! Best-known field values across the frames of one scanning session.

use tracing::debug;

use super::rules::ExtractionMatch;
use crate::models::card::{CardNumber, CreditCardModel, ExpiryDate, FieldKind};
use crate::models::config::{MergePolicy, ScanConfig};

/// A candidate value for one field, extracted from a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Number(ExtractionMatch<CardNumber>),
    Holder(ExtractionMatch<String>),
    Expiry(ExtractionMatch<ExpiryDate>),
}

impl Candidate {
    /// The field this candidate is for.
    pub fn kind(&self) -> FieldKind {
        match self {
            Candidate::Number(_) => FieldKind::Number,
            Candidate::Holder(_) => FieldKind::Holder,
            Candidate::Expiry(_) => FieldKind::Expiry,
        }
    }

    pub fn confidence(&self) -> f32 {
        match self {
            Candidate::Number(m) => m.confidence,
            Candidate::Holder(m) => m.confidence,
            Candidate::Expiry(m) => m.confidence,
        }
    }

    /// The line the candidate came from.
    pub fn source(&self) -> &str {
        match self {
            Candidate::Number(m) => &m.source,
            Candidate::Holder(m) => &m.source,
            Candidate::Expiry(m) => &m.source,
        }
    }

    /// Value rendered for logs, with the card number masked.
    pub fn describe(&self) -> String {
        match self {
            Candidate::Number(m) => m.value.masked(),
            Candidate::Holder(m) => m.value.clone(),
            Candidate::Expiry(m) => m.value.to_string(),
        }
    }
}

/// One slot per field kind, filled by offered candidates.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    policy: MergePolicy,
    number: Option<ExtractionMatch<CardNumber>>,
    holder: Option<ExtractionMatch<String>>,
    expiry: Option<ExtractionMatch<ExpiryDate>>,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Offer a candidate. Returns `true` if the stored state changed.
    pub fn offer(&mut self, candidate: Candidate) -> bool {
        let kind = candidate.kind();
        let changed = match candidate {
            Candidate::Number(m) => merge_slot(&mut self.number, m, self.policy),
            Candidate::Holder(m) => merge_slot(&mut self.holder, m, self.policy),
            Candidate::Expiry(m) => merge_slot(&mut self.expiry, m, self.policy),
        };

        if changed {
            debug!("Accumulator updated {} slot", kind);
        }

        changed
    }

    /// True iff every field enabled in `config` holds a value.
    pub fn is_complete(&self, config: &ScanConfig) -> bool {
        (!config.check_card_number || self.number.is_some())
            && (!config.check_card_holder || self.holder.is_some())
            && (!config.check_card_expiry_date || self.expiry.is_some())
    }

    /// Assemble a card from the stored values, or `None` while incomplete.
    ///
    /// Fields not enabled in `config` are left empty.
    pub fn snapshot(&self, config: &ScanConfig) -> Option<CreditCardModel> {
        if !self.is_complete(config) {
            return None;
        }

        Some(CreditCardModel {
            number: config
                .check_card_number
                .then(|| self.number().cloned())
                .flatten(),
            holder: config
                .check_card_holder
                .then(|| self.holder().map(str::to_string))
                .flatten(),
            expiry: config
                .check_card_expiry_date
                .then(|| self.expiry().copied())
                .flatten(),
        })
    }

    /// Clear every slot.
    pub fn reset(&mut self) {
        self.number = None;
        self.holder = None;
        self.expiry = None;
    }

    pub fn number(&self) -> Option<&CardNumber> {
        self.number.as_ref().map(|m| &m.value)
    }

    pub fn holder(&self) -> Option<&str> {
        self.holder.as_ref().map(|m| m.value.as_str())
    }

    pub fn expiry(&self) -> Option<&ExpiryDate> {
        self.expiry.as_ref().map(|m| &m.value)
    }

    /// Confidence of the value stored for `kind`.
    pub fn confidence(&self, kind: FieldKind) -> Option<f32> {
        match kind {
            FieldKind::Number => self.number.as_ref().map(|m| m.confidence),
            FieldKind::Holder => self.holder.as_ref().map(|m| m.confidence),
            FieldKind::Expiry => self.expiry.as_ref().map(|m| m.confidence),
        }
    }

    /// Field kinds that currently hold a value.
    pub fn filled(&self) -> Vec<FieldKind> {
        FieldKind::ALL
            .into_iter()
            .filter(|&kind| self.confidence(kind).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.holder.is_none() && self.expiry.is_none()
    }
}

fn merge_slot<T: PartialEq>(
    slot: &mut Option<ExtractionMatch<T>>,
    candidate: ExtractionMatch<T>,
    policy: MergePolicy,
) -> bool {
    let replace = match slot.as_ref() {
        None => true,
        // Same value read again: only a more confident reading is kept
        Some(current) if current.value == candidate.value => {
            candidate.confidence > current.confidence
        }
        Some(current) => match policy {
            MergePolicy::KeepFirst => candidate.confidence > current.confidence,
            MergePolicy::KeepLatest => true,
        },
    };

    if replace {
        *slot = Some(candidate);
    }
    replace
}
