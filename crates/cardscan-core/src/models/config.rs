//! Configuration structures for card scanning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Main configuration for the cardscan pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardscanConfig {
    /// Field extraction and session configuration.
    pub scan: ScanConfig,

    /// Native OCR backend configuration.
    pub ocr: OcrConfig,
}

/// Which fields a scan requires and how candidates are validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Require the card number.
    pub check_card_number: bool,

    /// Require the card holder name.
    pub check_card_holder: bool,

    /// Require the expiry date.
    pub check_card_expiry_date: bool,

    /// Require card numbers to pass the Luhn checksum.
    pub use_luhn_validation: bool,

    /// Trace matched lines and assembled cards at info level, and surface
    /// recognition failures to the caller.
    pub debug_logging: bool,

    /// Discard expiry dates whose month has already ended.
    pub reject_expired: bool,

    /// Map common OCR letter/digit confusions on number lines.
    pub auto_correct: bool,

    /// How repeated candidates for an already filled field are handled.
    pub merge_policy: MergePolicy,

    /// Delay after each pass before the next frame is accepted.
    pub cooldown_ms: u64,

    /// Additional words that mark a line as "not a holder name".
    pub extra_deny_words: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            check_card_number: true,
            check_card_holder: true,
            check_card_expiry_date: true,
            use_luhn_validation: true,
            debug_logging: false,
            reject_expired: false,
            auto_correct: false,
            merge_policy: MergePolicy::KeepFirst,
            cooldown_ms: 0,
            extra_deny_words: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Cooldown as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Set which fields are required.
    pub fn with_fields(mut self, number: bool, holder: bool, expiry: bool) -> Self {
        self.check_card_number = number;
        self.check_card_holder = holder;
        self.check_card_expiry_date = expiry;
        self
    }

    /// Set Luhn validation.
    pub fn with_luhn_validation(mut self, validate: bool) -> Self {
        self.use_luhn_validation = validate;
        self
    }

    /// Set the merge policy.
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Set the cooldown between passes.
    pub fn with_cooldown_ms(mut self, cooldown_ms: u64) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    /// Set debug logging.
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// True when no field is required at all.
    pub fn requires_nothing(&self) -> bool {
        !self.check_card_number && !self.check_card_holder && !self.check_card_expiry_date
    }

    /// Check that the configuration can ever produce a card.
    pub fn validate(&self) -> crate::Result<()> {
        if self.requires_nothing() {
            return Err(ScanError::Config(
                "at least one of check_card_number, check_card_holder, check_card_expiry_date must be enabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Policy applied when a field already holds a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keep the stored value unless the new candidate is strictly more confident.
    #[default]
    KeepFirst,
    /// Overwrite with every later valid candidate.
    KeepLatest,
}

/// Native OCR backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

impl CardscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_require_all_fields() {
        let config = ScanConfig::default();
        assert!(config.check_card_number);
        assert!(config.check_card_holder);
        assert!(config.check_card_expiry_date);
        assert!(config.use_luhn_validation);
        assert!(!config.debug_logging);
        assert_eq!(config.merge_policy, MergePolicy::KeepFirst);
    }

    #[test]
    fn test_validate_rejects_empty_field_set() {
        assert!(ScanConfig::default().validate().is_ok());
        assert!(ScanConfig::default().with_fields(false, true, false).validate().is_ok());

        let err = ScanConfig::default()
            .with_fields(false, false, false)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CardscanConfig =
            serde_json::from_str(r#"{"scan": {"check_card_holder": false, "merge_policy": "keep_latest"}}"#)
                .unwrap();

        assert!(!config.scan.check_card_holder);
        assert!(config.scan.check_card_number);
        assert_eq!(config.scan.merge_policy, MergePolicy::KeepLatest);
        assert_eq!(config.ocr, OcrConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CardscanConfig::default();
        config.scan.cooldown_ms = 500;
        config.scan.extra_deny_words = vec!["ACME".to_string()];
        config.save(&path).unwrap();

        let loaded = CardscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.scan.cooldown(), Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CardscanConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
