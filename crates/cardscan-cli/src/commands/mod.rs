//! CLI subcommands.

pub mod check;
pub mod config;
pub mod images;
pub mod scan;
pub mod validate;

use std::path::{Path, PathBuf};

use tracing::debug;

use cardscan_core::models::config::{CardscanConfig, ScanConfig};

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardscan")
        .join("config.json")
}

/// Resolve the configuration file: the `--config` flag, else the default location.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration. An explicit path must exist; the default location
/// falls back to built-in defaults when absent.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CardscanConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path);
        return Ok(CardscanConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(CardscanConfig::from_file(&path)?)
    } else {
        Ok(CardscanConfig::default())
    }
}

/// Scan options shared by the `scan` and `image` commands.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ScanOverrides {
    /// Field to leave out of the scan (repeatable)
    #[arg(long, value_enum)]
    skip: Vec<FieldArg>,

    /// Accept card numbers that fail the Luhn checksum
    #[arg(long)]
    no_luhn: bool,

    /// Reject expiry dates in the past
    #[arg(long)]
    reject_expired: bool,

    /// Correct common OCR digit confusions in number lines
    #[arg(long)]
    auto_correct: bool,

    /// Trace matches at info level and fail on recognition errors
    #[arg(long)]
    debug: bool,
}

impl ScanOverrides {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, mut config: ScanConfig) -> ScanConfig {
        for field in &self.skip {
            match field {
                FieldArg::Number => config.check_card_number = false,
                FieldArg::Holder => config.check_card_holder = false,
                FieldArg::Expiry => config.check_card_expiry_date = false,
            }
        }
        if self.no_luhn {
            config.use_luhn_validation = false;
        }
        if self.reject_expired {
            config.reject_expired = true;
        }
        if self.auto_correct {
            config.auto_correct = true;
        }
        if self.debug {
            config.debug_logging = true;
        }
        config
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FieldArg {
    /// Card number
    Number,
    /// Holder name
    Holder,
    /// Expiry date
    Expiry,
}
