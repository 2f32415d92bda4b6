//! Scan command - replay a recorded OCR transcript through a scan session.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use cardscan_core::models::card::CreditCardModel;
use cardscan_core::ocr::{ScriptedRecognizer, Transcript};
use cardscan_core::{FrameOutcome, ScanSession};

use super::{load_config, ScanOverrides};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Transcript file (.json, or plain text with blank-line separated frames)
    #[arg(required = true)]
    transcript: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print full card numbers instead of masked ones
    #[arg(long)]
    reveal: bool,

    /// Stop after the first emitted card
    #[arg(long)]
    first: bool,

    /// Keep going when a frame fails recognition in debug mode
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    overrides: ScanOverrides,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// One emitted card, as printed.
#[derive(Debug, Serialize)]
pub struct CardRecord {
    pub frame_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}

impl CardRecord {
    pub fn new(frame_id: u64, card: &CreditCardModel, reveal: bool) -> Self {
        Self {
            frame_id,
            number: card.number.as_ref().map(|n| {
                if reveal {
                    n.formatted()
                } else {
                    n.masked()
                }
            }),
            scheme: card.number.as_ref().map(|n| n.scheme().display_name().to_string()),
            holder: card.holder.clone(),
            expiry: card.expiry.map(|e| e.to_string()),
        }
    }
}

/// Summary of a scan run.
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    pub frames: usize,
    pub dropped: usize,
    pub failed: usize,
    pub cards: Vec<CardRecord>,
}

impl ScanReport {
    /// Account for one submitted frame.
    pub fn record(&mut self, outcome: &FrameOutcome, reveal: bool) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Dropped { .. } => self.dropped += 1,
            FrameOutcome::Pending { .. } => {}
            FrameOutcome::Emitted { frame_id, card } => {
                self.cards.push(CardRecord::new(*frame_id, card, reveal));
            }
        }
    }

    pub fn record_failure(&mut self) {
        self.frames += 1;
        self.failed += 1;
    }
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let scan_config = args.overrides.apply(config.scan);

    if !args.transcript.exists() {
        anyhow::bail!("Transcript not found: {}", args.transcript.display());
    }

    let transcript = Transcript::from_file(&args.transcript)?;
    if transcript.is_empty() {
        anyhow::bail!("Transcript has no frames: {}", args.transcript.display());
    }

    info!(
        "Replaying {} frames from {}",
        transcript.len(),
        args.transcript.display()
    );

    let pb = progress_bar(transcript.len() as u64);
    let session = ScanSession::new(ScriptedRecognizer::new(), scan_config)?;
    let mut report = ScanReport::default();

    for frame in transcript.into_frames() {
        let frame_id = frame.id;
        pb.set_message(format!("Frame {}", frame_id));

        match session.submit(frame).await {
            Ok(outcome) => {
                let emitted = outcome.card().is_some();
                report.record(&outcome, args.reveal);
                if emitted && args.first {
                    pb.inc(1);
                    break;
                }
            }
            Err(e) if args.continue_on_error => {
                warn!("Frame {} failed: {}", frame_id, e);
                report.record_failure();
            }
            Err(e) => {
                pb.abandon_with_message("Failed");
                anyhow::bail!("Frame {} failed: {}", frame_id, e);
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    write_report(&report, args.format, args.output.as_deref())?;

    debug!("Total scan time: {:?}", start.elapsed());

    Ok(())
}

pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}

/// Print the report to stdout or write it to `output`.
pub fn write_report(report: &ScanReport, format: OutputFormat, output: Option<&Path>) -> anyhow::Result<()> {
    let rendered = format_report(report, format)?;

    if let Some(output_path) = output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", rendered);
    }

    if report.cards.is_empty() {
        eprintln!(
            "{} No card found in {} frames",
            style("ℹ").blue(),
            report.frames
        );
    }

    Ok(())
}

fn format_report(report: &ScanReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(report)?)),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(report: &ScanReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["frame_id", "number", "scheme", "holder", "expiry"])?;

    for card in &report.cards {
        let frame_id = card.frame_id.to_string();
        wtr.write_record([
            frame_id.as_str(),
            card.number.as_deref().unwrap_or_default(),
            card.scheme.as_deref().unwrap_or_default(),
            card.holder.as_deref().unwrap_or_default(),
            card.expiry.as_deref().unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ScanReport) -> String {
    let mut output = String::new();

    for (i, card) in report.cards.iter().enumerate() {
        output.push_str(&format!("Card {} (frame {}):\n", i + 1, card.frame_id));
        if let Some(number) = &card.number {
            let scheme = card.scheme.as_deref().unwrap_or("Unknown");
            output.push_str(&format!("  Number: {} ({})\n", number, scheme));
        }
        if let Some(holder) = &card.holder {
            output.push_str(&format!("  Holder: {}\n", holder));
        }
        if let Some(expiry) = &card.expiry {
            output.push_str(&format!("  Expiry: {}\n", expiry));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Frames: {} processed, {} dropped, {} failed\n",
        report.frames, report.dropped, report.failed
    ));

    output
}
