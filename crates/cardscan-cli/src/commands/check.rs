//! Check command - show how each matcher classifies individual lines.

use clap::Args;
use console::style;
use serde::Serialize;

use cardscan_core::card::{Candidate, CardScanner};

use super::{load_config, ScanOverrides};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Lines to classify
    #[arg(required = true)]
    lines: Vec<String>,

    /// Print the classification as JSON
    #[arg(long)]
    json: bool,

    /// Print full card numbers instead of masked ones
    #[arg(long)]
    reveal: bool,

    #[command(flatten)]
    overrides: ScanOverrides,
}

#[derive(Debug, Serialize)]
struct Classification {
    line: String,
    matches: Vec<Match>,
}

#[derive(Debug, Serialize)]
struct Match {
    field: &'static str,
    value: String,
    confidence: f32,
}

impl Match {
    fn new(candidate: &Candidate, reveal: bool) -> Self {
        let value = match candidate {
            Candidate::Number(m) if reveal => m.value.formatted(),
            other => other.describe(),
        };

        Self {
            field: candidate.kind().as_str(),
            value,
            confidence: candidate.confidence(),
        }
    }
}

pub fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let scanner = CardScanner::new(args.overrides.apply(config.scan))?;

    let classifications: Vec<Classification> = args
        .lines
        .iter()
        .map(|line| Classification {
            line: line.clone(),
            matches: scanner
                .classify_line(line)
                .iter()
                .map(|c| Match::new(c, args.reveal))
                .collect(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&classifications)?);
        return Ok(());
    }

    for classification in &classifications {
        println!("{}", style(&classification.line).bold());
        if classification.matches.is_empty() {
            println!("  {} no match", style("✗").red());
        }
        for m in &classification.matches {
            println!(
                "  {} {:<7} {} ({:.0}%)",
                style("✓").green(),
                m.field,
                m.value,
                m.confidence * 100.0
            );
        }
    }

    Ok(())
}
