//! Image command - run native OCR over image frames and scan them in order.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use tracing::{debug, info, warn};

use cardscan_core::ocr::{Frame, OnnxRecognizer};
use cardscan_core::{ScanError, ScanSession};

use super::scan::{progress_bar, write_report, OutputFormat, ScanReport};
use super::{load_config, ScanOverrides};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "webp"];

/// Arguments for the image command.
#[derive(Args)]
pub struct ImageArgs {
    /// Image files or glob pattern; each image is one frame, in sorted order
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory (overrides ocr.model_dir)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Print full card numbers instead of masked ones
    #[arg(long)]
    reveal: bool,

    /// Stop after the first emitted card
    #[arg(long)]
    first: bool,

    /// Continue when an image cannot be loaded or recognized
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    overrides: ScanOverrides,
}

/// Expand the frame pattern into image paths, sorted so frame order is stable.
fn frame_paths(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
        .collect();
    files.sort();
    Ok(files)
}

pub async fn run(args: ImageArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let scan_config = args.overrides.apply(config.scan);

    let files = frame_paths(&args.input)?;
    if files.is_empty() {
        return Err(ScanError::NoDeviceAvailable(format!(
            "no image frames match {}",
            args.input
        ))
        .into());
    }

    eprintln!(
        "{} Found {} frames to scan",
        style("ℹ").blue(),
        files.len()
    );

    let mut ocr_config = config.ocr;
    if let Some(model_dir) = args.model_dir.clone() {
        ocr_config.model_dir = model_dir;
    }

    let recognizer = OnnxRecognizer::from_config(ocr_config)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
    let session = ScanSession::new(recognizer, scan_config)?;

    let pb = progress_bar(files.len() as u64);
    let mut report = ScanReport::default();

    for (index, path) in files.iter().enumerate() {
        let frame_id = index as u64 + 1;
        pb.set_message(format!("{}", path.display()));

        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) if args.continue_on_error => {
                warn!("Failed to load {}: {}", path.display(), e);
                report.record_failure();
                pb.inc(1);
                continue;
            }
            Err(e) => {
                pb.abandon_with_message("Failed");
                anyhow::bail!("Failed to load {}: {}", path.display(), e);
            }
        };

        debug!("Frame {} is {}", frame_id, path.display());

        match session.submit(Frame::new(frame_id, image)).await {
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
                anyhow::bail!("Frame {} ({}) failed: {}", frame_id, path.display(), e);
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    write_report(&report, args.format, args.output.as_deref())?;

    info!("Scanned {} frames in {:?}", report.frames, start.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_paths_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame_02.png", "frame_01.PNG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pattern = format!("{}/*", dir.path().display());
        let files = frame_paths(&pattern).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["frame_01.PNG", "frame_02.png"]);
    }

    #[test]
    fn test_frame_paths_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.png", dir.path().display());
        assert!(frame_paths(&pattern).unwrap().is_empty());
    }
}
