//! CLI application for payment card OCR scanning.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{check, config, images, scan, validate};

/// Payment card OCR - Extract the number, holder, and expiry date from card scans
#[derive(Parser)]
#[command(name = "cardscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded OCR transcript through a scan session
    Scan(scan::ScanArgs),

    /// Run OCR over image frames and scan them in order
    Image(images::ImageArgs),

    /// Show how each matcher classifies the given lines
    Check(check::CheckArgs),

    /// Validate a card number
    Validate(validate::ValidateArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Scan(args) => scan::run(args, config_path).await,
        Commands::Image(args) => images::run(args, config_path).await,
        Commands::Check(args) => check::run(args, config_path),
        Commands::Validate(args) => validate::run(args),
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
