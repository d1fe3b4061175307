//! forecast-diff: download FiveThirtyEight's state forecasts and
//! PredictIt's state markets, then print where they disagree most.
//!
//! Entry point. Parses the CLI, loads configuration, initialises
//! structured logging, and runs the fetch → diff → report pipeline once.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{error, info};

use forecast_diff::config::AppConfig;
use forecast_diff::engine::{report, run_pipeline};
use forecast_diff::sources::fivethirtyeight::FiveThirtyEightClient;
use forecast_diff::sources::predictit::PredictItClient;

const LOG_FILE_NAME: &str = "forecast_diff.log";

#[derive(Parser, Debug)]
#[command(name = "forecast-diff", version)]
#[command(about = "Download election forecasts from FiveThirtyEight and PredictIt and diff them")]
struct Cli {
    /// Verbose output (debug-level logging)
    #[arg(short, long)]
    verbose: bool,

    /// Directory to store the run log in
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,

    /// Config file path
    #[arg(short, long, default_value = "forecast-diff.toml")]
    config: PathBuf,

    /// Number of largest divergences to list (overrides the config)
    #[arg(short = 'n', long)]
    top: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose, &cli.directory)?;

    let started = Instant::now();
    info!(
        started_at = %chrono::Utc::now().to_rfc3339(),
        directory = %cli.directory.display(),
        "forecast-diff started"
    );

    if let Err(e) = run(&cli).await {
        error!(error = ?e, "forecast-diff failed");
        return Err(e);
    }

    info!(
        elapsed_secs = format!("{:.2}", started.elapsed().as_secs_f64()),
        "forecast-diff finished"
    );
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let cfg = AppConfig::load_or_default(&cli.config)?;
    let top_n = cli.top.unwrap_or(cfg.report.top_n);

    let fivethirtyeight = FiveThirtyEightClient::new(&cfg.sources)?;
    let predictit = PredictItClient::new(&cfg.sources, cfg.normalization.district_label.clone())?;

    let diff = run_pipeline(&fivethirtyeight, &predictit, top_n).await?;

    print!("{}", report::render(&diff));
    Ok(())
}

/// Level for the stderr layer. `-v` does not raise it; `RUST_LOG` does.
const STDERR_DIRECTIVE: &str = "forecast_diff=warn";

/// Level for the log file layer.
fn file_directive(verbose: bool) -> &'static str {
    if verbose {
        "forecast_diff=debug"
    } else {
        "forecast_diff=warn"
    }
}

/// Open (or create) the run log in `directory`, appending to earlier runs.
fn open_log_file(directory: &Path) -> Result<File> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory: {}", directory.display()))?;
    let log_path = directory.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))
}

/// Initialise the `tracing` subscriber: stderr plus a log file in `directory`.
///
/// Each layer has its own filter, so `-v` only makes the file verbose.
fn init_logging(verbose: bool, directory: &Path) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(STDERR_DIRECTIVE));
    let file_filter = EnvFilter::new(file_directive(verbose));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_writer(Mutex::new(open_log_file(directory)?))
        .with_filter(file_filter);

    let json_logging = std::env::var("FORECAST_DIFF_LOG_JSON").is_ok();
    let stderr_layer = if json_logging {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(stderr_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(stderr_filter)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
