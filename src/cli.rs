//! CLI argument parsing for driftwatch

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for detection events
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "driftwatch")]
#[command(version)]
#[command(about = "Online concept-drift detection for scalar streams", long_about = None)]
pub struct Cli {
    /// Enable debug tracing on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Feed a stream of numbers (one per line) to a detector
    Replay(ReplayArgs),
    /// Generate a synthetic Bernoulli stream with a drift and score a detector on it
    Simulate(SimulateArgs),
}

/// Which detector to run
#[derive(Args, Debug, Clone)]
pub struct DetectorArgs {
    /// Detector with default parameters (ddm, rddm, eddm, cusum, ewma_chart,
    /// hddm_a, hddm_w, stepd, adwin, seed, seqdrift1, seqdrift2)
    #[arg(short, long, value_name = "KIND", default_value = "adwin")]
    pub detector: String,

    /// TOML detector configuration; overrides --detector
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub detector: DetectorArgs,

    /// Input file, or - for stdin
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    pub input: PathBuf,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Report warning-zone entries as well as changes
    #[arg(short, long)]
    pub warnings: bool,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub detector: DetectorArgs,

    /// Success probability before the drift
    #[arg(long, default_value = "0.0")]
    pub p0: f64,

    /// Success probability after the drift
    #[arg(long, default_value = "1.0")]
    pub p1: f64,

    /// Values generated before the drift starts
    #[arg(long = "drift-at", default_value = "5000")]
    pub drift_at: u64,

    /// Total values generated
    #[arg(long, default_value = "10000")]
    pub length: u64,

    /// Per-value probability change of a gradual drift; 0 means abrupt
    #[arg(long, default_value = "0.0")]
    pub slope: f64,

    /// Instances after the drift within which a change counts as detected
    #[arg(long, default_value = "1000")]
    pub horizon: u64,

    /// Seed of the stream generator
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,
}
