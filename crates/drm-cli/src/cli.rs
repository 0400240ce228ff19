//! Command-line arguments for the `drm` station binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "drm",
    version,
    about = "Depot dispatch station - reconcile runsheets against scanned consignments",
    long_about = "Load delivery runsheets, derive the consignment labels each sales order \
                  should produce, and check scanned barcodes off against them.\n\n\
                  Several stations of one depot share scans through a common scan log."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Station configuration file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what a runsheet would expect, without touching station state.
    Derive(SheetArgs),

    /// Merge one or more runsheets into the station's manifest.
    Upload(UploadArgs),

    /// Merge a runsheet into the shared manifest of one or more depots.
    Push(PushArgs),

    /// Load the depot's shared manifest into this station.
    Pull(PullArgs),

    /// Scan consignment barcodes (arguments, or one per line on stdin).
    Scan(ScanArgs),

    /// Mark the next unscanned item of a row as scanned.
    Mark(RowArgs),

    /// Attach a note to a row (an empty note removes it).
    Note(NoteArgs),

    /// Show run progress, or the orders of one run.
    Status(StatusArgs),

    /// Load a production schedule and show its orders' progress.
    Schedule(SheetArgs),

    /// Write the completion report as CSV.
    Report(ReportArgs),

    /// Forget the manifest and all scans of the depot.
    Clear(ClearArgs),

    /// Print the effective configuration.
    Config,
}

#[derive(Args)]
pub struct SheetArgs {
    /// Sheet exported as CSV.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct UploadArgs {
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct PushArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Target depot; repeat for several.
    #[arg(long = "depot", value_name = "ID", required = true)]
    pub depots: Vec<String>,
}

#[derive(Args)]
pub struct PullArgs {
    /// Replace local rows and scans even when the station has work.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Barcodes to submit; read stdin when none are given.
    #[arg(value_name = "CODE")]
    pub codes: Vec<String>,

    /// Treat stdin lines as raw scanner input subject to the autoscan delay.
    #[arg(long = "autoscan")]
    pub autoscan: bool,
}

#[derive(Args)]
pub struct RowArgs {
    /// Row number as shown by `status` (1 is the first data row).
    #[arg(value_name = "ROW")]
    pub row: usize,
}

#[derive(Args)]
pub struct NoteArgs {
    #[arg(value_name = "ROW")]
    pub row: usize,

    #[arg(value_name = "TEXT", default_value = "")]
    pub text: String,
}

#[derive(Args)]
pub struct StatusArgs {
    /// List the orders of this run.
    #[arg(long = "run", value_name = "RUN")]
    pub run: Option<String>,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Output file (default: `<reports_dir>/final_<depot>_<time>.csv`).
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm clearing.
    #[arg(long = "yes")]
    pub yes: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
