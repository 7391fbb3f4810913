//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wilayah",
    version,
    about = "Validate and synchronize administrative region datasets",
    long_about = "wilayah keeps the province/regency/district/village CSV and JSON datasets in sync and checks that ids encode the hierarchy.\n\nConfiguration precedence: CLI > wilayah.toml > defaults.",
    after_help = "Examples:\n  wilayah validate\n  wilayah validate --source json --output json\n  wilayah sync --write\n  wilayah sync villages --check\n  wilayah run --write",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for validating and syncing.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current wilayah version.")]
    Version,
    /// Validate the id hierarchy
    #[command(
        about = "Check id format, parent references and id prefixes",
        long_about = "Validate provinces, regencies, districts and villages in dependency order. Every violation is reported; exits 1 when any is found.",
        after_help = "Examples:\n  wilayah validate\n  wilayah validate --source json"
    )]
    Validate {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Representation to validate: csv|json (default: csv)")]
        source: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Sync CSV and JSON datasets
    #[command(
        about = "Regenerate the stale side of each dataset",
        long_about = "For each dataset the most recently modified file wins and the other one is regenerated. Without --write only previews are shown.",
        after_help = "Examples:\n  wilayah sync --dry-run\n  wilayah sync provinces regencies --write"
    )]
    Sync {
        #[arg(help = "Datasets to sync (default: all)")]
        datasets: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Apply changes to disk (disabled if --dry-run/--check)")]
        write: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Preview planned writes without changing files")]
        dry_run: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if changes would occur")]
        check: bool,
    },
    /// Sync then validate
    #[command(
        about = "Sync all datasets, then validate",
        long_about = "Run sync over every dataset followed by validation. Exits 1 if any sync failed or any violation was found."
    )]
    Run {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Apply sync changes to disk")]
        write: bool,
    },
}
