//! wilayah CLI binary entry point.
//! Delegates to the library for validate/sync and maps results to exit codes.

use clap::Parser;
use std::process;
use wilayah::cli::{Cli, Commands};
use wilayah::config::{self, Effective};
use wilayah::models::Level;
use wilayah::sync::{SyncAction, SyncMode, SyncStatus};
use wilayah::{output, utils};

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate {
            repo_root,
            source,
            output,
        } => {
            let eff = resolve(repo_root.as_deref(), output.as_deref(), source.as_deref());
            let report = wilayah::run_validation(&eff);
            output::print_validation(&report, &eff.output);
            if !report.passed() {
                if eff.output != "json" {
                    eprintln!(
                        "{} validation failed with {} error(s)",
                        utils::error_prefix(),
                        report.error_count()
                    );
                }
                process::exit(1);
            }
        }
        Commands::Sync {
            datasets,
            repo_root,
            output,
            write,
            dry_run,
            check,
        } => {
            let eff = resolve(repo_root.as_deref(), output.as_deref(), None);
            let levels = parse_datasets(&datasets);
            let mode = sync_mode(&eff, write, dry_run, check);
            if mode != SyncMode::Write && eff.output != "json" {
                eprintln!(
                    "{} Preview only; pass --write to apply changes.",
                    utils::note_prefix()
                );
            }
            let actions = wilayah::run_sync(&eff, &levels, mode);
            output::print_sync(&actions, &eff.output);
            if any_failed(&actions) {
                process::exit(1);
            }
            // In check mode, exit non-zero when any action would write
            if mode == SyncMode::Check && actions.iter().any(|a| a.would_write) {
                process::exit(1);
            }
        }
        Commands::Run {
            repo_root,
            output,
            write,
        } => {
            let eff = resolve(repo_root.as_deref(), output.as_deref(), None);
            let mode = sync_mode(&eff, write, false, false);
            let actions = wilayah::run_sync(&eff, &Level::ALL, mode);
            let report = wilayah::run_validation(&eff);
            output::print_run(&actions, &report, &eff.output);
            if eff.output != "json" {
                eprintln!(
                    "{} {}",
                    utils::info_prefix(),
                    output::run_summary_line(&actions, &report)
                );
            }
            if any_failed(&actions) || !report.passed() {
                process::exit(1);
            }
        }
    }
}

/// Resolve configuration or exit with status 2.
fn resolve(repo_root: Option<&str>, output: Option<&str>, source: Option<&str>) -> Effective {
    let eff = match config::resolve_effective(repo_root, output, source) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            process::exit(2);
        }
    };
    // Friendly note if no wilayah config was found
    if eff.output != "json" && matches!(config::load_config(&eff.repo_root), Ok(None)) {
        eprintln!(
            "{} No wilayah.toml found in {}; using defaults.",
            utils::note_prefix(),
            utils::rel_to_wd(&eff.repo_root)
        );
    }
    eff
}

/// Map dataset names to levels, defaulting to all; unknown names exit 2.
fn parse_datasets(names: &[String]) -> Vec<Level> {
    if names.is_empty() {
        return Level::ALL.to_vec();
    }
    let mut levels = Vec::new();
    for name in names {
        match Level::from_dataset(name) {
            Some(l) if !levels.contains(&l) => levels.push(l),
            Some(_) => {}
            None => {
                let known: Vec<_> = Level::ALL.iter().map(|l| l.dataset()).collect();
                eprintln!(
                    "{} unknown dataset '{}' (expected one of: {})",
                    utils::error_prefix(),
                    name,
                    known.join(", ")
                );
                process::exit(2);
            }
        }
    }
    levels
}

/// CLI/config precedence: --check, then --dry-run, then --write or `[sync].write`.
fn sync_mode(eff: &Effective, write: bool, dry_run: bool, check: bool) -> SyncMode {
    if check {
        SyncMode::Check
    } else if dry_run {
        SyncMode::DryRun
    } else if write || eff.sync_write {
        SyncMode::Write
    } else {
        SyncMode::DryRun
    }
}

fn any_failed(actions: &[SyncAction]) -> bool {
    actions.iter().any(|a| a.status == SyncStatus::Failed)
}
