//! Output rendering for validate and sync commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields and a top-level summary.

use crate::models::{FileStatus, ValidationReport};
use crate::sync::{SyncAction, SyncStatus};
use crate::utils;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && utils::colors_enabled()
}

fn paint(text: &str, color: bool, style: fn(&str) -> String) -> String {
    if color {
        style(text)
    } else {
        text.to_string()
    }
}

fn print_json(v: &JsonVal) {
    match serde_json::to_string_pretty(v) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} {}", utils::error_prefix(), e),
    }
}

/// Print validation diagnostics followed by per-file and overall summaries.
pub fn print_validation(report: &ValidationReport, output: &str) {
    if output == "json" {
        print_json(&compose_validation_json(report));
        return;
    }
    let color = use_colors(output);
    for d in &report.diagnostics {
        let loc = match d.line {
            Some(l) => format!("{}:{}", d.file, l),
            None => d.file.clone(),
        };
        let column = d
            .column
            .as_ref()
            .map(|c| format!(" ❲{}❳", c))
            .unwrap_or_default();
        println!(
            "{} {} {}{} — {}",
            paint("✖", color, |s| s.red().to_string()),
            paint(&format!("⟦{}⟧", d.kind), color, |s| s.red().bold().to_string()),
            paint(&loc, color, |s| s.bold().to_string()),
            column,
            d.message
        );
    }
    for f in &report.files {
        let (icon, detail) = match f.status {
            FileStatus::Ok => (paint("✔", color, |s| s.green().to_string()), String::new()),
            FileStatus::Failed => (paint("✖", color, |s| s.red().to_string()), String::new()),
            FileStatus::Missing => (
                paint("▲", color, |s| s.yellow().to_string()),
                " (missing)".to_string(),
            ),
        };
        println!(
            "{} {}{} records={} errors={}",
            icon, f.file, detail, f.records, f.errors
        );
    }
    let verdict = if report.passed() { "PASS" } else { "FAIL" };
    let summary = format!(
        "— Summary — errors={} files={} records={} result={}",
        report.summary.errors, report.summary.files, report.summary.records, verdict
    );
    println!("{}", paint(&summary, color, |s| s.bold().to_string()));
}

/// Print sync actions summarizing writes, skips and failures.
pub fn print_sync(actions: &[SyncAction], output: &str) {
    if output == "json" {
        print_json(&compose_sync_json(actions));
        return;
    }
    let color = use_colors(output);
    for a in actions {
        let name = a.dataset.dataset();
        let pair = format!(
            "{} -> {}",
            a.source.as_deref().unwrap_or("-"),
            a.target.as_deref().unwrap_or("-")
        );
        match a.status {
            SyncStatus::Absent => println!(
                "{} {}",
                paint("⏭️  absent:", color, |s| s.bright_black().to_string()),
                name
            ),
            SyncStatus::InSync => println!(
                "{} {}",
                paint("✔ already synchronized:", color, |s| s.bright_black().to_string()),
                name
            ),
            SyncStatus::UpToDate => println!(
                "{} {} ({})",
                paint("✔ up to date:", color, |s| s.bright_black().to_string()),
                name,
                pair
            ),
            SyncStatus::Regenerated => {
                println!(
                    "{} {} ({} records, dataset={})",
                    paint("📥 synced:", color, |s| s.green().bold().to_string()),
                    pair,
                    a.records,
                    name
                );
                if let Some(err) = &a.error {
                    eprintln!("{} {}", utils::warn_prefix(), err);
                }
            }
            SyncStatus::Stale => println!(
                "{} {} ({} records, dataset={})",
                paint("✏️  would sync:", color, |s| s.yellow().bold().to_string()),
                pair,
                a.records,
                name
            ),
            SyncStatus::Failed => println!(
                "{} {}: {}",
                paint("✖ failed:", color, |s| s.red().bold().to_string()),
                name,
                a.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Print a combined sync + validation run.
pub fn print_run(actions: &[SyncAction], report: &ValidationReport, output: &str) {
    if output == "json" {
        print_json(&json!({
            "sync": compose_sync_json(actions),
            "validation": compose_validation_json(report),
        }));
        return;
    }
    print_sync(actions, output);
    print_validation(report, output);
}

/// Compose validation JSON object (pure) for testing/snapshot purposes.
pub fn compose_validation_json(report: &ValidationReport) -> JsonVal {
    let mut v = serde_json::to_value(report).unwrap_or(JsonVal::Null);
    if let JsonVal::Object(map) = &mut v {
        map.insert("passed".into(), JsonVal::Bool(report.passed()));
    }
    v
}

/// One-line outcome of a combined run, for the human `run` footer.
pub fn run_summary_line(actions: &[SyncAction], report: &ValidationReport) -> String {
    let wrote = actions.iter().filter(|a| a.wrote).count();
    let failed = actions
        .iter()
        .filter(|a| a.status == SyncStatus::Failed)
        .count();
    let warned = actions
        .iter()
        .filter(|a| a.status != SyncStatus::Failed && a.error.is_some())
        .count();
    let mut line = format!("sync wrote {} of {} dataset(s)", wrote, actions.len());
    if failed > 0 {
        line.push_str(&format!(", {} failed", failed));
    }
    if warned > 0 {
        line.push_str(&format!(", {} with warnings", warned));
    }
    line.push_str(&format!(
        "; validation found {} error(s)",
        report.error_count()
    ));
    line
}

/// Compose sync JSON object (pure) for testing/snapshot purposes.
pub fn compose_sync_json(actions: &[SyncAction]) -> JsonVal {
    let count = |s: SyncStatus| actions.iter().filter(|a| a.status == s).count();
    let summary = json!({
        "wrote": actions.iter().filter(|a| a.wrote).count(),
        "pending": actions.iter().filter(|a| a.would_write && !a.wrote).count(),
        "failed": count(SyncStatus::Failed),
        "absent": count(SyncStatus::Absent),
        "warnings": actions
            .iter()
            .filter(|a| a.status != SyncStatus::Failed && a.error.is_some())
            .count(),
        "total": actions.len(),
    });
    json!({
        "results": serde_json::to_value(actions).unwrap_or(JsonVal::Null),
        "summary": summary,
    })
}
