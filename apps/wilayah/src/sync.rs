//! Bidirectional CSV/JSON dataset synchronization.
//!
//! For each dataset the most recently modified representation is the source
//! and the other one is regenerated from it. A missing file counts as
//! infinitely old. Output is only written when its fingerprint differs from
//! the current target, and a freshly written target takes over the source's
//! mtime so the pair reads as synchronized on the next run.
//!
//! Datasets are independent and processed in parallel; every task owns the
//! two files of exactly one dataset.

use crate::coerce;
use crate::config::Effective;
use crate::error::SyncError;
use crate::loader::{self, Table};
use crate::models::{Level, Representation};
use crate::utils;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value as Json;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::path::Path;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Regenerate stale files on disk.
    Write,
    /// Report what would be written.
    DryRun,
    /// Like `DryRun`; callers treat pending writes as failure.
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    CsvToJson,
    JsonToCsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// Neither file exists.
    Absent,
    /// Both files carry the same mtime.
    InSync,
    /// The target already holds the regenerated content.
    UpToDate,
    /// The target was rewritten.
    Regenerated,
    /// The target is stale but the mode forbids writing.
    Stale,
    /// Loading or writing failed; see `error`.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
/// Outcome of one dataset's synchronization.
pub struct SyncAction {
    pub dataset: Level,
    pub status: SyncStatus,
    pub direction: Option<Direction>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub records: usize,
    pub wrote: bool,
    pub would_write: bool,
    pub fingerprint: Option<String>,
    pub error: Option<String>,
}

impl SyncAction {
    fn new(dataset: Level, status: SyncStatus) -> Self {
        SyncAction {
            dataset,
            status,
            direction: None,
            source: None,
            target: None,
            records: 0,
            wrote: false,
            would_write: false,
            fingerprint: None,
            error: None,
        }
    }
}

/// Synchronize the given datasets. Results keep the first-seen order of
/// `levels`; repeated levels are synced once so each file has one writer.
pub fn run_sync(eff: &Effective, levels: &[Level], mode: SyncMode) -> Vec<SyncAction> {
    let mut unique: Vec<Level> = Vec::with_capacity(levels.len());
    for level in levels {
        if !unique.contains(level) {
            unique.push(*level);
        }
    }
    unique
        .par_iter()
        .map(|level| sync_dataset(eff, *level, mode))
        .collect()
}

fn modified(p: &Path) -> Option<SystemTime> {
    fs::metadata(p).and_then(|m| m.modified()).ok()
}

/// Decide the direction for one dataset and regenerate the stale side.
pub fn sync_dataset(eff: &Effective, level: Level, mode: SyncMode) -> SyncAction {
    let csv = eff.dataset_path(level, Representation::Tabular);
    let json = eff.dataset_path(level, Representation::Document);
    let (csv_time, json_time) = match (modified(&csv), modified(&json)) {
        (None, None) => return SyncAction::new(level, SyncStatus::Absent),
        (a, b) => (
            a.unwrap_or(SystemTime::UNIX_EPOCH),
            b.unwrap_or(SystemTime::UNIX_EPOCH),
        ),
    };
    let (direction, src, dst, src_time) = match csv_time.cmp(&json_time) {
        std::cmp::Ordering::Equal => return SyncAction::new(level, SyncStatus::InSync),
        std::cmp::Ordering::Greater => (Direction::CsvToJson, csv, json, csv_time),
        std::cmp::Ordering::Less => (Direction::JsonToCsv, json, csv, json_time),
    };

    let mut action = SyncAction::new(level, SyncStatus::Failed);
    action.direction = Some(direction);
    action.source = Some(utils::display_path(&eff.repo_root, &src));
    action.target = Some(utils::display_path(&eff.repo_root, &dst));
    match regenerate(direction, &src, &dst, src_time, eff.indent, mode, &mut action) {
        Ok(status) => action.status = status,
        Err(e) => action.error = Some(e.to_string()),
    }
    action
}

fn regenerate(
    direction: Direction,
    src: &Path,
    dst: &Path,
    src_time: SystemTime,
    indent: usize,
    mode: SyncMode,
    action: &mut SyncAction,
) -> Result<SyncStatus, SyncError> {
    let rendered = match direction {
        Direction::CsvToJson => {
            let table = loader::load_tabular(src)?;
            action.records = table.records.len();
            render_document(&table, indent)?
        }
        Direction::JsonToCsv => {
            let table = loader::load_document(src)?;
            action.records = table.records.len();
            let fallback = if table.records.is_empty() {
                existing_header(dst)
            } else {
                Vec::new()
            };
            render_tabular(&table, &fallback)?
        }
    };
    let fp = fingerprint(&rendered);
    let current = fs::read(dst).ok().map(|bytes| fingerprint(&bytes));
    action.fingerprint = Some(fp.clone());
    if current.as_deref() == Some(fp.as_str()) {
        return Ok(SyncStatus::UpToDate);
    }
    action.would_write = true;
    if mode != SyncMode::Write {
        return Ok(SyncStatus::Stale);
    }
    let write_err = |source| SyncError::Write {
        path: dst.to_path_buf(),
        source,
    };
    utils::ensure_parent(dst).map_err(write_err)?;
    fs::write(dst, &rendered).map_err(write_err)?;
    action.wrote = true;
    note_alignment(action, dst, align_mtime(dst, src_time));
    Ok(SyncStatus::Regenerated)
}

/// Keep the write, but surface an mtime that could not follow the source:
/// the next run would otherwise see the target as newer and reverse direction.
fn note_alignment(action: &mut SyncAction, dst: &Path, result: std::io::Result<()>) {
    if let Err(e) = result {
        action.error = Some(format!(
            "wrote {} but could not align its mtime: {}",
            dst.display(),
            e
        ));
    }
}

/// Header of an existing tabular target, used when the document is empty.
fn existing_header(path: &Path) -> Vec<String> {
    loader::open_tabular(path)
        .map(|rows| rows.columns().to_vec())
        .unwrap_or_default()
}

fn align_mtime(path: &Path, time: SystemTime) -> std::io::Result<()> {
    File::options().write(true).open(path)?.set_modified(time)
}

/// SHA-256 of the rendered bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Render tabular records as a pretty JSON array with a trailing newline.
pub fn render_document(table: &Table, indent: usize) -> Result<Vec<u8>, SyncError> {
    let docs: Vec<Json> = table
        .records
        .iter()
        .map(|r| {
            Json::Object(
                r.fields
                    .iter()
                    .map(|(k, v)| {
                        let value = match v {
                            Json::String(s) => coerce::to_document_value(s),
                            other => other.clone(),
                        };
                        (k.clone(), value)
                    })
                    .collect(),
            )
        })
        .collect();
    let pad = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(pad.as_bytes());
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    docs.serialize(&mut ser).map_err(|e| SyncError::Encode {
        target: "json",
        message: e.to_string(),
    })?;
    buf.push(b'\n');
    Ok(buf)
}

/// Render document records as CSV.
///
/// Columns come from the table (first record's keys); `fallback` is used
/// when the table has no records. Keys missing from a record render as empty
/// cells. A keyless first record followed by populated ones is an error, since
/// no header could carry their values.
pub fn render_tabular(table: &Table, fallback: &[String]) -> Result<Vec<u8>, SyncError> {
    if table.columns.is_empty() {
        if let Some(r) = table.records.iter().find(|r| !r.fields.is_empty()) {
            return Err(SyncError::Encode {
                target: "csv",
                message: format!(
                    "first record has no keys to derive columns from, but the record at position {} does",
                    r.line
                ),
            });
        }
    }
    let columns = if table.columns.is_empty() {
        fallback
    } else {
        &table.columns
    };
    if columns.is_empty() {
        return Ok(Vec::new());
    }
    let encode = |e: csv::Error| SyncError::Encode {
        target: "csv",
        message: e.to_string(),
    };
    let mut w = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record(columns).map_err(encode)?;
    for r in &table.records {
        let row: Vec<String> = columns
            .iter()
            .map(|c| {
                r.fields
                    .get(c)
                    .map(|v| coerce::to_tabular_text(v).into_owned())
                    .unwrap_or_default()
            })
            .collect();
        w.write_record(&row).map_err(encode)?;
    }
    w.into_inner().map_err(|e| SyncError::Encode {
        target: "csv",
        message: e.error().to_string(),
    })
}
