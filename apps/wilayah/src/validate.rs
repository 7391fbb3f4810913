//! Hierarchical integrity validation.
//!
//! Levels are checked strictly in order (provinces, regencies, districts,
//! villages). Each stage produces an [`AcceptedIds`] set that the next stage
//! uses for referential checks, so stages cannot run concurrently.
//!
//! Per row:
//! - `id` must be all digits; otherwise one `FormatError` and the row is
//!   skipped. A well-formed id joins the accepted set even if the parent
//!   checks below fail.
//! - the parent column must be all digits (`FormatError`); when it is, the
//!   parent must exist one level up (`ReferentialIntegrityError`) and the id
//!   must start with it (`PrefixInconsistencyError`). Both are reported
//!   independently.
//!
//! Validation is exhaustive: nothing short of the end of input stops a run.

use crate::coerce::is_digits;
use crate::config::Effective;
use crate::error::LoadError;
use crate::loader;
use crate::models::{
    Diagnostic, ErrorKind, FileStatus, FileSummary, Level, Representation, Summary,
    ValidationReport,
};
use crate::utils;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Syntactically valid ids collected at one level. Frozen once its stage ends.
#[derive(Debug, Default, Clone)]
pub struct AcceptedIds(HashSet<String>);

impl AcceptedIds {
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for AcceptedIds {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        AcceptedIds(iter.into_iter().collect())
    }
}

/// Per-run lookup tables, one accepted set per completed level.
#[derive(Debug, Default)]
pub struct RunContext {
    accepted: HashMap<Level, AcceptedIds>,
    empty: AcceptedIds,
}

impl RunContext {
    pub fn accepted(&self, level: Level) -> Option<&AcceptedIds> {
        self.accepted.get(&level)
    }

    /// Accepted set of `level`'s parent; empty when the parent had no rows.
    fn parent_ids(&self, level: Level) -> Option<&AcceptedIds> {
        level
            .parent()
            .map(|p| self.accepted.get(&p).unwrap_or(&self.empty))
    }
}

/// Options for a validation pass.
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    pub source: Representation,
    pub check_duplicates: bool,
}

/// A violation before its file/line are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ErrorKind,
    pub column: &'static str,
    pub value: String,
    pub message: String,
}

/// Check the parent reference of a row whose own `id` is already well formed.
pub fn check_parent(
    level: Level,
    id: &str,
    parent_value: Option<&str>,
    parent_ids: &AcceptedIds,
) -> Vec<Violation> {
    let (Some(parent), Some(column)) = (level.parent(), level.parent_column()) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let value = parent_value.unwrap_or_default();
    if !is_digits(value) {
        out.push(Violation {
            kind: ErrorKind::FormatError,
            column,
            value: value.to_string(),
            message: if parent_value.is_none() {
                format!("missing column '{}'", column)
            } else {
                format!("{} '{}' must contain digits only", column, value)
            },
        });
        return out;
    }
    if !parent_ids.contains(value) {
        out.push(Violation {
            kind: ErrorKind::ReferentialIntegrityError,
            column,
            value: value.to_string(),
            message: format!(
                "{} '{}' does not exist in {}",
                column,
                value,
                parent.dataset()
            ),
        });
    }
    if !id.starts_with(value) {
        out.push(Violation {
            kind: ErrorKind::PrefixInconsistencyError,
            column: "id",
            value: id.to_string(),
            message: format!("id '{}' does not start with {} '{}'", id, column, value),
        });
    }
    out
}

/// Run all four stages and aggregate diagnostics.
pub fn run_validation(eff: &Effective) -> ValidationReport {
    let opts = ValidateOptions {
        source: eff.source,
        check_duplicates: eff.check_duplicates,
    };
    validate_all(&eff.repo_root, |level| eff.dataset_path(level, opts.source), opts)
}

/// Validate every level, resolving dataset files through `path_of`.
pub fn validate_all<F>(root: &Path, path_of: F, opts: ValidateOptions) -> ValidationReport
where
    F: Fn(Level) -> std::path::PathBuf,
{
    validate_with(root, path_of, opts, &mut RunContext::default())
}

/// Like [`validate_all`], leaving each level's accepted ids in `ctx`.
pub fn validate_with<F>(
    root: &Path,
    path_of: F,
    opts: ValidateOptions,
    ctx: &mut RunContext,
) -> ValidationReport
where
    F: Fn(Level) -> std::path::PathBuf,
{
    let mut report = ValidationReport::default();
    for level in Level::ALL {
        let path = path_of(level);
        let ids = validate_level(root, &path, level, ctx, opts, &mut report);
        ctx.accepted.insert(level, ids);
    }
    report.summary = Summary {
        errors: report.files.iter().map(|f| f.errors).sum(),
        files: report.files.len(),
        records: report.files.iter().map(|f| f.records).sum(),
    };
    report
}

fn emit(report: &mut ValidationReport, summary: &mut FileSummary, d: Diagnostic) {
    summary.errors += 1;
    report.diagnostics.push(d);
}

/// Validate one level and return its accepted id set.
fn validate_level(
    root: &Path,
    path: &Path,
    level: Level,
    ctx: &RunContext,
    opts: ValidateOptions,
    report: &mut ValidationReport,
) -> AcceptedIds {
    let file = utils::display_path(root, path);
    let mut ids: HashSet<String> = HashSet::new();
    let mut summary = FileSummary {
        dataset: level,
        file: file.clone(),
        records: 0,
        errors: 0,
        status: FileStatus::Ok,
    };
    let rows = match loader::rows(path, opts.source) {
        Ok(rows) => rows,
        Err(e) => {
            let (kind, status, message) = match &e {
                LoadError::FileNotFound(_) => (
                    ErrorKind::FileNotFound,
                    FileStatus::Missing,
                    format!("{} dataset file not found", level.dataset()),
                ),
                _ => (ErrorKind::ParseError, FileStatus::Failed, e.to_string()),
            };
            emit(
                report,
                &mut summary,
                Diagnostic {
                    file: file.clone(),
                    line: e.line(),
                    kind,
                    column: None,
                    value: None,
                    message,
                },
            );
            summary.status = status;
            report.files.push(summary);
            return AcceptedIds::default();
        }
    };

    let parent_ids = ctx.parent_ids(level);
    for row in rows {
        let record = match row {
            Ok(r) => r,
            Err(e) => {
                emit(
                    report,
                    &mut summary,
                    Diagnostic {
                        file: file.clone(),
                        line: e.line(),
                        kind: ErrorKind::ParseError,
                        column: None,
                        value: None,
                        message: e.to_string(),
                    },
                );
                continue;
            }
        };
        summary.records += 1;
        let line = Some(record.line);
        let id = record.text("id").map(|s| s.into_owned());
        let id = match id {
            Some(id) if is_digits(&id) => id,
            other => {
                let value = other.unwrap_or_default();
                emit(
                    report,
                    &mut summary,
                    Diagnostic {
                        file: file.clone(),
                        line,
                        kind: ErrorKind::FormatError,
                        column: Some("id".into()),
                        message: format!("id '{}' must contain digits only", value),
                        value: Some(value),
                    },
                );
                continue;
            }
        };

        if let Some(parent_ids) = parent_ids {
            let parent_value = level
                .parent_column()
                .and_then(|c| record.text(c))
                .map(|s| s.into_owned());
            for v in check_parent(level, &id, parent_value.as_deref(), parent_ids) {
                emit(
                    report,
                    &mut summary,
                    Diagnostic {
                        file: file.clone(),
                        line,
                        kind: v.kind,
                        column: Some(v.column.to_string()),
                        value: Some(v.value),
                        message: v.message,
                    },
                );
            }
        }

        if ids.contains(&id) {
            if opts.check_duplicates {
                emit(
                    report,
                    &mut summary,
                    Diagnostic {
                        file: file.clone(),
                        line,
                        kind: ErrorKind::DuplicateIdError,
                        column: Some("id".into()),
                        message: format!("id '{}' appears more than once", id),
                        value: Some(id),
                    },
                );
            }
        } else {
            ids.insert(id);
        }
    }

    if summary.errors > 0 {
        summary.status = FileStatus::Failed;
    }
    report.files.push(summary);
    ids.into_iter().collect()
}
