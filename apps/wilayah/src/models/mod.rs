//! Shared data models for validation diagnostics and reports.

pub mod level;

pub use level::{Level, Representation};

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Category of a single integrity diagnostic.
pub enum ErrorKind {
    FileNotFound,
    FormatError,
    ReferentialIntegrityError,
    PrefixInconsistencyError,
    ParseError,
    DuplicateIdError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::FormatError => "FormatError",
            ErrorKind::ReferentialIntegrityError => "ReferentialIntegrityError",
            ErrorKind::PrefixInconsistencyError => "PrefixInconsistencyError",
            ErrorKind::ParseError => "ParseError",
            ErrorKind::DuplicateIdError => "DuplicateIdError",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
/// A single violation with its location.
///
/// `line` is 1-based (the header is line 1 for tabular files; documents use
/// the record position). It is `None` for whole-file problems.
pub struct Diagnostic {
    pub file: String,
    pub line: Option<usize>,
    pub kind: ErrorKind,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Failed,
    Missing,
}

#[derive(Debug, Clone, Serialize)]
/// Per-file totals for the final summary.
pub struct FileSummary {
    pub dataset: Level,
    pub file: String,
    pub records: usize,
    pub errors: usize,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Aggregated totals used by printers and exit-code mapping.
pub struct Summary {
    pub errors: usize,
    pub files: usize,
    pub records: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Validation results container.
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
    pub files: Vec<FileSummary>,
    pub summary: Summary,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.summary.errors
    }

    /// True when every level finished with zero errors.
    pub fn passed(&self) -> bool {
        self.summary.errors == 0
    }
}
