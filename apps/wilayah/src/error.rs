//! Error types for loading, synchronizing and configuration.

use std::path::PathBuf;

/// Errors raised while reading a dataset file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{}{message}", at_line(.line))]
    Parse { line: Option<usize>, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!("line {l}: ")).unwrap_or_default()
}

impl LoadError {
    pub(crate) fn parse(line: Option<usize>, message: impl Into<String>) -> Self {
        LoadError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Source line of the failure, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Parse { line, .. } => *line,
            _ => None,
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line() as usize);
        let message = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io) => LoadError::Io(io),
            _ => LoadError::parse(line, message),
        }
    }
}

/// Errors that abort one dataset's synchronization.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to encode {target}: {message}")]
    Encode { target: &'static str, message: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors from reading `wilayah.toml|yaml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("unknown {what} '{value}' (expected {expected})")]
    UnknownValue {
        what: &'static str,
        value: String,
        expected: &'static str,
    },
}
