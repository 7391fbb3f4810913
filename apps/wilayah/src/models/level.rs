//! The fixed four-level administrative hierarchy and its two serializations.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// One level of the province → regency → district → village hierarchy.
pub enum Level {
    Province,
    Regency,
    District,
    Village,
}

impl Level {
    /// All levels in dependency order (parents first).
    pub const ALL: [Level; 4] = [
        Level::Province,
        Level::Regency,
        Level::District,
        Level::Village,
    ];

    /// Dataset name, which is also the file stem on disk.
    pub fn dataset(self) -> &'static str {
        match self {
            Level::Province => "provinces",
            Level::Regency => "regencies",
            Level::District => "districts",
            Level::Village => "villages",
        }
    }

    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Province => None,
            Level::Regency => Some(Level::Province),
            Level::District => Some(Level::Regency),
            Level::Village => Some(Level::District),
        }
    }

    /// Column holding the parent reference; `None` for the root level.
    pub fn parent_column(self) -> Option<&'static str> {
        match self {
            Level::Province => None,
            Level::Regency => Some("province_id"),
            Level::District => Some("regency_id"),
            Level::Village => Some("district_id"),
        }
    }

    pub fn from_dataset(name: &str) -> Option<Level> {
        Level::ALL
            .into_iter()
            .find(|l| l.dataset().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Serialization kind of a dataset file.
pub enum Representation {
    /// Comma-delimited rows with a header (`.csv`).
    #[serde(rename = "csv")]
    Tabular,
    /// JSON array of records (`.json`).
    #[serde(rename = "json")]
    Document,
}

impl Representation {
    pub fn extension(self) -> &'static str {
        match self {
            Representation::Tabular => "csv",
            Representation::Document => "json",
        }
    }

    /// Parse a user-facing token (`csv|json`, also `tabular|document`).
    pub fn parse(token: &str) -> Option<Representation> {
        match token.trim().to_ascii_lowercase().as_str() {
            "csv" | "tabular" => Some(Representation::Tabular),
            "json" | "document" => Some(Representation::Document),
            _ => None,
        }
    }
}
