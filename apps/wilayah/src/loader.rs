//! Dataset loading for both serializations.
//!
//! Records keep their fields in source column order and carry a 1-based
//! position: the physical line for tabular files (header is line 1) and the
//! array index for documents. Tabular files are streamed row by row so the
//! village level never needs to be held in memory during validation.

use crate::error::LoadError;
use crate::models::Representation;
use serde_json::{Map, Value as Json};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
/// One dataset row.
pub struct Record {
    pub line: usize,
    pub fields: Map<String, Json>,
}

impl Record {
    /// Field rendered as tabular text, `None` when the column is absent.
    pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
        self.fields.get(column).map(crate::coerce::to_tabular_text)
    }
}

#[derive(Debug, Clone, Default)]
/// A fully loaded dataset.
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// Streaming reader over a tabular file.
pub struct TabularRows {
    columns: Vec<String>,
    reader: csv::Reader<File>,
    row: csv::StringRecord,
    done: bool,
}

impl TabularRows {
    /// Header columns in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn current(&self) -> Result<Record, LoadError> {
        let line = self
            .row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        if self.row.len() != self.columns.len() {
            return Err(LoadError::parse(
                Some(line),
                format!(
                    "expected {} fields, found {}",
                    self.columns.len(),
                    self.row.len()
                ),
            ));
        }
        let fields = self
            .columns
            .iter()
            .zip(self.row.iter())
            .map(|(c, v)| (c.clone(), Json::String(v.to_string())))
            .collect();
        Ok(Record { line, fields })
    }
}

impl Iterator for TabularRows {
    type Item = Result<Record, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record(&mut self.row) {
            Ok(true) => Some(self.current()),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                // a broken stream would repeat the same error forever
                if e.is_io_error() {
                    self.done = true;
                }
                Some(Err(e.into()))
            }
        }
    }
}

/// Open a tabular file and read its header.
pub fn open_tabular(path: &Path) -> Result<TabularRows, LoadError> {
    let file = File::open(path).map_err(|e| not_found_or(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let columns = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    Ok(TabularRows {
        columns,
        reader,
        row: csv::StringRecord::new(),
        done: false,
    })
}

/// Load a whole tabular file, failing on the first malformed row.
pub fn load_tabular(path: &Path) -> Result<Table, LoadError> {
    let rows = open_tabular(path)?;
    let columns = rows.columns().to_vec();
    let records = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(Table { columns, records })
}

/// Load a document file: a JSON array of objects.
///
/// Column order is taken from the first record's keys.
pub fn load_document(path: &Path) -> Result<Table, LoadError> {
    let data = fs::read_to_string(path).map_err(|e| not_found_or(path, e))?;
    let json: Json =
        serde_json::from_str(&data).map_err(|e| LoadError::parse(Some(e.line()), e.to_string()))?;
    let items = match json {
        Json::Array(items) => items,
        _ => return Err(LoadError::parse(None, "expected a JSON array of records")),
    };
    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Json::Object(fields) => records.push(Record { line: i + 1, fields }),
            _ => {
                return Err(LoadError::parse(
                    None,
                    format!("record {} is not an object", i + 1),
                ))
            }
        }
    }
    let columns = records
        .first()
        .map(|r| r.fields.keys().cloned().collect())
        .unwrap_or_default();
    Ok(Table { columns, records })
}

/// Load either serialization.
pub fn load(path: &Path, repr: Representation) -> Result<Table, LoadError> {
    match repr {
        Representation::Tabular => load_tabular(path),
        Representation::Document => load_document(path),
    }
}

/// Row source for one dataset, streaming when the format allows it.
pub enum Rows {
    Tabular(TabularRows),
    Document(std::vec::IntoIter<Record>),
}

impl Iterator for Rows {
    type Item = Result<Record, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Rows::Tabular(rows) => rows.next(),
            Rows::Document(rows) => rows.next().map(Ok),
        }
    }
}

/// Open a dataset for row-at-a-time consumption.
///
/// Documents must be parsed whole before the first row is available.
pub fn rows(path: &Path, repr: Representation) -> Result<Rows, LoadError> {
    match repr {
        Representation::Tabular => open_tabular(path).map(Rows::Tabular),
        Representation::Document => {
            load_document(path).map(|t| Rows::Document(t.records.into_iter()))
        }
    }
}

fn not_found_or(path: &Path, e: io::Error) -> LoadError {
    if e.kind() == io::ErrorKind::NotFound {
        LoadError::FileNotFound(path.to_path_buf())
    } else {
        LoadError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_tabular_lines_count_header_as_line_one() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("regencies.csv");
        fs::write(
            &p,
            "id,province_id,name\n1101,11,\"Kab.\nSimeulue\"\n1102,11,Aceh Singkil\n",
        )
        .unwrap();
        let table = load_tabular(&p).unwrap();
        assert_eq!(table.columns, vec!["id", "province_id", "name"]);
        assert_eq!(table.records[0].line, 2);
        // the quoted cell spans two physical lines
        assert_eq!(table.records[1].line, 4);
        assert_eq!(table.records[0].fields["name"], json!("Kab.\nSimeulue"));
        assert_eq!(table.records[1].text("id").as_deref(), Some("1102"));
    }

    #[test]
    fn test_tabular_ragged_row_is_parse_error_and_stream_continues() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("provinces.csv");
        fs::write(&p, "id,name\n11\n12,Sumatera Utara\n").unwrap();
        let rows: Vec<_> = open_tabular(&p).unwrap().collect();
        assert_eq!(rows.len(), 2);
        match &rows[0] {
            Err(LoadError::Parse { line, message }) => {
                assert_eq!(*line, Some(2));
                assert!(message.contains("expected 2 fields"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(rows[1].as_ref().unwrap().line, 3);
    }

    #[test]
    fn test_missing_file_is_file_not_found() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("villages.csv");
        assert!(matches!(
            load(&p, Representation::Tabular),
            Err(LoadError::FileNotFound(_))
        ));
        assert!(matches!(
            load(&p.with_extension("json"), Representation::Document),
            Err(LoadError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_document_keeps_key_order_and_positions() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("provinces.json");
        fs::write(
            &p,
            r#"[{"id": 11, "name": "Aceh"}, {"id": 12, "name": "Sumatera Utara"}]"#,
        )
        .unwrap();
        let table = load_document(&p).unwrap();
        assert_eq!(table.columns, vec!["id", "name"]);
        assert_eq!(table.records[1].line, 2);
        assert_eq!(table.records[0].text("id").as_deref(), Some("11"));
    }

    #[test]
    fn test_document_shape_errors() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("districts.json");
        fs::write(&p, r#"{"id": 1}"#).unwrap();
        assert!(matches!(load_document(&p), Err(LoadError::Parse { .. })));
        fs::write(&p, r#"[{"id": 1}, 5]"#).unwrap();
        let err = load_document(&p).unwrap_err();
        assert!(err.to_string().contains("record 2"));
        fs::write(&p, "[{\"id\": 1},\n").unwrap();
        assert!(load_document(&p).unwrap_err().line().is_some());
    }
}
