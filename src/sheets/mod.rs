//! Remote tabular store
//!
//! `SpreadsheetConnector` authenticates and opens the configured spreadsheet;
//! `Spreadsheet` reads whole worksheets. The Google Sheets implementation
//! talks HTTP; the in-memory one backs tests and offline runs.

pub mod google;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

use crate::cell;
use crate::error::{ConfigurationError, LookupError};

pub use google::GoogleSheetsConnector;
pub use memory::{InMemoryConnector, Workbook};

/// Opens the spreadsheet. Called once per verification.
#[async_trait]
pub trait SpreadsheetConnector: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Spreadsheet>, ConfigurationError>;
}

/// An opened spreadsheet.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Spreadsheet title, for logs.
    fn title(&self) -> &str;

    /// Read a worksheet in full.
    async fn worksheet(&self, title: &str) -> Result<SheetTable, LookupError>;
}

/// A worksheet read in full: the header row plus every following row, each
/// padded or cut to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl SheetTable {
    /// Build from raw rows as returned by the API (first row is the header).
    ///
    /// An empty sheet yields no headers and no rows. Duplicate non-empty
    /// header names make the sheet ambiguous and are rejected.
    pub fn from_values(title: impl Into<String>, values: Vec<Vec<Value>>) -> Result<Self, LookupError> {
        let title = title.into();
        let mut values = values.into_iter();

        let Some(header_row) = values.next() else {
            return Ok(Self {
                title,
                ..Default::default()
            });
        };

        let headers: Vec<String> = header_row.iter().map(cell::canonical).collect();

        let mut seen = HashSet::new();
        for name in headers.iter().filter(|h| !h.is_empty()) {
            if !seen.insert(name.as_str()) {
                return Err(LookupError::MalformedSheet {
                    sheet: title,
                    reason: format!("header '{name}' appears more than once"),
                });
            }
        }

        let width = headers.len();
        let rows = values
            .map(|mut row| {
                row.resize(width, Value::String(String::new()));
                row
            })
            .collect();

        Ok(Self {
            title,
            headers,
            rows,
        })
    }

    /// Index of a column by header name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column, or a `MissingColumn` error naming this sheet
    pub fn require_column(&self, name: &str) -> Result<usize, LookupError> {
        self.column(name).ok_or_else(|| LookupError::MissingColumn {
            sheet: self.title.clone(),
            column: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_defines_columns_and_short_rows_are_padded() {
        let table = SheetTable::from_values(
            "emissoes",
            vec![
                vec![json!("codigo_validacao"), json!("id_aluno"), json!("url_pdf")],
                vec![json!("ABC1"), json!(1)],
            ],
        )
        .unwrap();

        assert_eq!(table.column("id_aluno"), Some(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0], vec![json!("ABC1"), json!(1), json!("")]);
    }

    #[test]
    fn long_rows_are_cut_to_header_width() {
        let table = SheetTable::from_values(
            "cadastros",
            vec![
                vec![json!("id_aluno")],
                vec![json!(1), json!("stray")],
            ],
        )
        .unwrap();
        assert_eq!(table.rows[0], vec![json!(1)]);
    }

    #[test]
    fn empty_sheet_has_no_columns() {
        let table = SheetTable::from_values("cursos_eventos", vec![]).unwrap();
        assert!(table.is_empty());
        let err = table.require_column("id_evento").unwrap_err();
        assert_eq!(
            err,
            LookupError::MissingColumn {
                sheet: "cursos_eventos".into(),
                column: "id_evento".into()
            }
        );
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = SheetTable::from_values(
            "cadastros",
            vec![vec![json!("id_aluno"), json!("id_aluno")]],
        )
        .unwrap_err();
        assert_eq!(err.code(), "MALFORMED_SHEET");
    }

    #[test]
    fn blank_headers_may_repeat() {
        let table = SheetTable::from_values(
            "cadastros",
            vec![vec![json!("id_aluno"), json!(""), json!("")]],
        )
        .unwrap();
        assert_eq!(table.headers.len(), 3);
    }
}
