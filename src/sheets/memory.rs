//! In-memory spreadsheet
//!
//! Holds worksheets as raw rows, exactly as the API would return them, so the
//! loader and lookup see the same shapes (numbers stay numbers).

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{SheetTable, Spreadsheet, SpreadsheetConnector};
use crate::error::{ConfigurationError, LookupError};

/// A set of named worksheets
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    title: String,
    sheets: BTreeMap<String, Vec<Vec<Value>>>,
    broken: BTreeMap<String, String>,
}

impl Workbook {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Add a worksheet; the first row is the header.
    pub fn with_sheet(mut self, title: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        self.sheets.insert(title.into(), rows);
        self
    }

    /// Make reads of `title` fail with a transport error.
    pub fn with_broken_sheet(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.broken.insert(title.into(), message.into());
        self
    }
}

/// Connector over a fixed workbook, or one that always fails to open.
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    workbook: Result<Workbook, String>,
    reads: Arc<AtomicUsize>,
}

impl InMemoryConnector {
    pub fn new(workbook: Workbook) -> Self {
        Self {
            workbook: Ok(workbook),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A connector whose `open` fails, as with bad credentials.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            workbook: Err(message.into()),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of worksheet reads served so far, across all opens.
    pub fn sheet_reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpreadsheetConnector for InMemoryConnector {
    async fn open(&self) -> Result<Box<dyn Spreadsheet>, ConfigurationError> {
        match &self.workbook {
            Ok(workbook) => Ok(Box::new(OpenWorkbook {
                workbook: workbook.clone(),
                reads: Arc::clone(&self.reads),
            })),
            Err(message) => Err(ConfigurationError::SpreadsheetOpen(message.clone())),
        }
    }
}

struct OpenWorkbook {
    workbook: Workbook,
    reads: Arc<AtomicUsize>,
}

#[async_trait]
impl Spreadsheet for OpenWorkbook {
    fn title(&self) -> &str {
        &self.workbook.title
    }

    async fn worksheet(&self, title: &str) -> Result<SheetTable, LookupError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.workbook.broken.get(title) {
            return Err(LookupError::Transport {
                sheet: title.to_string(),
                message: message.clone(),
            });
        }

        let rows = self
            .workbook
            .sheets
            .get(title)
            .ok_or_else(|| LookupError::MissingSheet(title.to_string()))?;

        SheetTable::from_values(title, rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn reads_known_sheet_and_counts() {
        let connector = InMemoryConnector::new(
            Workbook::new("MasterSheet")
                .with_sheet("cadastros", vec![vec![json!("id_aluno")], vec![json!(1)]]),
        );

        let sheet = connector.open().await.unwrap();
        assert_eq!(sheet.title(), "MasterSheet");
        let table = sheet.worksheet("cadastros").await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(connector.sheet_reads(), 1);
    }

    #[tokio::test]
    async fn unknown_sheet_is_missing() {
        let connector = InMemoryConnector::new(Workbook::new("MasterSheet"));
        let sheet = connector.open().await.unwrap();
        let err = sheet.worksheet("emissoes").await.unwrap_err();
        assert_eq!(err, LookupError::MissingSheet("emissoes".into()));
    }

    #[tokio::test]
    async fn failing_connector_does_not_open() {
        let connector = InMemoryConnector::failing("invalid_grant");
        assert!(matches!(
            connector.open().await,
            Err(ConfigurationError::SpreadsheetOpen(_))
        ));
    }
}
