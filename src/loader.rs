//! Dataset loader
//!
//! Fetches the issuances, people and events worksheets in full and types them.
//! No filtering or sorting happens here; the snapshot is discarded after the
//! lookup that requested it.

use tracing::debug;

use crate::config::{ColumnNames, SheetNames};
use crate::error::LookupError;
use crate::records::{Event, Issuance, Person};
use crate::sheets::Spreadsheet;

/// One fresh snapshot of the three tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub issuances: Vec<Issuance>,
    pub people: Vec<Person>,
    pub events: Vec<Event>,
}

/// Read and type the three configured worksheets.
pub async fn load_dataset(
    spreadsheet: &dyn Spreadsheet,
    sheets: &SheetNames,
    columns: &ColumnNames,
) -> Result<Dataset, LookupError> {
    let issuances = Issuance::from_table(&spreadsheet.worksheet(&sheets.issuances).await?, columns)?;
    let people = Person::from_table(&spreadsheet.worksheet(&sheets.people).await?, columns)?;
    let events = Event::from_table(&spreadsheet.worksheet(&sheets.events).await?, columns)?;

    debug!(
        spreadsheet = %spreadsheet.title(),
        issuances = issuances.len(),
        people = people.len(),
        events = events.len(),
        "Dataset loaded"
    );

    Ok(Dataset {
        issuances,
        people,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::{InMemoryConnector, SpreadsheetConnector, Workbook};
    use serde_json::json;

    fn workbook() -> Workbook {
        Workbook::new("MasterSheet")
            .with_sheet(
                "emissoes",
                vec![
                    vec![
                        json!("codigo_validacao"),
                        json!("id_aluno"),
                        json!("id_evento"),
                        json!("data_emissao"),
                        json!("url_pdf"),
                    ],
                    vec![json!("ABC1"), json!(1), json!(9), json!("2024-01-01"), json!("http://x/1.pdf")],
                ],
            )
            .with_sheet(
                "cadastros",
                vec![vec![json!("id_aluno"), json!("nome_completo")], vec![json!(1), json!("Ana Silva")]],
            )
            .with_sheet(
                "cursos_eventos",
                vec![vec![json!("id_evento"), json!("nome_evento")], vec![json!(9), json!("Workshop X")]],
            )
    }

    #[tokio::test]
    async fn loads_all_three_tables() {
        let connector = InMemoryConnector::new(workbook());
        let sheet = connector.open().await.unwrap();

        let dataset = load_dataset(sheet.as_ref(), &SheetNames::default(), &ColumnNames::default())
            .await
            .unwrap();

        assert_eq!(dataset.issuances.len(), 1);
        assert_eq!(dataset.people[0].full_name, "Ana Silva");
        assert_eq!(dataset.events[0].name, "Workshop X");
        assert_eq!(connector.sheet_reads(), 3);
    }

    #[tokio::test]
    async fn missing_sheet_propagates() {
        let connector = InMemoryConnector::new(workbook());
        let sheet = connector.open().await.unwrap();
        let names = SheetNames {
            events: "eventos".into(),
            ..SheetNames::default()
        };

        let err = load_dataset(sheet.as_ref(), &names, &ColumnNames::default())
            .await
            .unwrap_err();
        assert_eq!(err, LookupError::MissingSheet("eventos".into()));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let connector =
            InMemoryConnector::new(workbook().with_broken_sheet("cadastros", "connection reset"));
        let sheet = connector.open().await.unwrap();

        let err = load_dataset(sheet.as_ref(), &SheetNames::default(), &ColumnNames::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "TRANSPORT");
    }
}
