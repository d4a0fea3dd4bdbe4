//! Typed records
//!
//! Each worksheet is turned into typed rows right after it is fetched. Every
//! field holds the canonical string of its cell (see [`crate::cell`]).
//! Required columns must be present in the header; rows whose key cell is
//! blank are skipped with a warning so they can never take part in a match.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::cell;
use crate::config::ColumnNames;
use crate::error::LookupError;
use crate::sheets::SheetTable;

/// A certificate having been granted to a person for an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issuance {
    pub code: String,
    pub person_id: String,
    pub event_id: String,
    pub issued_on: String,
    pub pdf_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: String,
    pub name: String,
}

/// Sheet row number (1-based, header is row 1) of a data row index.
fn sheet_row(index: usize) -> usize {
    index + 2
}

fn text(row: &[Value], column: usize) -> String {
    row.get(column).map(cell::canonical).unwrap_or_default()
}

/// Rows with a non-blank key cell, paired with their sheet row number.
fn keyed_rows<'a>(
    table: &'a SheetTable,
    key_column: usize,
    key_name: &'a str,
) -> impl Iterator<Item = (usize, &'a [Value])> + 'a {
    table
        .rows
        .iter()
        .enumerate()
        .filter_map(move |(index, row)| {
            let blank = row.get(key_column).map(cell::is_blank).unwrap_or(true);
            if blank {
                warn!(
                    sheet = %table.title,
                    row = sheet_row(index),
                    column = %key_name,
                    "Skipping row with blank key"
                );
                None
            } else {
                Some((sheet_row(index), row.as_slice()))
            }
        })
}

impl Issuance {
    pub fn from_table(table: &SheetTable, columns: &ColumnNames) -> Result<Vec<Self>, LookupError> {
        let code = table.require_column(&columns.validation_code)?;
        let person = table.require_column(&columns.person_id)?;
        let event = table.require_column(&columns.event_id)?;
        let issued_on = table.require_column(&columns.issued_on)?;
        let pdf_url = table.require_column(&columns.pdf_url)?;

        let issuances = keyed_rows(table, code, &columns.validation_code)
            .map(|(row_number, row)| {
                let issuance = Self {
                    code: text(row, code),
                    person_id: text(row, person),
                    event_id: text(row, event),
                    issued_on: text(row, issued_on),
                    pdf_url: text(row, pdf_url),
                };
                if issuance.person_id.trim().is_empty() || issuance.event_id.trim().is_empty() {
                    warn!(
                        sheet = %table.title,
                        row = row_number,
                        "Issuance has a blank person or event reference"
                    );
                }
                issuance
            })
            .collect();

        Ok(issuances)
    }
}

impl Person {
    pub fn from_table(table: &SheetTable, columns: &ColumnNames) -> Result<Vec<Self>, LookupError> {
        let id = table.require_column(&columns.person_id)?;
        let full_name = table.require_column(&columns.full_name)?;

        Ok(keyed_rows(table, id, &columns.person_id)
            .map(|(_, row)| Self {
                id: text(row, id),
                full_name: text(row, full_name),
            })
            .collect())
    }
}

impl Event {
    pub fn from_table(table: &SheetTable, columns: &ColumnNames) -> Result<Vec<Self>, LookupError> {
        let id = table.require_column(&columns.event_id)?;
        let name = table.require_column(&columns.event_name)?;

        Ok(keyed_rows(table, id, &columns.event_id)
            .map(|(_, row)| Self {
                id: text(row, id),
                name: text(row, name),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(title: &str, rows: Vec<Vec<Value>>) -> SheetTable {
        SheetTable::from_values(title, rows).unwrap()
    }

    #[test]
    fn issuances_are_typed_and_coerced() {
        let t = table(
            "emissoes",
            vec![
                vec![
                    json!("codigo_validacao"),
                    json!("id_aluno"),
                    json!("id_evento"),
                    json!("data_emissao"),
                    json!("url_pdf"),
                ],
                vec![json!(1024), json!(1), json!(9), json!("2024-01-01"), json!("http://x/1.pdf")],
            ],
        );

        let issuances = Issuance::from_table(&t, &ColumnNames::default()).unwrap();
        assert_eq!(
            issuances,
            vec![Issuance {
                code: "1024".into(),
                person_id: "1".into(),
                event_id: "9".into(),
                issued_on: "2024-01-01".into(),
                pdf_url: "http://x/1.pdf".into(),
            }]
        );
    }

    #[test]
    fn column_order_does_not_matter() {
        let t = table(
            "cadastros",
            vec![
                vec![json!("email"), json!("nome_completo"), json!("id_aluno")],
                vec![json!("ana@x"), json!("Ana Silva"), json!(1)],
            ],
        );
        let people = Person::from_table(&t, &ColumnNames::default()).unwrap();
        assert_eq!(
            people,
            vec![Person {
                id: "1".into(),
                full_name: "Ana Silva".into()
            }]
        );
    }

    #[test]
    fn rows_with_blank_keys_are_skipped() {
        let t = table(
            "cursos_eventos",
            vec![
                vec![json!("id_evento"), json!("nome_evento")],
                vec![json!(""), json!("Orphan")],
                vec![json!("  "), json!("Also orphan")],
                vec![json!(9), json!("Workshop X")],
            ],
        );
        let events = Event::from_table(&t, &ColumnNames::default()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Workshop X");
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let t = table(
            "cadastros",
            vec![vec![json!("id_aluno"), json!("nome")], vec![json!(1), json!("Ana")]],
        );
        let err = Person::from_table(&t, &ColumnNames::default()).unwrap_err();
        assert_eq!(
            err,
            LookupError::MissingColumn {
                sheet: "cadastros".into(),
                column: "nome_completo".into()
            }
        );
    }

    #[test]
    fn issuance_with_blank_reference_is_kept() {
        let t = table(
            "emissoes",
            vec![
                vec![
                    json!("codigo_validacao"),
                    json!("id_aluno"),
                    json!("id_evento"),
                    json!("data_emissao"),
                    json!("url_pdf"),
                ],
                vec![json!("X1"), json!(""), json!(9)],
            ],
        );
        let issuances = Issuance::from_table(&t, &ColumnNames::default()).unwrap();
        assert_eq!(issuances.len(), 1);
        assert_eq!(issuances[0].person_id, "");
        assert_eq!(issuances[0].pdf_url, "");
    }
}
