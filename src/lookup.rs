//! Lookup engine
//!
//! Pure function from a validation code and a loaded [`Dataset`] to an
//! outcome. Matching compares canonical strings on both sides, exactly, with
//! no trimming or case folding. Duplicates resolve to the first row in table
//! order.

use serde::Serialize;

use crate::error::LookupError;
use crate::loader::Dataset;

/// Resolved details of a valid certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub code: String,
    pub full_name: String,
    pub event_name: String,
    pub issued_on: String,
    pub pdf_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Empty or whitespace-only code
    MissingInput,
    /// No issuance carries this code
    NotFound,
    Found(Certificate),
}

/// True when the submitted code should be treated as absent.
pub fn is_missing(code: &str) -> bool {
    code.trim().is_empty()
}

/// Resolve `code` against `dataset`.
///
/// A matching issuance whose person or event id has no record is an error,
/// never a partially filled certificate.
pub fn lookup(code: &str, dataset: &Dataset) -> Result<LookupOutcome, LookupError> {
    if is_missing(code) {
        return Ok(LookupOutcome::MissingInput);
    }

    let Some(issuance) = dataset.issuances.iter().find(|i| i.code == code) else {
        return Ok(LookupOutcome::NotFound);
    };

    let person = dataset
        .people
        .iter()
        .find(|p| p.id == issuance.person_id)
        .ok_or_else(|| LookupError::PersonNotFound {
            code: issuance.code.clone(),
            person_id: issuance.person_id.clone(),
        })?;

    let event = dataset
        .events
        .iter()
        .find(|e| e.id == issuance.event_id)
        .ok_or_else(|| LookupError::EventNotFound {
            code: issuance.code.clone(),
            event_id: issuance.event_id.clone(),
        })?;

    Ok(LookupOutcome::Found(Certificate {
        code: issuance.code.clone(),
        full_name: person.full_name.clone(),
        event_name: event.name.clone(),
        issued_on: issuance.issued_on.clone(),
        pdf_url: issuance.pdf_url.clone(),
    }))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::records::{Event, Issuance, Person};
    use proptest::prelude::*;

    fn arb_dataset() -> impl Strategy<Value = Dataset> {
        let code = "[A-Z0-9]{4}";
        prop::collection::vec((code, 0u8..4, 0u8..4), 0..8).prop_map(|rows| {
            let issuances = rows
                .into_iter()
                .map(|(code, p, e)| Issuance {
                    code,
                    person_id: p.to_string(),
                    event_id: e.to_string(),
                    issued_on: "2024-01-01".into(),
                    pdf_url: "http://x/cert.pdf".into(),
                })
                .collect();
            Dataset {
                issuances,
                people: (0..3)
                    .map(|i| Person {
                        id: i.to_string(),
                        full_name: format!("Person {i}"),
                    })
                    .collect(),
                events: (0..3)
                    .map(|i| Event {
                        id: i.to_string(),
                        name: format!("Event {i}"),
                    })
                    .collect(),
            }
        })
    }

    proptest! {
        /// Codes absent from the issuances never match.
        #[test]
        fn absent_code_is_not_found(data in arb_dataset(), code in "[a-z]{1,6}") {
            // generated issuance codes are upper-case, so lower-case input never matches
            prop_assert_eq!(lookup(&code, &data), Ok(LookupOutcome::NotFound));
        }

        /// Same input, same data, same outcome.
        #[test]
        fn lookup_is_idempotent(data in arb_dataset(), code in "[A-Z0-9]{0,4}") {
            prop_assert_eq!(lookup(&code, &data), lookup(&code, &data));
        }

        /// A found certificate always carries the fields of existing records.
        #[test]
        fn found_is_never_partial(data in arb_dataset(), pick in 0usize..8) {
            if let Some(code) = data.issuances.get(pick).map(|i| i.code.clone()) {
                match lookup(&code, &data) {
                    Ok(LookupOutcome::Found(cert)) => {
                        prop_assert!(data.people.iter().any(|p| p.full_name == cert.full_name));
                        prop_assert!(data.events.iter().any(|e| e.name == cert.event_name));
                    }
                    Err(err) => prop_assert!(err.is_join_miss()),
                    Ok(other) => prop_assert!(false, "unexpected outcome {:?}", other),
                }
            }
        }
    }
}
