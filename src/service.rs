//! Verification service
//!
//! One submission = one full cycle: open the spreadsheet, load the three
//! tables, run the lookup. Nothing is kept between calls.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ColumnNames, SheetNames, ValidatorConfig};
use crate::error::{ConfigurationError, LookupError};
use crate::loader::load_dataset;
use crate::lookup::{is_missing, lookup, Certificate, LookupOutcome};
use crate::sheets::SpreadsheetConnector;

/// Result of one verification, as handed to the presenter
#[derive(Debug)]
pub enum Verdict {
    Found(Certificate),
    MissingInput,
    NotFound { code: String },
    LookupFailed(LookupError),
    ConfigurationFailed(ConfigurationError),
}

impl Verdict {
    /// Tag used by the JSON API
    pub fn status(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::MissingInput => "missing_input",
            Self::NotFound { .. } => "not_found",
            Self::LookupFailed(_) => "lookup_error",
            Self::ConfigurationFailed(_) => "configuration_error",
        }
    }

    /// HTTP status for the JSON API
    pub fn api_status(&self) -> u16 {
        match self {
            Self::Found(_) => 200,
            Self::MissingInput => 400,
            Self::NotFound { .. } => 404,
            Self::LookupFailed(e) => e.http_status(),
            Self::ConfigurationFailed(e) => e.http_status(),
        }
    }
}

/// JSON body for a verdict
#[derive(Debug, Serialize)]
pub struct VerdictBody {
    pub status: &'static str,
    /// Code that was looked up and not found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Verdict {
    pub fn to_body(&self, show_error_detail: bool) -> VerdictBody {
        let mut body = VerdictBody {
            status: self.status(),
            code: None,
            certificate: None,
            error_code: None,
            message: None,
        };
        match self {
            Self::Found(cert) => body.certificate = Some(cert.clone()),
            Self::MissingInput => body.message = Some(MISSING_INPUT_MESSAGE.to_string()),
            Self::NotFound { code } => {
                body.code = Some(code.clone());
                body.message = Some(NOT_FOUND_MESSAGE.to_string());
            }
            Self::LookupFailed(e) => {
                body.error_code = Some(e.code());
                body.message = Some(with_detail(e.user_message(), e, show_error_detail));
            }
            Self::ConfigurationFailed(e) => {
                body.message = Some(with_detail(e.user_message(), e, show_error_detail));
            }
        }
        body
    }
}

pub const MISSING_INPUT_MESSAGE: &str = "Por favor, insira um código de validação.";
pub const NOT_FOUND_MESSAGE: &str =
    "Certificado não encontrado. Por favor, verifique se o código de validação está correto.";

/// Generic message, optionally followed by the underlying error.
pub fn with_detail(message: &str, detail: &dyn std::fmt::Display, show: bool) -> String {
    if show {
        format!("{message} ({detail})")
    } else {
        message.to_string()
    }
}

#[derive(Clone)]
pub struct VerificationService {
    connector: Arc<dyn SpreadsheetConnector>,
    sheets: SheetNames,
    columns: ColumnNames,
}

impl VerificationService {
    pub fn new(connector: Arc<dyn SpreadsheetConnector>, config: &ValidatorConfig) -> Self {
        Self {
            connector,
            sheets: config.sheets.clone(),
            columns: config.columns.clone(),
        }
    }

    /// Open the spreadsheet and drop it; used when the page is shown without a code.
    pub async fn check_connection(&self) -> Result<(), ConfigurationError> {
        self.connector.open().await.map(|_| ()).map_err(|e| {
            warn!(error = %e, "Spreadsheet unavailable");
            e
        })
    }

    /// Run one full verification for `code`.
    ///
    /// A blank code still opens the spreadsheet (configuration problems are
    /// reported first) but skips loading the tables.
    pub async fn verify(&self, code: &str) -> Verdict {
        let spreadsheet = match self.connector.open().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Spreadsheet unavailable");
                return Verdict::ConfigurationFailed(e);
            }
        };

        if is_missing(code) {
            return Verdict::MissingInput;
        }

        let outcome = match load_dataset(spreadsheet.as_ref(), &self.sheets, &self.columns).await {
            Ok(dataset) => lookup(code, &dataset),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(LookupOutcome::Found(cert)) => {
                info!(code = %code, "Certificate verified");
                Verdict::Found(cert)
            }
            Ok(LookupOutcome::NotFound) => {
                info!(code = %code, "Certificate not found");
                Verdict::NotFound {
                    code: code.to_string(),
                }
            }
            Ok(LookupOutcome::MissingInput) => Verdict::MissingInput,
            Err(e) => {
                warn!(code = %code, error = %e, error_code = e.code(), "Certificate lookup failed");
                Verdict::LookupFailed(e)
            }
        }
    }
}
