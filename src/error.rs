use thiserror::Error;

/// Failure to reach the spreadsheet at all: credentials, authentication, or
/// opening the configured URL. Fatal for the request that hit it.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("spreadsheet URL is not configured")]
    MissingSpreadsheetUrl,

    #[error("spreadsheet URL has no /spreadsheets/d/<key> segment: {0}")]
    InvalidSpreadsheetUrl(String),

    #[error("no credentials: {file} does not exist and no secret bundle is available")]
    CredentialsUnavailable { file: String },

    #[error("unreadable credentials from {origin}: {reason}")]
    InvalidCredentials { origin: String, reason: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("failed to open spreadsheet: {0}")]
    SpreadsheetOpen(String),

    #[error("http client: {0}")]
    HttpClient(String),
}

impl ConfigurationError {
    pub fn http_status(&self) -> u16 {
        503
    }

    pub fn user_message(&self) -> &'static str {
        "Ocorreu um erro de configuração ou conexão. Contate o administrador."
    }
}

/// Failure while fetching the sheets or resolving the person/event join.
///
/// Every variant is reported to the user with the same generic message; the
/// tag is kept for logs and for the JSON API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("transport error reading sheet '{sheet}': {message}")]
    Transport { sheet: String, message: String },

    #[error("sheet '{0}' does not exist in the spreadsheet")]
    MissingSheet(String),

    #[error("sheet '{sheet}' has no '{column}' column")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet '{sheet}' is malformed: {reason}")]
    MalformedSheet { sheet: String, reason: String },

    #[error("issuance '{code}' references person '{person_id}' which does not exist")]
    PersonNotFound { code: String, person_id: String },

    #[error("issuance '{code}' references event '{event_id}' which does not exist")]
    EventNotFound { code: String, event_id: String },
}

impl LookupError {
    pub fn http_status(&self) -> u16 {
        502
    }

    pub fn user_message(&self) -> &'static str {
        "Ocorreu um erro durante a busca. Verifique se os nomes dos cabeçalhos na planilha e no script estão alinhados."
    }

    /// Short machine-readable tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "TRANSPORT",
            Self::MissingSheet(_) => "MISSING_SHEET",
            Self::MissingColumn { .. } => "MISSING_COLUMN",
            Self::MalformedSheet { .. } => "MALFORMED_SHEET",
            Self::PersonNotFound { .. } => "PERSON_NOT_FOUND",
            Self::EventNotFound { .. } => "EVENT_NOT_FOUND",
        }
    }

    /// True when the sheets loaded fine but a foreign key had no match.
    pub fn is_join_miss(&self) -> bool {
        matches!(
            self,
            Self::PersonNotFound { .. } | Self::EventNotFound { .. }
        )
    }
}
