//! Validator configuration
//!
//! Loaded from a YAML file (optional) and then overridden by environment
//! variables. Every key has a default except the spreadsheet URL, whose
//! absence surfaces as a configuration error on each request.
//!
//! Environment:
//!   CERT_VALIDATOR_CONFIG             YAML path (default: config/validator.yaml)
//!   CERT_VALIDATOR_SPREADSHEET_URL    spreadsheet URL
//!   CERT_VALIDATOR_BIND_ADDR          listen address
//!   CERT_VALIDATOR_CREDENTIALS_FILE   local service-account file
//!   CERT_VALIDATOR_SHOW_ERROR_DETAIL  "true" to append error detail to messages

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Default configuration path
pub const DEFAULT_CONFIG_PATH: &str = "config/validator.yaml";

/// Env var naming the configuration file
pub const CONFIG_PATH_ENV: &str = "CERT_VALIDATOR_CONFIG";

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Full URL of the spreadsheet (`https://docs.google.com/spreadsheets/d/<key>/...`)
    pub spreadsheet_url: Option<String>,
    pub sheets: SheetNames,
    pub columns: ColumnNames,
    pub credentials: CredentialsConfig,
    /// Timeout applied to every call to the spreadsheet API
    pub http_timeout_secs: u64,
    pub bind_addr: String,
    pub page: PageConfig,
    /// Append the underlying error text to the generic error messages
    pub show_error_detail: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            spreadsheet_url: None,
            sheets: SheetNames::default(),
            columns: ColumnNames::default(),
            credentials: CredentialsConfig::default(),
            http_timeout_secs: 30,
            bind_addr: "0.0.0.0:8080".to_string(),
            page: PageConfig::default(),
            show_error_detail: false,
        }
    }
}

/// Worksheet titles
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetNames {
    pub issuances: String,
    pub people: String,
    pub events: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            issuances: "emissoes".to_string(),
            people: "cadastros".to_string(),
            events: "cursos_eventos".to_string(),
        }
    }
}

/// Header names.
///
/// `person_id` is used in both the issuances and people sheets, `event_id`
/// in both the issuances and events sheets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    pub validation_code: String,
    pub person_id: String,
    pub event_id: String,
    pub issued_on: String,
    pub pdf_url: String,
    pub full_name: String,
    pub event_name: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            validation_code: "codigo_validacao".to_string(),
            person_id: "id_aluno".to_string(),
            event_id: "id_evento".to_string(),
            issued_on: "data_emissao".to_string(),
            pdf_url: "url_pdf".to_string(),
            full_name: "nome_completo".to_string(),
            event_name: "nome_evento".to_string(),
        }
    }
}

/// Where service-account credentials come from
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Local key file, used whenever it exists
    pub file: PathBuf,
    /// Env var holding the JSON key bundle supplied by the host
    pub secret_env: String,
    /// TOML secret bundle supplied by the host, read when `secret_env` is unset
    pub secrets_file: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("credentials.json"),
            secret_env: "CERT_VALIDATOR_SERVICE_ACCOUNT".to_string(),
            secrets_file: PathBuf::from(".streamlit/secrets.toml"),
        }
    }
}

/// Presentation options
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub title: String,
    pub heading: String,
    /// URL path of the sidebar logo, e.g. `/assets/logo.png`
    pub logo_path: Option<String>,
    /// Directory served under `/assets`
    pub assets_dir: PathBuf,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Validação de Certificado".to_string(),
            heading: "Verificação de Autenticidade".to_string(),
            logo_path: None,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl ValidatorConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse validator configuration")
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load using `CERT_VALIDATOR_CONFIG` (or the default path) and apply
    /// environment overrides.
    ///
    /// A missing file at the default path means "all defaults"; a missing
    /// file at an explicitly configured path is an error.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                info!(path = %path, "Loading configuration");
                Self::from_file(path)?
            }
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                info!(path = DEFAULT_CONFIG_PATH, "Loading configuration");
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => {
                info!("No configuration file, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CERT_VALIDATOR_*` overrides from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("CERT_VALIDATOR_SPREADSHEET_URL") {
            self.spreadsheet_url = Some(url);
        }
        if let Some(addr) = lookup("CERT_VALIDATOR_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(file) = lookup("CERT_VALIDATOR_CREDENTIALS_FILE") {
            self.credentials.file = PathBuf::from(file);
        }
        if let Some(flag) = lookup("CERT_VALIDATOR_SHOW_ERROR_DETAIL") {
            self.show_error_detail = flag
                .parse()
                .with_context(|| format!("CERT_VALIDATOR_SHOW_ERROR_DETAIL: not a bool: {flag}"))?;
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
