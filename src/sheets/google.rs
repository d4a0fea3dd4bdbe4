//! Google Sheets client
//!
//! Service-account authentication (RS256 JWT assertion exchanged for a
//! bearer token) and read-only access to worksheet values over the Sheets v4
//! REST API. Nothing is cached: each `open` authenticates afresh.

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

use super::{SheetTable, Spreadsheet, SpreadsheetConnector};
use crate::config::{CredentialsConfig, ValidatorConfig};
use crate::credentials::{resolve_key, ServiceAccountKey};
use crate::error::{ConfigurationError, LookupError};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Extract the spreadsheet key from a URL such as
/// `https://docs.google.com/spreadsheets/d/<key>/edit#gid=0`.
pub fn spreadsheet_key(url: &str) -> Result<String, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidSpreadsheetUrl(url.to_string());
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    let segments: Vec<&str> = parsed.path_segments().ok_or_else(invalid)?.collect();

    segments
        .windows(3)
        .find(|w| w[0] == "spreadsheets" && w[1] == "d")
        .map(|w| w[2])
        .filter(|key| {
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
        .map(str::to_string)
        .ok_or_else(invalid)
}

/// A1 range covering a whole worksheet: the quoted title.
fn whole_sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Opens the configured spreadsheet with service-account credentials.
pub struct GoogleSheetsConnector {
    http: Client,
    spreadsheet_url: Option<String>,
    credentials: CredentialsConfig,
    api_base: String,
}

impl GoogleSheetsConnector {
    pub fn new(config: &ValidatorConfig) -> Result<Self, ConfigurationError> {
        let http = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            spreadsheet_url: config.spreadsheet_url.clone(),
            credentials: config.credentials.clone(),
            api_base: SHEETS_API_BASE.to_string(),
        })
    }

    /// Point at a different Sheets API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Exchange a signed assertion for a bearer token.
    async fn access_token(&self, key: &ServiceAccountKey) -> Result<String, ConfigurationError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &key.client_email,
            scope: READONLY_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = key.private_key_id.clone();

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            ConfigurationError::InvalidCredentials {
                origin: key.client_email.clone(),
                reason: format!("private key: {e}"),
            }
        })?;
        let assertion = encode(&header, &claims, &signing_key)
            .map_err(|e| ConfigurationError::Authentication(e.to_string()))?;

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| ConfigurationError::Authentication(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConfigurationError::Authentication(format!(
                "token endpoint returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ConfigurationError::Authentication(e.to_string()))?;
        Ok(token.access_token)
    }

    fn spreadsheet_endpoint(&self, id: &str) -> Result<Url, String> {
        let mut url = Url::parse(&self.api_base).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|_| format!("not a base URL: {}", self.api_base))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", id]);
        Ok(url)
    }
}

#[async_trait]
impl SpreadsheetConnector for GoogleSheetsConnector {
    async fn open(&self) -> Result<Box<dyn Spreadsheet>, ConfigurationError> {
        let url = self
            .spreadsheet_url
            .as_deref()
            .ok_or(ConfigurationError::MissingSpreadsheetUrl)?;
        let id = spreadsheet_key(url)?;

        let (source, key) = resolve_key(&self.credentials, |var| std::env::var(var).ok())?;
        debug!(source = %source, "Resolved credentials");

        let token = self.access_token(&key).await?;

        let mut endpoint = self
            .spreadsheet_endpoint(&id)
            .map_err(ConfigurationError::SpreadsheetOpen)?;
        endpoint
            .query_pairs_mut()
            .append_pair("fields", "properties.title,sheets.properties.title");

        let response = self
            .http
            .get(endpoint)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ConfigurationError::SpreadsheetOpen(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConfigurationError::SpreadsheetOpen(format!(
                "Sheets API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let metadata: SpreadsheetMetadata = response
            .json()
            .await
            .map_err(|e| ConfigurationError::SpreadsheetOpen(e.to_string()))?;

        let title = metadata.properties.map(|p| p.title).unwrap_or_default();
        let sheet_titles = metadata
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect::<HashSet<_>>();

        info!(spreadsheet = %title, sheets = sheet_titles.len(), "Opened spreadsheet");

        Ok(Box::new(GoogleSpreadsheet {
            http: self.http.clone(),
            endpoint: self
                .spreadsheet_endpoint(&id)
                .map_err(ConfigurationError::SpreadsheetOpen)?,
            token,
            title,
            sheet_titles,
        }))
    }
}

/// An opened spreadsheet holding a bearer token for its lifetime.
struct GoogleSpreadsheet {
    http: Client,
    endpoint: Url,
    token: String,
    title: String,
    sheet_titles: HashSet<String>,
}

#[async_trait]
impl Spreadsheet for GoogleSpreadsheet {
    fn title(&self) -> &str {
        &self.title
    }

    async fn worksheet(&self, title: &str) -> Result<SheetTable, LookupError> {
        if !self.sheet_titles.contains(title) {
            return Err(LookupError::MissingSheet(title.to_string()));
        }

        let transport = |message: String| LookupError::Transport {
            sheet: title.to_string(),
            message,
        };

        let range = whole_sheet_range(title);
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| transport("spreadsheet endpoint is not a base URL".to_string()))?
            .extend(["values", range.as_str()]);
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("dateTimeRenderOption", "FORMATTED_STRING")
            .append_pair("majorDimension", "ROWS");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transport(format!(
                "Sheets API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let values: ValueRange = response.json().await.map_err(|e| transport(e.to_string()))?;
        debug!(sheet = %title, rows = values.values.len(), "Fetched worksheet");

        SheetTable::from_values(title, values.values)
    }
}
