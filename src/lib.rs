//! Certificate validator
//!
//! Looks up a certificate issuance by its validation code in a Google
//! spreadsheet, joins it with the person and event sheets, and renders a
//! pass/fail page with a link to the certificate PDF.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  web: GET/POST /, GET /api/verify            │
//! └──────────────────────────────────────────────┘
//!                       │ code
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  VerificationService (one cycle per request) │
//! └──────────────────────────────────────────────┘
//!        │ open            │ load           │ lookup
//!        ▼                 ▼                ▼
//!   credentials +     loader:          lookup: pure
//!   sheets connector  3 typed tables   filter + joins
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cert_validator::{AppState, GoogleSheetsConnector, ValidatorConfig};
//!
//! let config = ValidatorConfig::load()?;
//! let connector = Arc::new(GoogleSheetsConnector::new(&config)?);
//! let state = AppState::new(connector, &config)?;
//! let app = cert_validator::web::build_router(state, &config.page.assets_dir);
//! ```

pub mod cell;
pub mod config;
pub mod credentials;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod records;
pub mod service;
pub mod sheets;
pub mod web;

pub use config::ValidatorConfig;
pub use error::{ConfigurationError, LookupError};
pub use loader::{load_dataset, Dataset};
pub use lookup::{lookup, Certificate, LookupOutcome};
pub use service::{Verdict, VerificationService};
pub use sheets::{GoogleSheetsConnector, InMemoryConnector, Workbook};
pub use web::{build_router, AppState};
