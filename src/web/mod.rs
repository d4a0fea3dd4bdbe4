//! HTTP surface
//!
//!   GET  /             page; `?c=<code>` pre-fills the field and runs the lookup
//!   POST /             form submit (field `c`); the submitted value wins
//!   GET  /api/verify   JSON verdict for `?c=<code>`
//!   GET  /health       liveness, no spreadsheet access
//!   GET  /assets/*     static files (logo)

pub mod handlers;
pub mod page;

use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::ValidatorConfig;
use crate::service::VerificationService;
use crate::sheets::SpreadsheetConnector;

pub use page::Presenter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: VerificationService,
    pub presenter: Arc<Presenter>,
    pub show_error_detail: bool,
}

impl AppState {
    pub fn new(
        connector: Arc<dyn SpreadsheetConnector>,
        config: &ValidatorConfig,
    ) -> Result<Self, handlebars::TemplateError> {
        Ok(Self {
            service: VerificationService::new(connector, config),
            presenter: Arc::new(Presenter::new(config.page.clone(), config.show_error_detail)?),
            show_error_detail: config.show_error_detail,
        })
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState, assets_dir: &Path) -> Router {
    Router::new()
        .route("/", get(handlers::page).post(handlers::submit))
        .route("/api/verify", get(handlers::api_verify))
        .route("/health", get(handlers::health))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
