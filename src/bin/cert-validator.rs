//! cert-validator: certificate verification web server.
//!
//! Reads config from `config/validator.yaml` (or CERT_VALIDATOR_CONFIG) plus
//! CERT_VALIDATOR_* env vars; see `cert_validator::config`.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use cert_validator::{build_router, AppState, GoogleSheetsConnector, ValidatorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cert_validator=debug,tower_http=debug".into()),
        )
        .init();

    let config = ValidatorConfig::load()?;
    if config.spreadsheet_url.is_none() {
        tracing::warn!("No spreadsheet URL configured; every lookup will report a configuration error");
    }

    let connector = Arc::new(
        GoogleSheetsConnector::new(&config).context("failed to build spreadsheet client")?,
    );
    let state = AppState::new(connector, &config).context("failed to compile page template")?;
    let app = build_router(state, &config.page.assets_dir);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("cert-validator listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
