use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use tracing::error;

use super::AppState;
use crate::service::Verdict;

/// `c` carries the validation code, both in the query string and in the form.
#[derive(Debug, Default, Deserialize)]
pub struct CodeParams {
    pub c: Option<String>,
}

fn page_status(verdict: Option<&Verdict>) -> StatusCode {
    match verdict {
        Some(Verdict::ConfigurationFailed(_)) => StatusCode::SERVICE_UNAVAILABLE,
        Some(Verdict::LookupFailed(_)) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    }
}

fn render(state: &AppState, code: &str, verdict: Option<&Verdict>) -> Response {
    match state.presenter.render(code, verdict) {
        Ok(html) => (page_status(verdict), Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "Page render failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /: a non-empty `c` in the URL triggers the lookup on load.
pub async fn page(State(state): State<AppState>, Query(params): Query<CodeParams>) -> Response {
    match params.c.filter(|c| !c.is_empty()) {
        Some(code) => {
            let verdict = state.service.verify(&code).await;
            render(&state, &code, Some(&verdict))
        }
        None => match state.service.check_connection().await {
            Ok(()) => render(&state, "", None),
            Err(e) => render(&state, "", Some(&Verdict::ConfigurationFailed(e))),
        },
    }
}

/// POST /: the field value at submit time is the code.
pub async fn submit(State(state): State<AppState>, Form(form): Form<CodeParams>) -> Response {
    let code = form.c.unwrap_or_default();
    let verdict = state.service.verify(&code).await;
    render(&state, &code, Some(&verdict))
}

/// GET /api/verify: JSON verdict.
pub async fn api_verify(
    State(state): State<AppState>,
    Query(params): Query<CodeParams>,
) -> Response {
    let code = params.c.unwrap_or_default();
    let verdict = state.service.verify(&code).await;
    let status =
        StatusCode::from_u16(verdict.api_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(verdict.to_body(state.show_error_detail))).into_response()
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
