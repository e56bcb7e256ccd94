//! HTTP request handlers

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::state::AppState;
use crate::error::SimulationError;
use crate::pipeline::{SimulationOutcome, SimulationRequest};
use crate::service::ConfigurationSummary;

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /__simulator/reload
///
/// Re-loads the simulation configuration and kicks off a fresh external
/// value prefetch. On failure the previous configuration stays live.
pub async fn admin_reload(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, SimulationError> {
    let service = state.simulator.service().clone();
    service.reload()?;

    let summary = service.summary();

    // Prefetch runs in the background, tied to process shutdown
    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = service.fetch_external_values(&shutdown).await {
            tracing::warn!(error = %e, "Post-reload prefetch did not complete");
        }
    });

    Ok(Json(json!({
        "status": "reloaded",
        "paths": summary.path_count,
        "examples": summary.example_count,
    })))
}

/// GET /__simulator/config
pub async fn admin_config(State(state): State<AppState>) -> Json<ConfigurationSummary> {
    Json(state.simulator.service().summary())
}

/// Catch-all simulation handler
pub async fn simulate(State(state): State<AppState>, request: Request) -> Response {
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let accept = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // Per-request token: follows process shutdown, dies with the request
    let cancel = state.shutdown.child_token();
    let outcome = state
        .simulator
        .simulate(
            SimulationRequest {
                method: &method,
                path: &path,
                query: query.as_deref(),
                accept: accept.as_deref(),
            },
            &cancel,
        )
        .await;

    match outcome {
        // Reserved paths are routed before the fallback; reaching here means
        // a reserved sub-path with no route, which is a plain 404.
        SimulationOutcome::Bypassed => StatusCode::NOT_FOUND.into_response(),
        SimulationOutcome::Response(simulated) => {
            let mut builder = Response::builder().status(simulated.status);
            if let Some(media_type) = &simulated.media_type {
                builder = builder.header(header::CONTENT_TYPE, media_type);
            }
            builder
                .body(simulated.body.into())
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}
