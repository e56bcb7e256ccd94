//! Simulation pipeline
//!
//! The per-request state machine: reserved-path bypass, path match, method
//! match, delay, three-stage selection, example materialization, and the
//! final write. Selection misses are control flow, never errors; the
//! pipeline short-circuits to the appropriate HTTP status instead.

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::delay::{apply_delay, calculate_delay};
use crate::selector::{select_content, select_example, select_response, SimulationQuery};
use crate::service::ConfigurationService;

/// Reserved health-check path; requests to it skip simulation entirely
pub const HEALTH_PATH: &str = "/health";
/// Reserved admin prefix; never simulated
pub const ADMIN_PREFIX: &str = "/__simulator";

/// Request-derived inputs the pipeline needs
#[derive(Debug, Clone)]
pub struct SimulationRequest<'a> {
    pub method: &'a str,
    /// Path component only, no query string
    pub path: &'a str,
    /// Raw query string (the part after `?`), if any
    pub query: Option<&'a str>,
    /// Raw Accept header value, if any
    pub accept: Option<&'a str>,
}

/// What the pipeline decided to put on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
    /// Reserved path; the transport handles it outside simulation
    Bypassed,
    /// A simulated response
    Response(SimulatedResponse),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedResponse {
    pub status: StatusCode,
    pub media_type: Option<String>,
    pub body: String,
}

impl SimulatedResponse {
    fn status_only(status: StatusCode) -> Self {
        Self {
            status,
            media_type: None,
            body: String::new(),
        }
    }
}

/// Orchestrates configuration lookup, selection, delay, and materialization
#[derive(Debug)]
pub struct Simulator {
    service: Arc<ConfigurationService>,
}

impl Simulator {
    pub fn new(service: Arc<ConfigurationService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<ConfigurationService> {
        &self.service
    }

    /// Run one request through the pipeline
    pub async fn simulate(
        &self,
        request: SimulationRequest<'_>,
        cancel: &CancellationToken,
    ) -> SimulationOutcome {
        if Self::is_reserved(request.path) {
            return SimulationOutcome::Bypassed;
        }

        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let (response, delay_ms) = self.run(&request, cancel).await;
        let total_ms = started.elapsed().as_millis() as u64;

        info!(
            request_id = %request_id,
            method = %request.method,
            path = %request.path,
            status = response.status.as_u16(),
            delay_ms = delay_ms,
            processing_ms = total_ms.saturating_sub(delay_ms),
            "Request simulated"
        );

        SimulationOutcome::Response(response)
    }

    fn is_reserved(path: &str) -> bool {
        path.eq_ignore_ascii_case(HEALTH_PATH)
            || path == ADMIN_PREFIX
            || path
                .strip_prefix(ADMIN_PREFIX)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    async fn run(
        &self,
        request: &SimulationRequest<'_>,
        cancel: &CancellationToken,
    ) -> (SimulatedResponse, u64) {
        // PathMatch
        let Some(path) = self.service.path_by_uri(request.path) else {
            return (SimulatedResponse::status_only(StatusCode::NOT_FOUND), 0);
        };

        // MethodMatch
        let Some(operation) = path.operation(request.method) else {
            return (
                SimulatedResponse::status_only(StatusCode::METHOD_NOT_ALLOWED),
                0,
            );
        };

        // Delay
        let delay_ms = calculate_delay(operation.min_delay, operation.max_delay);
        apply_delay(delay_ms).await;

        // ResponseSelect / ContentSelect / ExampleSelect
        let query = request
            .query
            .map(SimulationQuery::parse)
            .unwrap_or_default();

        let Some(response) = select_response(operation, &query) else {
            return (SimulatedResponse::status_only(StatusCode::NOT_FOUND), delay_ms);
        };
        let Some(content) = select_content(response, request.accept) else {
            return (SimulatedResponse::status_only(StatusCode::NOT_FOUND), delay_ms);
        };
        let Some(example) = select_example(content, &query) else {
            return (SimulatedResponse::status_only(StatusCode::NOT_FOUND), delay_ms);
        };

        // Materialize: the bulk prefetch may not have reached this entry yet
        let body = match example.value() {
            Some(value) => value,
            None => match example.external_value.as_deref() {
                Some(url) => match self.service.fetcher().fetch(url, cancel).await {
                    Ok(fetched) => {
                        example.set_value(fetched.clone());
                        fetched
                    }
                    Err(e) => {
                        warn!(url = %url, error = %e,
                            "On-demand external fetch failed, serving empty body");
                        String::new()
                    }
                },
                None => String::new(),
            },
        };

        // Write: status code was validated at load time; re-check defensively
        let status = match response
            .parsed_status()
            .and_then(|code| StatusCode::from_u16(code).ok())
        {
            Some(status) => status,
            None => {
                error!(
                    status_code = %response.status_code,
                    path = %request.path,
                    "Configured status code is invalid, defaulting to 200"
                );
                StatusCode::OK
            }
        };

        (
            SimulatedResponse {
                status,
                media_type: Some(content.media_type.clone()),
                body,
            },
            delay_ms,
        )
    }
}
