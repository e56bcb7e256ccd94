//! Error types for the API simulator

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for simulator operations
pub type SimulatorResult<T> = Result<T, SimulationError>;

/// Main error type for simulation operations
#[derive(Error, Debug, Clone)]
pub enum SimulationError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        param: Option<String>,
    },

    // External value fetching
    #[error("External fetch failed for {url}: {reason}")]
    ExternalFetch { url: String, reason: String },

    #[error("Disallowed URL scheme: {0} (only http and https are permitted)")]
    DisallowedScheme(String),

    // Cancellation
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response envelope returned by admin endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: ErrorDetail {
                message: message.to_string(),
                error_type: error_type.to_string(),
                param: None,
            },
        }
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.error.param = Some(param.to_string());
        self
    }
}

impl SimulationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::ExternalFetch { .. } => StatusCode::BAD_GATEWAY,
            Self::DisallowedScheme(_) => StatusCode::BAD_REQUEST,
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &str {
        match self {
            Self::Config(_) => "configuration_error",
            Self::Validation { .. } => "validation_error",
            Self::ExternalFetch { .. } => "external_fetch_error",
            Self::DisallowedScheme(_) => "disallowed_scheme",
            Self::Cancelled => "cancelled",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let mut response = ErrorResponse::new(self.error_type(), &self.to_string());

        if let Self::Validation { param: Some(p), .. } = self {
            response = response.with_param(p);
        }

        response
    }
}

impl IntoResponse for SimulationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_error_response());
        (status, body).into_response()
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON parse error: {}", err))
    }
}
