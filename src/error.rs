//! Error types for Firm AI.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::constants;
use crate::flow::Stage;

/// Failures of a single consultation at the gateway boundary.
///
/// Each variant maps to exactly one caller-facing status and body; the detail of an upstream
/// failure stays in the operator log.
#[derive(Debug, thiserror::Error)]
pub enum ConsultError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("request body could not be decoded: {0}")]
    InvalidBody(String),

    #[error("generation credential is not configured")]
    ConfigurationMissing,

    #[error("generation failed: {0}")]
    GenerationFailed(#[from] GenerationError),
}

impl ConsultError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::ConfigurationMissing | Self::GenerationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body sent to the caller. Server-side failures also carry a displayable `response`.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::MissingFields(_) => json!({ "error": constants::MISSING_FIELDS_ERROR }),
            Self::InvalidBody(_) => json!({ "error": constants::INVALID_BODY_ERROR }),
            Self::ConfigurationMissing => json!({
                "error": constants::API_KEY_MISSING_ERROR,
                "response": constants::API_KEY_PLACEHOLDER,
            }),
            Self::GenerationFailed(_) => json!({
                "error": constants::GENERATION_FAILED_ERROR,
                "response": constants::GENERATION_FALLBACK,
            }),
        }
    }
}

impl IntoResponse for ConsultError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Errors from the outbound text-generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation credential is not configured")]
    MissingCredential,

    #[error("request to generation API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation API returned no completion text")]
    EmptyCompletion,
}

/// Errors from the logging webhook. Contained inside the logger, never returned to callers.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Invalid form-flow transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("the {0} field must not be empty")]
    EmptyField(Stage),

    #[error("cannot go back from the {0} stage")]
    NoBackEdge(Stage),

    #[error("a consultation request is already in flight")]
    RequestInFlight,

    #[error("no consultation request is in flight")]
    NoRequestInFlight,

    #[error("{event} is not valid in the {stage} stage")]
    InvalidEvent { stage: Stage, event: &'static str },

    #[error("no suggestion at index {0}")]
    UnknownSuggestion(usize),
}
