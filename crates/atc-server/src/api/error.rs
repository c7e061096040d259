//! Error bodies shared by the API handlers.

use atc_core::{AnalysisError, IngestError, ResolutionError, SyntheticError};
use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde_json::{json, Value};

pub type ApiError = (StatusCode, Json<Value>);

pub fn api_error(status: StatusCode, error: &str, message: impl ToString) -> ApiError {
    (
        status,
        Json(json!({
            "error": error,
            "message": message.to_string()
        })),
    )
}

/// Keep the extractor's status but answer with the usual error body.
pub fn json_rejection(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection, "request body rejected");
    api_error(rejection.status(), "Invalid request body", rejection.body_text())
}

pub fn ingest_error(err: IngestError) -> ApiError {
    tracing::debug!(error = %err, "flight batch rejected");
    api_error(StatusCode::UNPROCESSABLE_ENTITY, "Invalid flight data", err)
}

pub fn analysis_error(err: AnalysisError) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "Invalid analysis options", err)
}

pub fn synthetic_error(err: SyntheticError) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "Invalid synthetic traffic options", err)
}

pub fn resolution_error(err: ResolutionError) -> ApiError {
    match err {
        ResolutionError::FlightNotFound(_) => {
            api_error(StatusCode::NOT_FOUND, "Flight not found", err)
        }
        ResolutionError::Analysis(inner) => analysis_error(inner),
    }
}
