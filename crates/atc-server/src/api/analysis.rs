use std::sync::Arc;

use atc_core::{validate_flights, AnalysisOptions, AnalysisResult, RawFlight};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::{analysis_error, api_error, ingest_error, json_rejection, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub flights: Vec<RawFlight>,
    #[serde(default)]
    pub step_sec: Option<i64>,
}

#[derive(Serialize)]
struct AnalysisResponse<'a> {
    analysis_id: &'a str,
    #[serde(flatten)]
    analysis: &'a AnalysisResult,
}

fn respond(analysis_id: &str, analysis: &AnalysisResult) -> Response {
    Json(AnalysisResponse {
        analysis_id,
        analysis,
    })
    .into_response()
}

/// Run the conflict pipeline over a batch of uploaded flights.
pub async fn run_analysis(
    State(state): State<Arc<AppState>>,
    request: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(json_rejection)?;
    validate_flights(&request.flights).map_err(ingest_error)?;
    let options =
        AnalysisOptions::with_step(request.step_sec.unwrap_or(state.config().sample_step_secs));
    let (analysis_id, result) = state
        .analyze(&request.flights, &options)
        .map_err(analysis_error)?;

    tracing::info!(
        analysis_id = %analysis_id,
        flights = result.summary.flights,
        rejected = result.rejected.len(),
        conflicts = result.summary.conflicts,
        "Analysis ready"
    );
    Ok(respond(&analysis_id, &result))
}

pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(analysis_id): Path<String>,
) -> Result<Response, ApiError> {
    let result = state.cached_analysis(&analysis_id).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            "Analysis not found",
            format!("no cached analysis with id {analysis_id}"),
        )
    })?;
    Ok(respond(&analysis_id, &result))
}
