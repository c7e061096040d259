use std::sync::Arc;

use atc_core::{
    apply_resolution, build_flights, score_resolutions, summarize_resolutions, validate_flights,
    AnalysisOptions, Conflict, RawFlight, RejectedFlight, ResolutionCandidate, ResolutionOutcome,
    ResolutionSummary, SeparationRules,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::{ingest_error, json_rejection, resolution_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub candidates: Vec<ResolutionCandidate>,
    pub summary: ResolutionSummary,
}

/// Rank single-variable mitigations for a set of conflicts.
pub async fn score(
    request: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let Json(request) = request.map_err(json_rejection)?;
    let rules = SeparationRules::default();
    let candidates = score_resolutions(&request.conflicts, &rules);
    let summary = summarize_resolutions(&request.conflicts, &candidates);
    Ok(Json(ScoreResponse {
        candidates,
        summary,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub flights: Vec<RawFlight>,
    pub candidate: ResolutionCandidate,
    #[serde(default)]
    pub step_sec: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
    /// Flights left out of the what-if because their routes did not parse
    pub rejected: Vec<RejectedFlight>,
}

/// Re-run detection with one candidate applied.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    request: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<Json<ApplyResponse>, ApiError> {
    let Json(request) = request.map_err(json_rejection)?;
    validate_flights(&request.flights).map_err(ingest_error)?;
    let options =
        AnalysisOptions::with_step(request.step_sec.unwrap_or(state.config().sample_step_secs));
    let (flights, rejected) = build_flights(&request.flights);

    let outcome =
        apply_resolution(&flights, &request.candidate, &options).map_err(resolution_error)?;
    tracing::info!(
        candidate = %outcome.applied_candidate.id,
        target_cleared = outcome.target_cleared,
        new_conflicts = outcome.new_conflicts.len(),
        rejected = rejected.len(),
        "Resolution evaluated"
    );
    Ok(Json(ApplyResponse { outcome, rejected }))
}
