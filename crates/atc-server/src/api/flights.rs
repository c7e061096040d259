use atc_core::{generate_flights, ingest_flights, IngestResult, RawFlight, SyntheticConfig};
use axum::{extract::Query, http::StatusCode, Json};
use serde::Deserialize;

use crate::api::error::{api_error, ingest_error, synthetic_error, ApiError};

const MAX_SYNTHETIC_FLIGHTS: usize = 2_000;

/// Validate an uploaded JSON or CSV flight batch.
pub async fn ingest(body: String) -> Result<Json<IngestResult>, ApiError> {
    let result = ingest_flights(&body).map_err(ingest_error)?;
    tracing::info!(count = result.count, "Flight batch accepted");
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct SyntheticQuery {
    count: Option<usize>,
    seed: Option<u64>,
    crossing_pairs: Option<usize>,
}

pub async fn synthetic(
    Query(query): Query<SyntheticQuery>,
) -> Result<Json<Vec<RawFlight>>, ApiError> {
    let defaults = SyntheticConfig::default();
    let config = SyntheticConfig {
        count: query.count.unwrap_or(defaults.count),
        seed: query.seed.unwrap_or(defaults.seed),
        crossing_pairs: query.crossing_pairs.unwrap_or(defaults.crossing_pairs),
        ..defaults
    };

    if config.count > MAX_SYNTHETIC_FLIGHTS {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid synthetic traffic options",
            format!("count must be at most {MAX_SYNTHETIC_FLIGHTS}"),
        ));
    }

    generate_flights(&config).map(Json).map_err(synthetic_error)
}
