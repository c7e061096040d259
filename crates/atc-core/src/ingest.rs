//! Flight upload parsing (JSON or CSV) with batch validation.
//!
//! Any invalid record rejects the whole batch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::RawFlight;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of flight records")]
    NotAnArray,
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

impl IngestError {
    fn record(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            index,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResult {
    pub flights: Vec<RawFlight>,
    pub count: usize,
}

pub fn ingest_flights(text: &str) -> Result<IngestResult, IngestError> {
    let flights = parse_flight_text(text)?;
    tracing::debug!(count = flights.len(), "flights ingested");
    Ok(IngestResult {
        count: flights.len(),
        flights,
    })
}

/// Parse uploaded text, sniffing JSON by its first character.
pub fn parse_flight_text(text: &str) -> Result<Vec<RawFlight>, IngestError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        parse_json(trimmed)
    } else {
        parse_csv(trimmed)
    }
}

fn parse_json(text: &str) -> Result<Vec<RawFlight>, IngestError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(records) = value else {
        return Err(IngestError::NotAnArray);
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let flight: RawFlight = serde_json::from_value(record)
                .map_err(|err| IngestError::record(index, err.to_string()))?;
            validate_raw_flight(index, &flight)?;
            Ok(flight)
        })
        .collect()
}

/// Column names accepted for each field, in lookup order.
const ACID_COLUMNS: &[&str] = &["ACID", "acid"];
const PLANE_TYPE_COLUMNS: &[&str] = &["Plane type", "plane_type"];
const ROUTE_COLUMNS: &[&str] = &["route"];
const ALTITUDE_COLUMNS: &[&str] = &["altitude"];
const DEPARTURE_AIRPORT_COLUMNS: &[&str] = &["departure airport", "departure_airport"];
const ARRIVAL_AIRPORT_COLUMNS: &[&str] = &["arrival airport", "arrival_airport"];
const DEPARTURE_TIME_COLUMNS: &[&str] = &["departure time", "departure_time"];
const SPEED_COLUMNS: &[&str] = &["aircraft speed", "aircraft_speed"];
const PASSENGER_COLUMNS: &[&str] = &["passengers"];
const CARGO_COLUMNS: &[&str] = &["is_cargo"];

fn parse_csv(text: &str) -> Result<Vec<RawFlight>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut flights = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let cells: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(row.iter())
            .collect();
        let cell = |columns: &[&str]| lookup(&cells, columns);

        let flight = RawFlight {
            acid: cell(ACID_COLUMNS).to_string(),
            plane_type: cell(PLANE_TYPE_COLUMNS).to_string(),
            route: cell(ROUTE_COLUMNS).to_string(),
            altitude: parse_integer(index, "altitude", cell(ALTITUDE_COLUMNS))?,
            departure_airport: cell(DEPARTURE_AIRPORT_COLUMNS).to_string(),
            arrival_airport: cell(ARRIVAL_AIRPORT_COLUMNS).to_string(),
            departure_time: parse_integer(index, "departure time", cell(DEPARTURE_TIME_COLUMNS))?,
            aircraft_speed: parse_number(index, "aircraft speed", cell(SPEED_COLUMNS))?,
            passengers: parse_passengers(index, cell(PASSENGER_COLUMNS))?,
            is_cargo: cell(CARGO_COLUMNS).eq_ignore_ascii_case("true"),
        };
        validate_raw_flight(index, &flight)?;
        flights.push(flight);
    }

    Ok(flights)
}

fn lookup<'a>(cells: &HashMap<&str, &'a str>, columns: &[&str]) -> &'a str {
    columns
        .iter()
        .find_map(|column| cells.get(column).copied())
        .unwrap_or("")
}

/// Empty cells read as zero, matching spreadsheet exports.
fn parse_number(index: usize, field: &str, raw: &str) -> Result<f64, IngestError> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| IngestError::record(index, format!("{field} is not a number: {raw:?}")))
}

fn parse_integer(index: usize, field: &str, raw: &str) -> Result<i64, IngestError> {
    let value = parse_number(index, field, raw)?;
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return Err(IngestError::record(
            index,
            format!("{field} must be an integer: {raw:?}"),
        ));
    }
    Ok(value as i64)
}

fn parse_passengers(index: usize, raw: &str) -> Result<u32, IngestError> {
    let value = parse_integer(index, "passengers", raw)?;
    u32::try_from(value).map_err(|_| {
        IngestError::record(index, format!("passengers must be a non-negative integer: {raw:?}"))
    })
}

/// Validate an already-decoded batch; the first bad record rejects it.
pub fn validate_flights(flights: &[RawFlight]) -> Result<(), IngestError> {
    flights
        .iter()
        .enumerate()
        .try_for_each(|(index, flight)| validate_raw_flight(index, flight))
}

/// Schema checks shared by both encodings.
pub fn validate_raw_flight(index: usize, flight: &RawFlight) -> Result<(), IngestError> {
    let min_len = |field: &str, value: &str, min: usize| {
        if value.chars().count() < min {
            Err(IngestError::record(
                index,
                format!("{field} must be at least {min} characters"),
            ))
        } else {
            Ok(())
        }
    };

    min_len("ACID", &flight.acid, 1)?;
    min_len("Plane type", &flight.plane_type, 1)?;
    min_len("route", &flight.route, 3)?;
    min_len("departure airport", &flight.departure_airport, 3)?;
    min_len("arrival airport", &flight.arrival_airport, 3)?;

    if !flight.aircraft_speed.is_finite() {
        return Err(IngestError::record(index, "aircraft speed must be finite"));
    }
    Ok(())
}
