//! End-to-end analysis run: raw flights in, conflicts and summary out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucketing::{band_reach, MAX_BAND_REACH};
use crate::conflict::{build_conflicts, ConflictDetector};
use crate::map_data::{build_map_data, MapData};
use crate::models::{AnalysisSummary, Conflict, ConflictSample, Flight, RawFlight};
use crate::rules::{SeparationRules, DEFAULT_FINE_STEP_SEC};
use crate::sampling::sample_flights;
use crate::segments::build_flight_from_raw;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("sampling step must be a positive number of seconds, got {0}")]
    InvalidStep(i64),
    #[error("separation rules must use positive, finite values")]
    InvalidRules,
    #[error("horizontal minimum spans {0} latitude bands; raise the cell size or lower the minimum")]
    BandReachTooLarge(i64),
}

/// Tunables for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Sampling step in seconds
    pub step_sec: i64,
    #[serde(default)]
    pub rules: SeparationRules,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            step_sec: DEFAULT_FINE_STEP_SEC,
            rules: SeparationRules::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn with_step(step_sec: i64) -> Self {
        Self {
            step_sec,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.step_sec <= 0 {
            return Err(AnalysisError::InvalidStep(self.step_sec));
        }
        let rules = &self.rules;
        let usable = |v: f64| v.is_finite() && v >= 0.0;
        if !usable(rules.horizontal_threshold_nm)
            || !usable(rules.vertical_threshold_ft)
            || !(rules.cell_size_deg.is_finite() && rules.cell_size_deg > 0.0)
        {
            return Err(AnalysisError::InvalidRules);
        }
        let reach = band_reach(rules);
        if reach > MAX_BAND_REACH {
            return Err(AnalysisError::BandReachTooLarge(reach));
        }
        Ok(())
    }
}

/// A flight left out of the run because its route could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedFlight {
    pub flight_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub flights: Vec<Flight>,
    pub conflicts: Vec<Conflict>,
    pub conflict_samples: Vec<ConflictSample>,
    pub summary: AnalysisSummary,
    pub map_data: MapData,
    #[serde(default)]
    pub rejected: Vec<RejectedFlight>,
}

/// Detection output for a set of already-built flights.
#[derive(Debug, Clone, Default)]
pub struct TrafficConflicts {
    pub sample_count: usize,
    pub conflict_samples: Vec<ConflictSample>,
    pub conflicts: Vec<Conflict>,
}

/// Build flights, skipping (and reporting) those with unparseable routes.
pub fn build_flights(raw_flights: &[RawFlight]) -> (Vec<Flight>, Vec<RejectedFlight>) {
    let mut flights = Vec::with_capacity(raw_flights.len());
    let mut rejected = Vec::new();

    for raw in raw_flights {
        match build_flight_from_raw(raw) {
            Ok(flight) => flights.push(flight),
            Err(err) => {
                tracing::warn!(flight_id = %raw.acid, error = %err, "Rejected flight route");
                rejected.push(RejectedFlight {
                    flight_id: raw.acid.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    (flights, rejected)
}

/// Sample, detect and aggregate for a fixed set of flights.
pub fn detect_traffic_conflicts(flights: &[Flight], options: &AnalysisOptions) -> TrafficConflicts {
    let points = sample_flights(flights, options.step_sec);
    let conflict_samples = ConflictDetector::new(options.rules.clone()).detect_samples(&points);
    let conflicts = build_conflicts(&conflict_samples);

    TrafficConflicts {
        sample_count: points.len(),
        conflict_samples,
        conflicts,
    }
}

pub fn summarize(flights: &[Flight], traffic: &TrafficConflicts) -> AnalysisSummary {
    let segments: usize = flights.iter().map(|flight| flight.segments.len()).sum();
    let per_flight = |total: usize| {
        if flights.is_empty() {
            0.0
        } else {
            total as f64 / flights.len() as f64
        }
    };

    AnalysisSummary {
        flights: flights.len(),
        segments,
        samples: traffic.sample_count,
        average_segments_per_flight: per_flight(segments),
        average_samples_per_flight: per_flight(traffic.sample_count),
        conflicts: traffic.conflicts.len(),
        conflict_samples: traffic.conflict_samples.len(),
    }
}

/// Run the whole pipeline on a validated batch.
pub fn analyze_flights(
    raw_flights: &[RawFlight],
    options: &AnalysisOptions,
) -> Result<AnalysisResult, AnalysisError> {
    options.validate()?;

    let (flights, rejected) = build_flights(raw_flights);
    let traffic = detect_traffic_conflicts(&flights, options);
    let summary = summarize(&flights, &traffic);
    let map_data = build_map_data(&flights, &traffic.conflicts, &traffic.conflict_samples);

    tracing::debug!(
        flights = summary.flights,
        rejected = rejected.len(),
        samples = summary.samples,
        conflicts = summary.conflicts,
        step_sec = options.step_sec,
        "analysis complete"
    );

    Ok(AnalysisResult {
        flights,
        conflicts: traffic.conflicts,
        conflict_samples: traffic.conflict_samples,
        summary,
        map_data,
        rejected,
    })
}
