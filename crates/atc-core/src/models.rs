//! Core data models for trajectory analysis.

use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Flight record as uploaded by an operator (JSON or CSV).
///
/// Field names follow the upload format; snake_case aliases are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFlight {
    #[serde(rename = "ACID", alias = "acid")]
    pub acid: String,
    #[serde(rename = "Plane type", alias = "plane_type")]
    pub plane_type: String,
    pub route: String,
    /// Cruise altitude in feet
    #[serde(deserialize_with = "whole_number")]
    pub altitude: i64,
    #[serde(rename = "departure airport", alias = "departure_airport")]
    pub departure_airport: String,
    #[serde(rename = "arrival airport", alias = "arrival_airport")]
    pub arrival_airport: String,
    /// Departure time in epoch seconds
    #[serde(
        rename = "departure time",
        alias = "departure_time",
        deserialize_with = "whole_number"
    )]
    pub departure_time: i64,
    /// Cruise speed in knots
    #[serde(rename = "aircraft speed", alias = "aircraft_speed")]
    pub aircraft_speed: f64,
    #[serde(deserialize_with = "whole_number")]
    pub passengers: u32,
    pub is_cargo: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WholeNumber {
    Int(i64),
    Float(f64),
}

/// Integer field that also accepts integral floats such as `35000.0`.
fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = match WholeNumber::deserialize(deserializer)
        .map_err(|_| D::Error::custom("expected an integer"))?
    {
        WholeNumber::Int(value) => value,
        WholeNumber::Float(value)
            if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 =>
        {
            value as i64
        }
        WholeNumber::Float(value) => {
            return Err(D::Error::custom(format!("expected an integer, got {value}")))
        }
    };
    T::try_from(value).map_err(|_| D::Error::custom(format!("integer {value} is out of range")))
}

/// One great-circle leg between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub flight_id: String,
    pub index: usize,
    pub from: Waypoint,
    pub to: Waypoint,
    /// Leg start in epoch seconds
    pub t_start: f64,
    /// Leg end in epoch seconds (never before `t_start`)
    pub t_end: f64,
    pub altitude_ft: f64,
    pub distance_nm: f64,
}

/// A flight with its timed route geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub callsign: String,
    pub plane_type: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: i64,
    pub cruise_speed_kt: f64,
    pub cruise_altitude_ft: f64,
    pub passengers: u32,
    pub is_cargo: bool,
    pub segments: Vec<Segment>,
}

impl Flight {
    /// Route waypoints recovered from the segment chain.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        let mut waypoints = Vec::with_capacity(self.segments.len() + 1);
        if let Some(first) = self.segments.first() {
            waypoints.push(first.from);
        }
        waypoints.extend(self.segments.iter().map(|segment| segment.to));
        waypoints
    }

    pub fn total_distance_nm(&self) -> f64 {
        self.segments.iter().map(|segment| segment.distance_nm).sum()
    }

    /// Arrival time in epoch seconds, if the flight has any geometry.
    pub fn arrival_time(&self) -> Option<f64> {
        self.segments.last().map(|segment| segment.t_end)
    }

    pub fn departure_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.departure_time, 0)
    }
}

/// Sampled flight position at a discrete tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub flight_id: String,
    /// Tick time in epoch seconds (a multiple of the sampling step)
    pub t_sec: i64,
    pub lat: f64,
    pub lon: f64,
    pub alt_ft: f64,
    pub segment_index: usize,
}

impl TrajectoryPoint {
    pub fn position(&self) -> Waypoint {
        Waypoint::new(self.lat, self.lon)
    }
}

/// A single tick at which two different flights lose separation.
///
/// `flight_a < flight_b` lexicographically; `alt_ft_a`/`alt_ft_b` follow that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictSample {
    pub flight_a: String,
    pub flight_b: String,
    pub t_sec: i64,
    /// Arithmetic midpoint of the two positions
    pub lat: f64,
    pub lon: f64,
    pub alt_ft_a: f64,
    pub alt_ft_b: f64,
    pub horizontal_nm: f64,
    pub vertical_ft: f64,
}

/// Aggregated loss-of-separation event for one flight pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    pub flight_a: String,
    pub flight_b: String,
    pub t_start: i64,
    pub t_end: i64,
    pub min_horizontal_nm: f64,
    pub min_vertical_ft: f64,
    /// Midpoint of the worst sample
    pub representative_lat: f64,
    pub representative_lon: f64,
    /// Contributing samples ordered by time
    pub samples: Vec<ConflictSample>,
}

impl Conflict {
    pub fn involves(&self, flight_id: &str) -> bool {
        self.flight_a == flight_id || self.flight_b == flight_id
    }

    pub fn pair_key(&self) -> (String, String) {
        (self.flight_a.clone(), self.flight_b.clone())
    }
}

/// The single variable a resolution candidate adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    Delay,
    Altitude,
    Speed,
}

impl ResolutionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionKind::Delay => "delay",
            ResolutionKind::Altitude => "altitude",
            ResolutionKind::Speed => "speed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    /// Scored but not expected to clear the conflict
    #[default]
    Pending,
    /// Expected to clear the conflict
    Valid,
    /// Rejected by a feasibility check
    Invalid,
}

/// A single-variable mitigation proposed for one conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionCandidate {
    pub id: String,
    pub conflict_id: String,
    pub flight_a: String,
    pub flight_b: String,
    /// Flight being adjusted
    pub flight_id: String,
    pub kind: ResolutionKind,
    pub delta_time_sec: i64,
    pub delta_altitude_ft: f64,
    /// Negative values slow the flight down
    pub delta_speed_kt: f64,
    pub estimated_horizontal_gain_nm: f64,
    pub estimated_vertical_gain_ft: f64,
    pub cost: f64,
    pub resolves_conflict: bool,
    #[serde(default)]
    pub status: CandidateStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ResolutionCandidate {
    pub fn is_adjustment(&self) -> bool {
        self.delta_time_sec != 0 || self.delta_altitude_ft != 0.0 || self.delta_speed_kt != 0.0
    }
}

/// Aggregate counts for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub flights: usize,
    pub segments: usize,
    pub samples: usize,
    pub average_segments_per_flight: f64,
    pub average_samples_per_flight: f64,
    pub conflicts: usize,
    pub conflict_samples: usize,
}
