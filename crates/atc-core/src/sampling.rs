//! Discretizes segments into fixed-step trajectory points.

use crate::models::{Flight, Segment, TrajectoryPoint, Waypoint};
use crate::rules::DEFAULT_COARSE_STEP_SEC;

pub const DEFAULT_SAMPLE_STEP_SEC: i64 = DEFAULT_COARSE_STEP_SEC;

/// Linear lat/lon position along a segment at `t`, clamped to its endpoints.
pub fn interpolate_segment(segment: &Segment, t: f64) -> Waypoint {
    if segment.t_end <= segment.t_start {
        return segment.from;
    }

    let alpha = ((t - segment.t_start) / (segment.t_end - segment.t_start)).clamp(0.0, 1.0);
    Waypoint::new(
        segment.from.lat + (segment.to.lat - segment.from.lat) * alpha,
        segment.from.lon + (segment.to.lon - segment.from.lon) * alpha,
    )
}

/// Points at every multiple of `step_sec` inside `[t_start, t_end]`.
fn sample_segment(flight_id: &str, segment: &Segment, step_sec: i64) -> Vec<TrajectoryPoint> {
    if segment.t_end <= segment.t_start || step_sec <= 0 {
        return Vec::new();
    }

    let step = step_sec as f64;
    let first_tick = (segment.t_start / step).ceil() as i64;
    let last_tick = (segment.t_end / step).floor() as i64;

    (first_tick..=last_tick)
        .map(|tick| {
            let t_sec = tick * step_sec;
            let position = interpolate_segment(segment, t_sec as f64);
            TrajectoryPoint {
                flight_id: flight_id.to_string(),
                t_sec,
                lat: position.lat,
                lon: position.lon,
                alt_ft: segment.altitude_ft,
                segment_index: segment.index,
            }
        })
        .collect()
}

/// Sample every segment of a flight, in segment order.
///
/// A tick that falls exactly on a boundary between two legs is emitted by both.
pub fn sample_flight(flight: &Flight, step_sec: i64) -> Vec<TrajectoryPoint> {
    flight
        .segments
        .iter()
        .flat_map(|segment| sample_segment(&flight.id, segment, step_sec))
        .collect()
}

pub fn sample_flights(flights: &[Flight], step_sec: i64) -> Vec<TrajectoryPoint> {
    flights
        .iter()
        .flat_map(|flight| sample_flight(flight, step_sec))
        .collect()
}
