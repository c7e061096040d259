//! Seeded synthetic traffic for demos and load testing.
//!
//! Background flights fly random routes across a region. Crossing pairs are
//! engineered to reach a shared waypoint at the same minute, at the same
//! flight level, so every pair produces a conflict at any step dividing 60 s.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{RawFlight, Waypoint};
use crate::spatial::offset_by_bearing;

const AIRLINES: &[&str] = &["ACA", "WJA", "UAL", "DAL", "AAL", "JZA", "POE", "SWA"];
const CARGO_OPERATORS: &[&str] = &["FDX", "UPS", "PUR"];
const PLANE_TYPES: &[&str] = &["A320", "A321", "B738", "B38M", "E190", "CRJ9", "DH8D", "B77W"];
const CARGO_TYPES: &[&str] = &["B763", "B752", "A306"];
const AIRPORTS: &[&str] = &[
    "CYYZ", "CYUL", "CYOW", "CYVR", "CYYC", "CYEG", "CYWG", "CYHZ", "KJFK", "KBOS", "KORD", "KSEA",
];

const CARGO_PROBABILITY: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntheticError {
    #[error("region bounds must be finite with min < max")]
    InvalidRegion,
    #[error("departure window must be non-negative")]
    InvalidWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Total flights, crossing pairs included
    pub count: usize,
    pub seed: u64,
    pub crossing_pairs: usize,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    /// Epoch seconds, rounded down to a whole minute
    pub departure_start: i64,
    pub departure_window_sec: i64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            count: 20,
            seed: 42,
            crossing_pairs: 2,
            min_lat: 42.0,
            max_lat: 55.0,
            min_lon: -125.0,
            max_lon: -65.0,
            departure_start: 1_700_000_000,
            departure_window_sec: 7_200,
        }
    }
}

impl SyntheticConfig {
    fn validate(&self) -> Result<(), SyntheticError> {
        let ordered = |min: f64, max: f64| min.is_finite() && max.is_finite() && min < max;
        if !ordered(self.min_lat, self.max_lat) || !ordered(self.min_lon, self.max_lon) {
            return Err(SyntheticError::InvalidRegion);
        }
        if self.departure_window_sec < 0 {
            return Err(SyntheticError::InvalidWindow);
        }
        Ok(())
    }
}

/// Generate a deterministic batch; crossing pairs come first, in pair order.
pub fn generate_flights(config: &SyntheticConfig) -> Result<Vec<RawFlight>, SyntheticError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let base = config.departure_start - config.departure_start.rem_euclid(60);
    let window_minutes = config.departure_window_sec / 60;
    let crossing_pairs = config.crossing_pairs.min(config.count / 2);

    let mut flights = Vec::with_capacity(config.count);
    for pair in 0..crossing_pairs {
        let (a, b) = crossing_pair(&mut rng, config, base, window_minutes, pair);
        flights.push(a);
        flights.push(b);
    }
    while flights.len() < config.count {
        let index = flights.len();
        flights.push(background_flight(&mut rng, config, base, window_minutes, index));
    }

    tracing::debug!(
        count = flights.len(),
        crossing_pairs,
        seed = config.seed,
        "synthetic traffic generated"
    );
    Ok(flights)
}

fn background_flight(
    rng: &mut StdRng,
    config: &SyntheticConfig,
    base: i64,
    window_minutes: i64,
    index: usize,
) -> RawFlight {
    let waypoint_count = rng.random_range(2..=5);
    let waypoints: Vec<Waypoint> = (0..waypoint_count)
        .map(|_| random_waypoint(rng, config))
        .collect();
    let departure_time = base + rng.random_range(0..=window_minutes) * 60;
    let speed = rng.random_range(420..=520) as f64;

    build_record(rng, index, &waypoints, departure_time, speed)
}

/// Two flights crossing a shared waypoint at the same whole minute.
fn crossing_pair(
    rng: &mut StdRng,
    config: &SyntheticConfig,
    base: i64,
    window_minutes: i64,
    pair: usize,
) -> (RawFlight, RawFlight) {
    let centre = random_waypoint(rng, config);
    let speed = rng.random_range(430..=510) as f64;
    let minutes_to_centre = rng.random_range(8..=20);
    let distance_nm = speed * minutes_to_centre as f64 / 60.0;
    let departure_time = base + rng.random_range(0..=window_minutes) * 60;

    let heading_a = rng.random_range(0.0..2.0 * PI);
    let heading_b = heading_a + rng.random_range(PI / 3.0..2.0 * PI / 3.0);
    let leg = |heading: f64| {
        [
            offset_by_bearing(centre, distance_nm, heading + PI),
            centre,
            offset_by_bearing(centre, distance_nm, heading),
        ]
    };

    let a = build_record(rng, pair * 2, &leg(heading_a), departure_time, speed);
    let mut b = build_record(rng, pair * 2 + 1, &leg(heading_b), departure_time, speed);
    b.altitude = a.altitude;
    (a, b)
}

fn random_waypoint(rng: &mut StdRng, config: &SyntheticConfig) -> Waypoint {
    Waypoint::new(
        rng.random_range(config.min_lat..config.max_lat),
        rng.random_range(config.min_lon..config.max_lon),
    )
}

fn build_record(
    rng: &mut StdRng,
    index: usize,
    waypoints: &[Waypoint],
    departure_time: i64,
    speed: f64,
) -> RawFlight {
    let is_cargo = rng.random_bool(CARGO_PROBABILITY);
    let (operator, plane_type, passengers) = if is_cargo {
        (pick(rng, CARGO_OPERATORS), pick(rng, CARGO_TYPES), 0)
    } else {
        (pick(rng, AIRLINES), pick(rng, PLANE_TYPES), rng.random_range(40..=350))
    };
    let departure_airport = pick(rng, AIRPORTS);
    let arrival_airport = pick(rng, AIRPORTS);

    RawFlight {
        acid: format!("{operator}{}", 100 + index),
        plane_type: plane_type.to_string(),
        route: format_route(waypoints),
        altitude: rng.random_range(28..=41) * 1000,
        departure_airport: departure_airport.to_string(),
        arrival_airport: arrival_airport.to_string(),
        departure_time,
        aircraft_speed: speed,
        passengers,
        is_cargo,
    }
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.random_range(0..options.len())]
}

/// Render waypoints as `DD.DDDDN/DDD.DDDDW` route tokens.
pub fn format_route(waypoints: &[Waypoint]) -> String {
    waypoints
        .iter()
        .map(|wp| {
            let lat_hemisphere = if wp.lat < 0.0 { 'S' } else { 'N' };
            let lon_hemisphere = if wp.lon < 0.0 { 'W' } else { 'E' };
            format!(
                "{:.4}{lat_hemisphere}/{:.4}{lon_hemisphere}",
                wp.lat.abs(),
                wp.lon.abs()
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::analysis::{analyze_flights, AnalysisOptions};
    use crate::routing::parse_route;

    #[test]
    fn same_seed_same_batch() {
        let config = SyntheticConfig::default();
        assert_eq!(
            generate_flights(&config).unwrap(),
            generate_flights(&config).unwrap()
        );

        let other = SyntheticConfig {
            seed: 7,
            ..SyntheticConfig::default()
        };
        assert_ne!(
            generate_flights(&config).unwrap(),
            generate_flights(&other).unwrap()
        );
    }

    #[test]
    fn batch_is_well_formed() {
        let config = SyntheticConfig {
            count: 50,
            ..SyntheticConfig::default()
        };
        let flights = generate_flights(&config).unwrap();
        assert_eq!(flights.len(), 50);

        let ids: HashSet<&str> = flights.iter().map(|f| f.acid.as_str()).collect();
        assert_eq!(ids.len(), 50);

        for flight in &flights {
            let route = parse_route(&flight.route).unwrap();
            assert!(route.len() >= 2);
            assert_eq!(flight.altitude % 1000, 0);
            assert!(flight.aircraft_speed >= 420.0);
            assert!(flight.departure_time >= 1_700_000_000 - 60);
            if flight.is_cargo {
                assert_eq!(flight.passengers, 0);
            }
        }
    }

    #[test]
    fn crossing_pairs_conflict() {
        let config = SyntheticConfig {
            count: 6,
            crossing_pairs: 3,
            ..SyntheticConfig::default()
        };
        let flights = generate_flights(&config).unwrap();

        for step in [15, 60] {
            let result = analyze_flights(&flights, &AnalysisOptions::with_step(step)).unwrap();
            for pair in flights.chunks(2) {
                let (a, b) = if pair[0].acid < pair[1].acid {
                    (&pair[0].acid, &pair[1].acid)
                } else {
                    (&pair[1].acid, &pair[0].acid)
                };
                assert!(
                    result
                        .conflicts
                        .iter()
                        .any(|c| &c.flight_a == a && &c.flight_b == b),
                    "no conflict for {a}/{b} at step {step}"
                );
            }
        }
    }

    #[test]
    fn crossing_pairs_are_capped_by_count() {
        let config = SyntheticConfig {
            count: 3,
            crossing_pairs: 10,
            ..SyntheticConfig::default()
        };
        assert_eq!(generate_flights(&config).unwrap().len(), 3);
    }

    #[test]
    fn rejects_inverted_region() {
        let config = SyntheticConfig {
            min_lat: 50.0,
            max_lat: 40.0,
            ..SyntheticConfig::default()
        };
        assert_eq!(generate_flights(&config), Err(SyntheticError::InvalidRegion));
    }

    #[test]
    fn formats_hemispheres() {
        let route = format_route(&[Waypoint::new(-33.5, 151.25), Waypoint::new(45.0, -75.5)]);
        assert_eq!(route, "33.5000S/151.2500E 45.0000N/75.5000W");
    }
}
