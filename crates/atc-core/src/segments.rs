//! Segment building: turns routes into timed great-circle legs.

use crate::models::{Flight, RawFlight, Segment, Waypoint};
use crate::routing::{parse_route, RouteParseError};
use crate::spatial::haversine_nm;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Lay out back-to-back segments starting at `departure_time`.
///
/// Fewer than two waypoints or a non-positive speed yields no segments.
pub fn build_segments_for_waypoints(
    flight_id: &str,
    departure_time: f64,
    cruise_altitude_ft: f64,
    cruise_speed_kt: f64,
    waypoints: &[Waypoint],
) -> Vec<Segment> {
    if waypoints.len() < 2 || cruise_speed_kt <= 0.0 || !cruise_speed_kt.is_finite() {
        return Vec::new();
    }

    let mut cursor = departure_time;
    waypoints
        .windows(2)
        .enumerate()
        .map(|(index, pair)| {
            let (from, to) = (pair[0], pair[1]);
            let distance_nm = haversine_nm(from, to);
            let t_start = cursor;
            let t_end = t_start + distance_nm / cruise_speed_kt * SECONDS_PER_HOUR;
            cursor = t_end;

            Segment {
                flight_id: flight_id.to_string(),
                index,
                from,
                to,
                t_start,
                t_end,
                altitude_ft: cruise_altitude_ft,
                distance_nm,
            }
        })
        .collect()
}

/// Build a flight from an uploaded record.
///
/// Fails only when the route string cannot be parsed.
pub fn build_flight_from_raw(raw: &RawFlight) -> Result<Flight, RouteParseError> {
    let waypoints = parse_route(&raw.route)?;
    let cruise_altitude_ft = raw.altitude as f64;
    let segments = build_segments_for_waypoints(
        &raw.acid,
        raw.departure_time as f64,
        cruise_altitude_ft,
        raw.aircraft_speed,
        &waypoints,
    );

    Ok(Flight {
        id: raw.acid.clone(),
        callsign: raw.acid.clone(),
        plane_type: raw.plane_type.clone(),
        departure_airport: raw.departure_airport.clone(),
        arrival_airport: raw.arrival_airport.clone(),
        departure_time: raw.departure_time,
        cruise_speed_kt: raw.aircraft_speed,
        cruise_altitude_ft,
        passengers: raw.passengers,
        is_cargo: raw.is_cargo,
        segments,
    })
}

/// Rebuild a flight over its existing route with adjusted timing/performance.
pub fn rebuild_flight(
    flight: &Flight,
    delta_time_sec: i64,
    delta_altitude_ft: f64,
    delta_speed_kt: f64,
) -> Flight {
    let waypoints = flight.waypoints();
    let departure_time = flight.departure_time + delta_time_sec;
    let cruise_altitude_ft = flight.cruise_altitude_ft + delta_altitude_ft;
    let cruise_speed_kt = flight.cruise_speed_kt + delta_speed_kt;

    Flight {
        departure_time,
        cruise_altitude_ft,
        cruise_speed_kt,
        segments: build_segments_for_waypoints(
            &flight.id,
            departure_time as f64,
            cruise_altitude_ft,
            cruise_speed_kt,
            &waypoints,
        ),
        ..flight.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(route: &str, speed: f64) -> RawFlight {
        RawFlight {
            acid: "ACA101".into(),
            plane_type: "A320".into(),
            route: route.into(),
            altitude: 35000,
            departure_airport: "CYUL".into(),
            arrival_airport: "CYOW".into(),
            departure_time: 0,
            aircraft_speed: speed,
            passengers: 150,
            is_cargo: false,
        }
    }

    #[test]
    fn single_leg_timing() {
        let flight = build_flight_from_raw(&raw("45.0N/75.0W 46.0N/74.0W", 480.0)).unwrap();
        assert_eq!(flight.segments.len(), 1);

        let seg = &flight.segments[0];
        assert_eq!(seg.index, 0);
        assert_eq!(seg.t_start, 0.0);
        assert!((seg.distance_nm - 73.3186).abs() < 0.01);
        assert!((seg.t_end - seg.distance_nm / 480.0 * 3600.0).abs() < 1e-9);
        assert!((seg.t_end - 549.89).abs() < 0.1);
        assert_eq!(seg.altitude_ft, 35000.0);
    }

    #[test]
    fn segments_are_contiguous() {
        let waypoints = [
            Waypoint::new(45.0, -75.0),
            Waypoint::new(46.0, -74.0),
            Waypoint::new(47.0, -72.0),
            Waypoint::new(47.5, -70.0),
        ];
        let segments = build_segments_for_waypoints("X", 1_000.0, 30000.0, 450.0, &waypoints);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].t_start, 1_000.0);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].t_end, pair[1].t_start);
            assert_eq!(pair[0].index + 1, pair[1].index);
            assert_eq!(pair[0].to, pair[1].from);
        }
    }

    #[test]
    fn degenerate_inputs_yield_no_segments() {
        let one = [Waypoint::new(45.0, -75.0)];
        assert!(build_segments_for_waypoints("X", 0.0, 30000.0, 450.0, &one).is_empty());

        let two = [Waypoint::new(45.0, -75.0), Waypoint::new(46.0, -74.0)];
        assert!(build_segments_for_waypoints("X", 0.0, 30000.0, 0.0, &two).is_empty());
        assert!(build_segments_for_waypoints("X", 0.0, 30000.0, -10.0, &two).is_empty());
    }

    #[test]
    fn zero_speed_flight_still_exists() {
        let flight = build_flight_from_raw(&raw("45.0N/75.0W 46.0N/74.0W", 0.0)).unwrap();
        assert_eq!(flight.id, "ACA101");
        assert!(flight.segments.is_empty());
        assert!(flight.waypoints().is_empty());
    }

    #[test]
    fn bad_route_is_reported() {
        assert!(build_flight_from_raw(&raw("45.0X/75.0W 46.0N/74.0W", 480.0)).is_err());
    }

    #[test]
    fn rebuild_shifts_and_reprofiles() {
        let flight = build_flight_from_raw(&raw("45.0N/75.0W 46.0N/74.0W 47N/73W", 480.0)).unwrap();
        let delayed = rebuild_flight(&flight, 120, 0.0, 0.0);
        assert_eq!(delayed.departure_time, 120);
        assert_eq!(delayed.waypoints(), flight.waypoints());
        assert!((delayed.segments[0].t_start - 120.0).abs() < 1e-9);

        let slowed = rebuild_flight(&flight, 0, 400.0, -40.0);
        assert_eq!(slowed.cruise_altitude_ft, 35400.0);
        assert!(slowed.arrival_time().unwrap() > flight.arrival_time().unwrap());
    }
}
