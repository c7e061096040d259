//! Display projections for the trajectory map.
//!
//! Coordinates are `[lon, lat]` pairs, the order map layers expect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Conflict, ConflictSample, Flight};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPath {
    pub id: String,
    pub callsign: String,
    pub passengers: u32,
    pub is_cargo: bool,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictMarker {
    pub id: String,
    pub flights: [String; 2],
    pub coordinate: [f64; 2],
    pub t_sec: i64,
    pub minute: i64,
    pub horizontal_nm: f64,
    pub vertical_ft: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    pub minute: i64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for MapViewState {
    /// Continental overview used when there is nothing to frame.
    fn default() -> Self {
        Self {
            longitude: -95.0,
            latitude: 55.0,
            zoom: 3.5,
            pitch: 0.0,
            bearing: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub paths: Vec<MapPath>,
    pub conflict_markers: Vec<ConflictMarker>,
    pub timeline: Vec<TimelineBucket>,
    pub timeline_max: usize,
    pub view_state: MapViewState,
    pub temporal_extent: Option<TemporalExtent>,
}

pub fn build_map_data(
    flights: &[Flight],
    conflicts: &[Conflict],
    conflict_samples: &[ConflictSample],
) -> MapData {
    let paths = build_paths(flights);
    let conflict_markers = build_conflict_markers(conflicts, conflict_samples);
    let timeline = build_timeline(&conflict_markers);
    let timeline_max = timeline.iter().map(|bucket| bucket.count).max().unwrap_or(0);
    let temporal_extent = temporal_extent(&conflict_markers);
    let view_state = view_state(&paths, &conflict_markers);

    MapData {
        paths,
        conflict_markers,
        timeline,
        timeline_max,
        view_state,
        temporal_extent,
    }
}

fn build_paths(flights: &[Flight]) -> Vec<MapPath> {
    flights
        .iter()
        .map(|flight| MapPath {
            id: flight.id.clone(),
            callsign: flight.callsign.clone(),
            passengers: flight.passengers,
            is_cargo: flight.is_cargo,
            coordinates: flight
                .waypoints()
                .into_iter()
                .map(|wp| [wp.lon, wp.lat])
                .collect(),
        })
        .collect()
}

/// One marker per sample, or one per conflict when no samples are supplied.
fn build_conflict_markers(
    conflicts: &[Conflict],
    conflict_samples: &[ConflictSample],
) -> Vec<ConflictMarker> {
    if !conflict_samples.is_empty() {
        return conflict_samples
            .iter()
            .enumerate()
            .map(|(index, sample)| ConflictMarker {
                id: format!(
                    "{}-{}-{}-{}",
                    sample.flight_a, sample.flight_b, sample.t_sec, index
                ),
                flights: [sample.flight_a.clone(), sample.flight_b.clone()],
                coordinate: [sample.lon, sample.lat],
                t_sec: sample.t_sec,
                minute: sample.t_sec.div_euclid(60),
                horizontal_nm: sample.horizontal_nm,
                vertical_ft: sample.vertical_ft,
            })
            .collect();
    }

    conflicts
        .iter()
        .enumerate()
        .map(|(index, conflict)| ConflictMarker {
            id: if conflict.id.is_empty() {
                format!("conflict-{index}")
            } else {
                conflict.id.clone()
            },
            flights: [conflict.flight_a.clone(), conflict.flight_b.clone()],
            coordinate: [conflict.representative_lon, conflict.representative_lat],
            t_sec: conflict.t_start,
            minute: conflict.t_start.div_euclid(60),
            horizontal_nm: conflict.min_horizontal_nm,
            vertical_ft: conflict.min_vertical_ft,
        })
        .collect()
}

fn build_timeline(markers: &[ConflictMarker]) -> Vec<TimelineBucket> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for marker in markers {
        *counts.entry(marker.minute).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(minute, count)| TimelineBucket { minute, count })
        .collect()
}

fn temporal_extent(markers: &[ConflictMarker]) -> Option<TemporalExtent> {
    let min = markers.iter().map(|m| m.t_sec).min()?;
    let max = markers.iter().map(|m| m.t_sec).max()?;
    Some(TemporalExtent { min, max })
}

/// Frame every path vertex and marker.
fn view_state(paths: &[MapPath], markers: &[ConflictMarker]) -> MapViewState {
    let coordinates: Vec<[f64; 2]> = paths
        .iter()
        .flat_map(|path| path.coordinates.iter().copied())
        .chain(markers.iter().map(|marker| marker.coordinate))
        .collect();
    if coordinates.is_empty() {
        return MapViewState::default();
    }

    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for [lon, lat] in coordinates {
        min_lon = min_lon.min(lon);
        max_lon = max_lon.max(lon);
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
    }

    let span = (max_lon - min_lon).max(0.1).max((max_lat - min_lat).max(0.1));
    let zoom = if span > 40.0 {
        2.5
    } else if span > 20.0 {
        3.2
    } else if span > 10.0 {
        4.2
    } else if span > 5.0 {
        5.0
    } else {
        6.5
    };

    MapViewState {
        longitude: (min_lon + max_lon) / 2.0,
        latitude: (min_lat + max_lat) / 2.0,
        zoom,
        pitch: 0.0,
        bearing: 0.0,
    }
}
