//! Time and latitude bucketing for pairwise proximity search.

use crate::models::TrajectoryPoint;
use crate::rules::SeparationRules;
use crate::spatial::nm_per_degree;
use std::collections::BTreeMap;

/// Grid cell index of a coordinate for a given cell size.
pub fn cell_index(value_deg: f64, cell_size_deg: f64) -> i64 {
    (value_deg / cell_size_deg).floor() as i64
}

/// Group points by exact tick, ascending.
pub fn time_buckets(points: &[TrajectoryPoint]) -> BTreeMap<i64, Vec<&TrajectoryPoint>> {
    let mut buckets: BTreeMap<i64, Vec<&TrajectoryPoint>> = BTreeMap::new();
    for point in points {
        buckets.entry(point.t_sec).or_default().push(point);
    }
    buckets
}

/// Group one tick's points into latitude bands of `cell_size_deg`.
pub fn latitude_bands<'a>(
    points: &[&'a TrajectoryPoint],
    cell_size_deg: f64,
) -> BTreeMap<i64, Vec<&'a TrajectoryPoint>> {
    let mut bands: BTreeMap<i64, Vec<&'a TrajectoryPoint>> = BTreeMap::new();
    for &point in points {
        bands
            .entry(cell_index(point.lat, cell_size_deg))
            .or_default()
            .push(point);
    }
    bands
}

/// Widest neighbour scan an analysis run will accept.
pub const MAX_BAND_REACH: i64 = 1_000_000;

/// How many neighbouring latitude bands can still hold a conflicting point.
///
/// Great-circle distance is never shorter than the meridional arc between
/// two latitudes, so bands further apart than the horizontal minimum are
/// skipped without changing the result.
pub fn band_reach(rules: &SeparationRules) -> i64 {
    let threshold_deg = rules.horizontal_threshold_nm / nm_per_degree();
    ((threshold_deg / rules.cell_size_deg).ceil() as i64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(flight_id: &str, t_sec: i64, lat: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            flight_id: flight_id.into(),
            t_sec,
            lat,
            lon: -80.0,
            alt_ft: 33000.0,
            segment_index: 0,
        }
    }

    #[test]
    fn cell_index_floors_negative_values() {
        assert_eq!(cell_index(45.7, 1.0), 45);
        assert_eq!(cell_index(-0.2, 1.0), -1);
        assert_eq!(cell_index(-75.0, 1.0), -75);
    }

    #[test]
    fn time_buckets_are_ordered() {
        let points = vec![point("A", 120, 1.0), point("B", 60, 1.0), point("C", 120, 2.0)];
        let buckets = time_buckets(&points);
        let keys: Vec<i64> = buckets.keys().copied().collect();
        assert_eq!(keys, vec![60, 120]);
        assert_eq!(buckets[&120].len(), 2);
    }

    #[test]
    fn latitude_bands_split_points() {
        let points = vec![point("A", 0, 45.1), point("B", 0, 45.9), point("C", 0, 46.2)];
        let refs: Vec<&TrajectoryPoint> = points.iter().collect();
        let bands = latitude_bands(&refs, 1.0);
        assert_eq!(bands[&45].len(), 2);
        assert_eq!(bands[&46].len(), 1);
    }

    #[test]
    fn default_rules_only_need_adjacent_band() {
        assert_eq!(band_reach(&SeparationRules::default()), 1);

        let tight_cells = SeparationRules {
            cell_size_deg: 0.05,
            ..SeparationRules::default()
        };
        assert_eq!(band_reach(&tight_cells), 2);
    }

    #[test]
    fn huge_minimum_saturates_reach() {
        let rules = SeparationRules {
            horizontal_threshold_nm: 1e300,
            ..SeparationRules::default()
        };
        assert_eq!(band_reach(&rules), i64::MAX);
    }
}
