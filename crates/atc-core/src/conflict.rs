//! Conflict detection over sampled trajectories.
//!
//! Points are bucketed by tick, then every cross-flight pair inside a bucket
//! is checked against both separation minima. Samples for the same flight
//! pair are then aggregated into a single [`Conflict`].

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included};

use crate::bucketing::{band_reach, latitude_bands, time_buckets};
use crate::models::{Conflict, ConflictSample, TrajectoryPoint};
use crate::rules::SeparationRules;
use crate::spatial::{horizontal_separation_nm, vertical_separation_ft};

/// Pairwise loss-of-separation detector.
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    pub rules: SeparationRules,
}

impl ConflictDetector {
    pub fn new(rules: SeparationRules) -> Self {
        Self { rules }
    }

    /// Check two points from the same tick.
    ///
    /// Returns a canonical sample (`flight_a < flight_b`) when both minima are
    /// violated, `None` for same-flight pairs or compliant pairs.
    pub fn check_pair(&self, a: &TrajectoryPoint, b: &TrajectoryPoint) -> Option<ConflictSample> {
        if a.flight_id == b.flight_id {
            return None;
        }

        let (first, second) = if a.flight_id < b.flight_id { (a, b) } else { (b, a) };
        let horizontal_nm = horizontal_separation_nm(first.position(), second.position());
        let vertical_ft = vertical_separation_ft(first.alt_ft, second.alt_ft);
        if !self.rules.is_loss_of_separation(horizontal_nm, vertical_ft) {
            return None;
        }

        Some(ConflictSample {
            flight_a: first.flight_id.clone(),
            flight_b: second.flight_id.clone(),
            t_sec: first.t_sec,
            lat: (first.lat + second.lat) / 2.0,
            lon: (first.lon + second.lon) / 2.0,
            alt_ft_a: first.alt_ft,
            alt_ft_b: second.alt_ft,
            horizontal_nm,
            vertical_ft,
        })
    }

    /// Find every cross-flight pair in conflict at a shared tick.
    ///
    /// Ticks are visited in ascending order. Within a tick, latitude bands keep
    /// the scan to pairs that can still be within the horizontal minimum.
    pub fn detect_samples(&self, points: &[TrajectoryPoint]) -> Vec<ConflictSample> {
        let reach = band_reach(&self.rules);
        let mut samples = Vec::new();

        for bucket in time_buckets(points).values() {
            if bucket.len() < 2 {
                continue;
            }

            let bands = latitude_bands(bucket, self.rules.cell_size_deg);
            for (band, members) in &bands {
                for (i, a) in members.iter().enumerate() {
                    for b in &members[i + 1..] {
                        samples.extend(self.check_pair(a, b));
                    }
                }

                let above = (Excluded(*band), Included(band.saturating_add(reach)));
                for neighbours in bands.range(above).map(|(_, points)| points) {
                    for a in members {
                        for b in neighbours {
                            samples.extend(self.check_pair(a, b));
                        }
                    }
                }
            }
        }

        tracing::debug!(
            points = points.len(),
            samples = samples.len(),
            "conflict samples detected"
        );
        samples
    }
}

/// Aggregate samples into one conflict per flight pair.
///
/// Groups are emitted in pair order; ids are `A-B-<group index>` and only
/// unique within one run.
pub fn build_conflicts(samples: &[ConflictSample]) -> Vec<Conflict> {
    let mut groups: BTreeMap<(&str, &str), Vec<&ConflictSample>> = BTreeMap::new();
    for sample in samples {
        groups
            .entry((sample.flight_a.as_str(), sample.flight_b.as_str()))
            .or_default()
            .push(sample);
    }

    groups
        .into_iter()
        .enumerate()
        .filter_map(|(index, ((flight_a, flight_b), mut group))| {
            group.sort_by_key(|sample| sample.t_sec);
            let first = *group.first()?;
            let last = *group.last()?;

            let min_horizontal_nm = group
                .iter()
                .map(|s| s.horizontal_nm)
                .fold(f64::INFINITY, f64::min);
            let min_vertical_ft = group
                .iter()
                .map(|s| s.vertical_ft)
                .fold(f64::INFINITY, f64::min);

            let representative = group.iter().skip(1).fold(first, |best, &sample| {
                let closer = sample.horizontal_nm < best.horizontal_nm;
                let tie_but_lower = sample.horizontal_nm == best.horizontal_nm
                    && sample.vertical_ft < best.vertical_ft;
                if closer || tie_but_lower {
                    sample
                } else {
                    best
                }
            });

            Some(Conflict {
                id: format!("{flight_a}-{flight_b}-{index}"),
                flight_a: flight_a.to_string(),
                flight_b: flight_b.to_string(),
                t_start: first.t_sec,
                t_end: last.t_sec,
                min_horizontal_nm,
                min_vertical_ft,
                representative_lat: representative.lat,
                representative_lon: representative.lon,
                samples: group.into_iter().cloned().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Waypoint;
    use crate::rules::HORIZONTAL_THRESHOLD_NM;
    use crate::spatial::{haversine_nm, offset_by_bearing};

    fn point(flight_id: &str, t_sec: i64, lat: f64, lon: f64, alt_ft: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            flight_id: flight_id.into(),
            t_sec,
            lat,
            lon,
            alt_ft,
            segment_index: 0,
        }
    }

    fn sample(t_sec: i64, horizontal_nm: f64, vertical_ft: f64, lat: f64) -> ConflictSample {
        ConflictSample {
            flight_a: "AAA".into(),
            flight_b: "BBB".into(),
            t_sec,
            lat,
            lon: -75.0,
            alt_ft_a: 33000.0,
            alt_ft_b: 33000.0 + vertical_ft,
            horizontal_nm,
            vertical_ft,
        }
    }

    #[test]
    fn close_pair_conflicts() {
        let detector = ConflictDetector::default();
        let a = point("ZED", 60, 45.0, -75.0, 33000.0);
        let b = point("ACE", 60, 45.02, -75.0, 34000.0);

        let sample = detector.check_pair(&a, &b).expect("conflict");
        assert_eq!(sample.flight_a, "ACE");
        assert_eq!(sample.flight_b, "ZED");
        assert_eq!(sample.alt_ft_a, 34000.0);
        assert_eq!(sample.alt_ft_b, 33000.0);
        assert_eq!(sample.vertical_ft, 1000.0);
        assert!((sample.lat - 45.01).abs() < 1e-12);
        assert!(sample.horizontal_nm < 1.3);
    }

    #[test]
    fn swapping_points_gives_identical_sample() {
        let detector = ConflictDetector::default();
        let a = point("B2", 0, 10.0, 20.0, 30000.0);
        let b = point("A1", 0, 10.03, 20.01, 31500.0);
        assert_eq!(detector.check_pair(&a, &b), detector.check_pair(&b, &a));
    }

    #[test]
    fn both_minima_must_be_violated() {
        let detector = ConflictDetector::default();
        let a = point("A", 0, 45.0, -75.0, 30000.0);

        // Horizontal close, vertical open
        let high = point("B", 0, 45.0, -75.0, 32001.0);
        assert!(detector.check_pair(&a, &high).is_none());

        // Vertical close, horizontal open (~6 nm)
        let far = point("B", 0, 45.1, -75.0, 30000.0);
        assert!(detector.check_pair(&a, &far).is_none());

        // Exactly on the vertical minimum still counts
        let edge = point("B", 0, 45.0, -75.0, 32000.0);
        assert!(detector.check_pair(&a, &edge).is_some());
    }

    #[test]
    fn exactly_on_horizontal_minimum_counts() {
        let origin = Waypoint::new(45.0, -75.0);
        let rim = offset_by_bearing(origin, HORIZONTAL_THRESHOLD_NM, 0.0);
        let rim_nm = haversine_nm(origin, rim);
        assert!((rim_nm - HORIZONTAL_THRESHOLD_NM).abs() < 1e-9);

        // Pin the minimum to the computed distance so the boundary is exact
        let detector = ConflictDetector::new(SeparationRules {
            horizontal_threshold_nm: rim_nm,
            ..SeparationRules::default()
        });
        let a = point("A", 0, origin.lat, origin.lon, 33000.0);
        let b = point("B", 0, rim.lat, rim.lon, 33000.0);

        let sample = detector.check_pair(&a, &b).expect("conflict on the rim");
        assert_eq!(sample.horizontal_nm, rim_nm);
        assert_eq!(sample.vertical_ft, 0.0);
        assert_eq!(detector.detect_samples(&[a.clone(), b.clone()]).len(), 1);

        let stricter = ConflictDetector::new(SeparationRules {
            horizontal_threshold_nm: rim_nm - 1e-6,
            ..SeparationRules::default()
        });
        assert!(stricter.check_pair(&a, &b).is_none());
    }

    #[test]
    fn huge_minimum_scans_existing_bands_only() {
        let detector = ConflictDetector::new(SeparationRules {
            horizontal_threshold_nm: 1e300,
            ..SeparationRules::default()
        });
        let points = vec![
            point("A", 0, -60.0, -75.0, 33000.0),
            point("B", 0, 10.0, 20.0, 33000.0),
            point("C", 0, 70.0, 120.0, 33000.0),
        ];
        assert_eq!(detector.detect_samples(&points).len(), 3);
    }

    #[test]
    fn same_flight_never_conflicts() {
        let detector = ConflictDetector::default();
        let a = point("A", 0, 45.0, -75.0, 30000.0);
        let b = point("A", 0, 45.0, -75.0, 30000.0);
        assert!(detector.check_pair(&a, &b).is_none());
        assert!(detector.detect_samples(&[a, b]).is_empty());
    }

    #[test]
    fn only_shared_ticks_are_compared() {
        let detector = ConflictDetector::default();
        let points = vec![
            point("A", 0, 45.0, -75.0, 30000.0),
            point("B", 60, 45.0, -75.0, 30000.0),
        ];
        assert!(detector.detect_samples(&points).is_empty());
        assert!(detector.detect_samples(&[]).is_empty());
    }

    #[test]
    fn pairs_across_band_boundary_are_found() {
        let detector = ConflictDetector::default();
        // 44.99 and 45.01 sit in different one-degree bands, ~1.2 nm apart
        let points = vec![
            point("A", 0, 44.99, -75.0, 30000.0),
            point("B", 0, 45.01, -75.0, 30000.0),
            point("C", 0, 47.00, -75.0, 30000.0),
        ];
        let samples = detector.detect_samples(&points);
        assert_eq!(samples.len(), 1);
        assert_eq!((samples[0].flight_a.as_str(), samples[0].flight_b.as_str()), ("A", "B"));
    }

    #[test]
    fn banded_scan_matches_brute_force() {
        let detector = ConflictDetector::default();
        let mut points = Vec::new();
        for i in 0..12 {
            let lat = 44.9 + (i as f64) * 0.021;
            let lon = -75.0 + ((i * 7) % 5) as f64 * 0.03;
            let alt = 30000.0 + ((i * 3) % 4) as f64 * 900.0;
            points.push(point(&format!("F{i:02}"), 300, lat, lon, alt));
        }

        let mut banded = detector.detect_samples(&points);
        let mut brute = Vec::new();
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                brute.extend(detector.check_pair(&points[i], &points[j]));
            }
        }

        let key = |s: &ConflictSample| (s.flight_a.clone(), s.flight_b.clone());
        banded.sort_by_key(key);
        brute.sort_by_key(key);
        assert!(!brute.is_empty());
        assert_eq!(banded, brute);
    }

    #[test]
    fn aggregation_spans_all_samples() {
        let samples = vec![
            sample(180, 3.0, 500.0, 45.3),
            sample(60, 4.0, 200.0, 45.1),
            sample(120, 2.5, 900.0, 45.2),
        ];
        let conflicts = build_conflicts(&samples);
        assert_eq!(conflicts.len(), 1);

        let conflict = &conflicts[0];
        assert_eq!(conflict.id, "AAA-BBB-0");
        assert_eq!(conflict.t_start, 60);
        assert_eq!(conflict.t_end, 180);
        assert_eq!(conflict.min_horizontal_nm, 2.5);
        assert_eq!(conflict.min_vertical_ft, 200.0);
        // Worst horizontal sample wins even though it is not worst vertically
        assert_eq!(conflict.representative_lat, 45.2);
        let times: Vec<i64> = conflict.samples.iter().map(|s| s.t_sec).collect();
        assert_eq!(times, vec![60, 120, 180]);
    }

    #[test]
    fn representative_ties_break_on_vertical_then_first_seen() {
        let conflicts = build_conflicts(&[
            sample(0, 2.0, 800.0, 1.0),
            sample(60, 2.0, 400.0, 2.0),
            sample(120, 2.0, 400.0, 3.0),
        ]);
        assert_eq!(conflicts[0].representative_lat, 2.0);
    }

    #[test]
    fn one_conflict_per_pair_without_gap_splitting() {
        let mut other = sample(600, 1.0, 0.0, 50.0);
        other.flight_a = "AAA".into();
        other.flight_b = "CCC".into();

        let conflicts = build_conflicts(&[
            sample(0, 4.0, 0.0, 1.0),
            other,
            sample(3_600, 4.5, 0.0, 1.0),
        ]);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].id, "AAA-BBB-0");
        assert_eq!((conflicts[0].t_start, conflicts[0].t_end), (0, 3_600));
        assert_eq!(conflicts[1].id, "AAA-CCC-1");
    }

    #[test]
    fn no_samples_no_conflicts() {
        assert!(build_conflicts(&[]).is_empty());
    }
}
