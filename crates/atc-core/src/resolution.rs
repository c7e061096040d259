//! Resolution scoring and what-if evaluation.
//!
//! Each conflict gets up to three single-variable candidates (delay,
//! altitude, speed). Candidates are scored independently per conflict and
//! ranked globally by cost; no joint optimization across conflicts is done.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{detect_traffic_conflicts, AnalysisError, AnalysisOptions};
use crate::models::{CandidateStatus, Conflict, Flight, ResolutionCandidate, ResolutionKind};
use crate::rules::SeparationRules;
use crate::segments::rebuild_flight;

/// Horizontal spacing gained per minute of delay (nm).
const DELAY_GAIN_NM_PER_MIN: f64 = 3.0;
/// Horizontal spacing gained per knot of speed reduction (nm).
const SPEED_GAIN_NM_PER_KT: f64 = 0.4;
const MIN_SPEED_REDUCTION_KT: f64 = 5.0;
const MAX_SPEED_REDUCTION_KT: f64 = 40.0;
const ALTITUDE_STEP_FT: f64 = 200.0;

const DELAY_COST_OFFSET: f64 = 1.0;
const ALTITUDE_COST_OFFSET: f64 = 1.25;
const SPEED_COST_OFFSET: f64 = 1.5;

/// How far a conflict sits below the separation minima.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationDeficit {
    pub horizontal_nm: f64,
    pub vertical_ft: f64,
}

impl SeparationDeficit {
    pub fn of(conflict: &Conflict, rules: &SeparationRules) -> Self {
        Self {
            horizontal_nm: (rules.horizontal_threshold_nm - conflict.min_horizontal_nm).max(0.0),
            vertical_ft: (rules.vertical_threshold_ft - conflict.min_vertical_ft).max(0.0),
        }
    }

    /// Normalized severity in `[0, 1]`: the deeper of the two violations.
    pub fn severity(&self, rules: &SeparationRules) -> f64 {
        let horizontal = normalized(self.horizontal_nm, rules.horizontal_threshold_nm);
        let vertical = normalized(self.vertical_ft, rules.vertical_threshold_ft);
        horizontal.max(vertical).clamp(0.0, 1.0)
    }
}

fn normalized(deficit: f64, threshold: f64) -> f64 {
    if threshold > 0.0 {
        deficit / threshold
    } else {
        0.0
    }
}

/// Base cost for a given severity: 1 for a grazing conflict, 10 for a collision.
pub fn base_cost(severity: f64) -> f64 {
    1.0 + severity * 9.0
}

fn round_cost(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Candidates for a single conflict, in delay/altitude/speed order.
pub fn candidates_for_conflict(
    conflict: &Conflict,
    rules: &SeparationRules,
) -> Vec<ResolutionCandidate> {
    let deficit = SeparationDeficit::of(conflict, rules);
    let base = base_cost(deficit.severity(rules));
    let mut candidates = Vec::with_capacity(3);

    if deficit.horizontal_nm > 0.0 {
        let minutes = (deficit.horizontal_nm / DELAY_GAIN_NM_PER_MIN).ceil().max(1.0);
        let gain_nm = deficit.horizontal_nm.min(minutes * DELAY_GAIN_NM_PER_MIN);
        candidates.push(candidate(
            conflict,
            rules,
            ResolutionKind::Delay,
            &conflict.flight_a,
            Adjustment {
                delta_time_sec: minutes as i64 * 60,
                horizontal_gain_nm: gain_nm,
                ..Adjustment::default()
            },
            base + DELAY_COST_OFFSET,
            format!(
                "Delay {} by {} min to widen longitudinal spacing by {:.2} nm.",
                conflict.flight_a, minutes, gain_nm
            ),
        ));
    }

    if deficit.vertical_ft > 0.0 {
        let delta_ft = ((deficit.vertical_ft / ALTITUDE_STEP_FT).ceil() * ALTITUDE_STEP_FT)
            .max(ALTITUDE_STEP_FT);
        candidates.push(candidate(
            conflict,
            rules,
            ResolutionKind::Altitude,
            &conflict.flight_b,
            Adjustment {
                delta_altitude_ft: delta_ft,
                vertical_gain_ft: delta_ft,
                ..Adjustment::default()
            },
            base + ALTITUDE_COST_OFFSET,
            format!(
                "Climb {} by {:.0} ft to restore vertical separation.",
                conflict.flight_b, delta_ft
            ),
        ));
    }

    if deficit.horizontal_nm > 0.0 {
        let reduction_kt = (deficit.horizontal_nm / SPEED_GAIN_NM_PER_KT)
            .ceil()
            .max(MIN_SPEED_REDUCTION_KT)
            .min(MAX_SPEED_REDUCTION_KT);
        let gain_nm = deficit.horizontal_nm.min(reduction_kt * SPEED_GAIN_NM_PER_KT);
        candidates.push(candidate(
            conflict,
            rules,
            ResolutionKind::Speed,
            &conflict.flight_a,
            Adjustment {
                delta_speed_kt: -reduction_kt,
                horizontal_gain_nm: gain_nm,
                ..Adjustment::default()
            },
            base + SPEED_COST_OFFSET,
            format!(
                "Reduce {} speed by {:.0} kt through the hotspot to extend spacing.",
                conflict.flight_a, reduction_kt
            ),
        ));
    }

    candidates
}

#[derive(Debug, Clone, Copy, Default)]
struct Adjustment {
    delta_time_sec: i64,
    delta_altitude_ft: f64,
    delta_speed_kt: f64,
    horizontal_gain_nm: f64,
    vertical_gain_ft: f64,
}

fn candidate(
    conflict: &Conflict,
    rules: &SeparationRules,
    kind: ResolutionKind,
    flight_id: &str,
    adjustment: Adjustment,
    cost: f64,
    notes: String,
) -> ResolutionCandidate {
    // Clearing either dimension is enough to restore separation.
    let resolves_conflict = conflict.min_horizontal_nm + adjustment.horizontal_gain_nm
        >= rules.horizontal_threshold_nm
        || conflict.min_vertical_ft + adjustment.vertical_gain_ft >= rules.vertical_threshold_ft;

    ResolutionCandidate {
        id: format!("{}-{}-{}", conflict.id, kind.as_str(), flight_id),
        conflict_id: conflict.id.clone(),
        flight_a: conflict.flight_a.clone(),
        flight_b: conflict.flight_b.clone(),
        flight_id: flight_id.to_string(),
        kind,
        delta_time_sec: adjustment.delta_time_sec,
        delta_altitude_ft: adjustment.delta_altitude_ft,
        delta_speed_kt: adjustment.delta_speed_kt,
        estimated_horizontal_gain_nm: adjustment.horizontal_gain_nm,
        estimated_vertical_gain_ft: adjustment.vertical_gain_ft,
        cost: round_cost(cost),
        resolves_conflict,
        status: if resolves_conflict {
            CandidateStatus::Valid
        } else {
            CandidateStatus::Pending
        },
        notes: Some(notes),
    }
}

/// Score every conflict and rank all candidates together by ascending cost.
///
/// The sort is stable, so equal costs keep conflict order.
pub fn score_resolutions(
    conflicts: &[Conflict],
    rules: &SeparationRules,
) -> Vec<ResolutionCandidate> {
    let mut candidates: Vec<ResolutionCandidate> = conflicts
        .iter()
        .flat_map(|conflict| candidates_for_conflict(conflict, rules))
        .collect();
    candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));

    tracing::debug!(
        conflicts = conflicts.len(),
        candidates = candidates.len(),
        "resolution candidates scored"
    );
    candidates
}

/// Dashboard roll-up of a candidate set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub conflicts: usize,
    /// Conflicts with at least one resolving candidate
    pub conflicts_resolvable: usize,
    /// Distinct flights touched by a non-zero adjustment
    pub flights_adjusted: usize,
    /// Cheapest candidate per conflict, in conflict id order
    pub best_candidates: Vec<ResolutionCandidate>,
}

pub fn summarize_resolutions(
    conflicts: &[Conflict],
    candidates: &[ResolutionCandidate],
) -> ResolutionSummary {
    let resolvable: BTreeSet<&str> = candidates
        .iter()
        .filter(|c| c.resolves_conflict)
        .map(|c| c.conflict_id.as_str())
        .collect();
    let adjusted: BTreeSet<&str> = candidates
        .iter()
        .filter(|c| c.is_adjustment())
        .map(|c| c.flight_id.as_str())
        .collect();

    let mut best: BTreeMap<&str, &ResolutionCandidate> = BTreeMap::new();
    for candidate in candidates {
        best.entry(candidate.conflict_id.as_str())
            .and_modify(|current| {
                if candidate.cost < current.cost {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    ResolutionSummary {
        conflicts: conflicts.len(),
        conflicts_resolvable: resolvable.len(),
        flights_adjusted: adjusted.len(),
        best_candidates: best.into_values().cloned().collect(),
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("flight {0} is not part of the traffic set")]
    FlightNotFound(String),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Traffic picture after applying one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub flight_id: String,
    pub applied_candidate: ResolutionCandidate,
    /// Conflicts whose flight pair was already in conflict before
    pub remaining_conflicts: Vec<Conflict>,
    /// Conflicts between pairs that were clear before
    pub new_conflicts: Vec<Conflict>,
    /// Whether the candidate's own pair is now clear
    pub target_cleared: bool,
}

/// Apply a candidate to its flight and re-run detection on the whole set.
pub fn apply_resolution(
    flights: &[Flight],
    candidate: &ResolutionCandidate,
    options: &AnalysisOptions,
) -> Result<ResolutionOutcome, ResolutionError> {
    options.validate()?;
    if !flights.iter().any(|flight| flight.id == candidate.flight_id) {
        return Err(ResolutionError::FlightNotFound(candidate.flight_id.clone()));
    }

    let before = detect_traffic_conflicts(flights, options);
    let baseline: BTreeSet<(String, String)> =
        before.conflicts.iter().map(Conflict::pair_key).collect();

    let adjusted: Vec<Flight> = flights
        .iter()
        .map(|flight| {
            if flight.id == candidate.flight_id {
                rebuild_flight(
                    flight,
                    candidate.delta_time_sec,
                    candidate.delta_altitude_ft,
                    candidate.delta_speed_kt,
                )
            } else {
                flight.clone()
            }
        })
        .collect();

    let after = detect_traffic_conflicts(&adjusted, options);
    let target_cleared = !after
        .conflicts
        .iter()
        .any(|c| c.flight_a == candidate.flight_a && c.flight_b == candidate.flight_b);
    let (remaining_conflicts, new_conflicts): (Vec<Conflict>, Vec<Conflict>) = after
        .conflicts
        .into_iter()
        .partition(|conflict| baseline.contains(&conflict.pair_key()));

    tracing::debug!(
        candidate = %candidate.id,
        remaining = remaining_conflicts.len(),
        new = new_conflicts.len(),
        target_cleared,
        "resolution applied"
    );

    Ok(ResolutionOutcome {
        flight_id: candidate.flight_id.clone(),
        applied_candidate: candidate.clone(),
        remaining_conflicts,
        new_conflicts,
        target_cleared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(id: &str, min_horizontal_nm: f64, min_vertical_ft: f64) -> Conflict {
        Conflict {
            id: id.into(),
            flight_a: "AAA".into(),
            flight_b: "BBB".into(),
            t_start: 0,
            t_end: 60,
            min_horizontal_nm,
            min_vertical_ft,
            representative_lat: 45.0,
            representative_lon: -75.0,
            samples: Vec::new(),
        }
    }

    fn of_kind(candidates: &[ResolutionCandidate], kind: ResolutionKind) -> Option<&ResolutionCandidate> {
        candidates.iter().find(|c| c.kind == kind)
    }

    #[test]
    fn four_nm_conflict_with_compliant_vertical() {
        let rules = SeparationRules::default();
        let candidates = candidates_for_conflict(&conflict("c", 4.0, 2000.0), &rules);
        assert_eq!(candidates.len(), 2);

        let delay = of_kind(&candidates, ResolutionKind::Delay).unwrap();
        assert_eq!(delay.flight_id, "AAA");
        assert_eq!(delay.delta_time_sec, 60);
        assert_eq!(delay.estimated_horizontal_gain_nm, 1.0);
        assert!(delay.resolves_conflict);
        assert_eq!(delay.status, CandidateStatus::Valid);
        // severity 0.2 -> base 2.8
        assert_eq!(delay.cost, 3.8);

        let speed = of_kind(&candidates, ResolutionKind::Speed).unwrap();
        assert_eq!(speed.delta_speed_kt, -5.0);
        assert_eq!(speed.cost, 4.3);
        assert!(of_kind(&candidates, ResolutionKind::Altitude).is_none());
    }

    #[test]
    fn altitude_delta_rounds_up_to_step() {
        let rules = SeparationRules::default();
        let candidates = candidates_for_conflict(&conflict("c", 5.0, 1750.0), &rules);
        assert_eq!(candidates.len(), 1);

        let altitude = &candidates[0];
        assert_eq!(altitude.kind, ResolutionKind::Altitude);
        assert_eq!(altitude.flight_id, "BBB");
        assert_eq!(altitude.delta_altitude_ft, 400.0);
        assert_eq!(altitude.estimated_vertical_gain_ft, 400.0);
        assert_eq!(altitude.delta_time_sec, 0);
        assert_eq!(altitude.delta_speed_kt, 0.0);
        assert!(altitude.resolves_conflict);
    }

    #[test]
    fn deep_conflict_caps_speed_and_uses_whole_minutes() {
        let rules = SeparationRules::default();
        let candidates = candidates_for_conflict(&conflict("c", 0.0, 0.0), &rules);
        assert_eq!(candidates.len(), 3);

        let delay = of_kind(&candidates, ResolutionKind::Delay).unwrap();
        assert_eq!(delay.delta_time_sec, 120);
        assert_eq!(delay.estimated_horizontal_gain_nm, 5.0);
        assert_eq!(delay.cost, 11.0);

        let speed = of_kind(&candidates, ResolutionKind::Speed).unwrap();
        assert_eq!(speed.delta_speed_kt, -13.0);
        assert_eq!(speed.cost, 11.5);

        let altitude = of_kind(&candidates, ResolutionKind::Altitude).unwrap();
        assert_eq!(altitude.delta_altitude_ft, 2000.0);
        assert_eq!(altitude.cost, 11.25);
    }

    #[test]
    fn speed_gain_is_capped_without_clearing() {
        let rules = SeparationRules {
            horizontal_threshold_nm: 30.0,
            ..SeparationRules::default()
        };
        let candidates = candidates_for_conflict(&conflict("c", 2.0, 1000.0), &rules);
        let speed = of_kind(&candidates, ResolutionKind::Speed).unwrap();
        assert_eq!(speed.delta_speed_kt, -40.0);
        assert_eq!(speed.estimated_horizontal_gain_nm, 16.0);
        assert!(!speed.resolves_conflict);
        assert_eq!(speed.status, CandidateStatus::Pending);
    }

    #[test]
    fn exactly_on_minima_yields_nothing() {
        let rules = SeparationRules::default();
        assert!(candidates_for_conflict(&conflict("c", 5.0, 2000.0), &rules).is_empty());
    }

    #[test]
    fn cost_is_monotonic_in_severity() {
        let rules = SeparationRules::default();
        let mut last_cost = f64::NEG_INFINITY;
        for step in (0..50).rev() {
            let min_h = step as f64 * 0.1;
            let candidates = candidates_for_conflict(&conflict("c", min_h, 2000.0), &rules);
            let delay = of_kind(&candidates, ResolutionKind::Delay).unwrap();
            assert!(delay.cost >= last_cost);
            last_cost = delay.cost;
        }
    }

    #[test]
    fn candidates_are_ranked_globally() {
        let rules = SeparationRules::default();
        let conflicts = vec![conflict("deep", 0.5, 100.0), conflict("shallow", 4.5, 1900.0)];
        let candidates = score_resolutions(&conflicts, &rules);
        assert_eq!(candidates.len(), 6);
        assert!(candidates.windows(2).all(|w| w[0].cost <= w[1].cost));
        assert_eq!(candidates[0].conflict_id, "shallow");
        assert_eq!(candidates[0].id, "shallow-delay-AAA");
    }

    #[test]
    fn summary_counts_resolvable_and_adjusted() {
        let rules = SeparationRules::default();
        let conflicts = vec![conflict("one", 4.0, 2000.0), conflict("two", 5.0, 1000.0)];
        let candidates = score_resolutions(&conflicts, &rules);
        let summary = summarize_resolutions(&conflicts, &candidates);

        assert_eq!(summary.conflicts, 2);
        assert_eq!(summary.conflicts_resolvable, 2);
        assert_eq!(summary.flights_adjusted, 2);
        assert_eq!(summary.best_candidates.len(), 2);
        assert_eq!(summary.best_candidates[0].id, "one-delay-AAA");
        assert_eq!(summary.best_candidates[1].id, "two-altitude-BBB");
    }

    #[test]
    fn no_conflicts_no_candidates() {
        assert!(score_resolutions(&[], &SeparationRules::default()).is_empty());
    }
}
