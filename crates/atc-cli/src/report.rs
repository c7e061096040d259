//! Plain-text analysis reports.

use std::fmt::Write;

use atc_core::{AnalysisResult, ResolutionCandidate, ResolutionKind, ResolutionSummary};
use chrono::DateTime;

/// How many ranked candidates the report lists.
const TOP_CANDIDATES: usize = 10;

/// Render epoch seconds as a UTC timestamp, falling back to raw seconds.
pub fn format_epoch(t_sec: i64) -> String {
    DateTime::from_timestamp(t_sec, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%SZ").to_string())
        .unwrap_or_else(|| format!("t={t_sec}s"))
}

pub fn describe_candidate(candidate: &ResolutionCandidate) -> String {
    let action = match candidate.kind {
        ResolutionKind::Delay => format!("delay {} min", candidate.delta_time_sec / 60),
        ResolutionKind::Altitude => format!("climb {:.0} ft", candidate.delta_altitude_ft),
        ResolutionKind::Speed => format!("slow {:.0} kt", -candidate.delta_speed_kt),
    };
    format!(
        "{:<8} {:<10} {:<16} cost {:>5.2}{}",
        candidate.kind.as_str(),
        candidate.flight_id,
        action,
        candidate.cost,
        if candidate.resolves_conflict {
            ""
        } else {
            "  (partial)"
        }
    )
}

pub fn render_report(
    analysis: &AnalysisResult,
    candidates: &[ResolutionCandidate],
    resolutions: &ResolutionSummary,
) -> String {
    let summary = &analysis.summary;
    let mut out = String::new();

    let _ = writeln!(out, "Flights analysed: {}", summary.flights);
    let _ = writeln!(
        out,
        "Segments: {} ({:.2} per flight)",
        summary.segments, summary.average_segments_per_flight
    );
    let _ = writeln!(
        out,
        "Samples: {} ({:.1} per flight)",
        summary.samples, summary.average_samples_per_flight
    );
    let _ = writeln!(
        out,
        "Conflicts: {} from {} conflict samples",
        summary.conflicts, summary.conflict_samples
    );

    if !analysis.rejected.is_empty() {
        let _ = writeln!(out, "\nRejected flights:");
        for rejected in &analysis.rejected {
            let _ = writeln!(out, "  {:<10} {}", rejected.flight_id, rejected.reason);
        }
    }

    if analysis.conflicts.is_empty() {
        let _ = writeln!(out, "\nNo loss of separation detected.");
        return out;
    }

    let _ = writeln!(out, "\nConflicts:");
    for conflict in &analysis.conflicts {
        let _ = writeln!(
            out,
            "  {:<24} {} -> {}  min {:.2} nm / {:.0} ft at {:.4}, {:.4}",
            conflict.id,
            format_epoch(conflict.t_start),
            format_epoch(conflict.t_end),
            conflict.min_horizontal_nm,
            conflict.min_vertical_ft,
            conflict.representative_lat,
            conflict.representative_lon,
        );
    }

    let _ = writeln!(out, "\nFlights in conflict:");
    for flight in &analysis.flights {
        let involved = analysis
            .conflicts
            .iter()
            .filter(|conflict| conflict.involves(&flight.id))
            .count();
        if involved == 0 {
            continue;
        }
        let departs = flight
            .departure_datetime()
            .map(|dt| dt.format("%H:%M:%SZ").to_string())
            .unwrap_or_else(|| format_epoch(flight.departure_time));
        let block_min = flight
            .arrival_time()
            .map(|arrival| (arrival - flight.departure_time as f64) / 60.0)
            .unwrap_or(0.0);
        let _ = writeln!(
            out,
            "  {:<10} {:<5} departs {}  {:>7.1} nm  {:>5.0} min  {} conflict(s)",
            flight.id,
            flight.plane_type,
            departs,
            flight.total_distance_nm(),
            block_min,
            involved
        );
    }

    let _ = writeln!(
        out,
        "\nResolutions: {} of {} conflicts resolvable, {} flights adjustable",
        resolutions.conflicts_resolvable, resolutions.conflicts, resolutions.flights_adjusted
    );
    for candidate in candidates.iter().take(TOP_CANDIDATES) {
        let _ = writeln!(out, "  {}", describe_candidate(candidate));
    }
    if candidates.len() > TOP_CANDIDATES {
        let _ = writeln!(out, "  ... {} more", candidates.len() - TOP_CANDIDATES);
    }

    out
}
