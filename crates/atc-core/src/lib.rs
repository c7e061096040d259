pub mod analysis;
pub mod bucketing;
pub mod conflict;
pub mod ingest;
pub mod map_data;
pub mod models;
pub mod resolution;
pub mod routing;
pub mod rules;
pub mod sampling;
pub mod segments;
pub mod spatial;
pub mod synthetic;

pub use analysis::{
    analyze_flights, build_flights, detect_traffic_conflicts, AnalysisError, AnalysisOptions,
    AnalysisResult, RejectedFlight, TrafficConflicts,
};
pub use conflict::{build_conflicts, ConflictDetector};
pub use ingest::{
    ingest_flights, parse_flight_text, validate_flights, IngestError, IngestResult,
};
pub use map_data::{build_map_data, MapData};
pub use models::{
    AnalysisSummary, CandidateStatus, Conflict, ConflictSample, Flight, RawFlight,
    ResolutionCandidate, ResolutionKind, Segment, TrajectoryPoint, Waypoint,
};
pub use resolution::{
    apply_resolution, score_resolutions, summarize_resolutions, ResolutionError,
    ResolutionOutcome, ResolutionSummary,
};
pub use routing::{parse_coord_token, parse_route, RouteParseError};
pub use rules::SeparationRules;
pub use sampling::{sample_flight, sample_flights};
pub use segments::{build_flight_from_raw, build_segments_for_waypoints};
pub use spatial::{haversine_km, haversine_nm};
pub use synthetic::{generate_flights, SyntheticConfig, SyntheticError};
