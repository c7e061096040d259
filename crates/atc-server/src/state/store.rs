//! In-memory state store using DashMap.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use atc_core::{analyze_flights, AnalysisError, AnalysisOptions, AnalysisResult, RawFlight};
use dashmap::DashMap;

use crate::cache::{prune_cache, CacheEntry};
use crate::config::Config;

/// A finished analysis kept for re-reads by id.
#[derive(Debug, Clone)]
pub struct CachedAnalysis {
    pub result: Arc<AnalysisResult>,
    stored_at: Instant,
}

impl CacheEntry for CachedAnalysis {
    fn stored_at(&self) -> Instant {
        self.stored_at
    }
}

/// Application state, shared by every handler.
pub struct AppState {
    config: Config,
    analyses: DashMap<String, CachedAnalysis>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            analyses: DashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run (or reuse) the analysis for a batch.
    ///
    /// Identical batches with identical options share one id.
    pub fn analyze(
        &self,
        flights: &[RawFlight],
        options: &AnalysisOptions,
    ) -> Result<(String, Arc<AnalysisResult>), AnalysisError> {
        options.validate()?;
        let id = analysis_key(flights, options);

        if let Some(cached) = self.cached_analysis(&id) {
            tracing::debug!(analysis_id = %id, "analysis cache hit");
            return Ok((id, cached));
        }

        let result = Arc::new(analyze_flights(flights, options)?);
        self.analyses.insert(
            id.clone(),
            CachedAnalysis {
                result: result.clone(),
                stored_at: Instant::now(),
            },
        );
        prune_cache(
            &self.analyses,
            self.config.cache_max_entries,
            self.config.cache_ttl,
        );

        Ok((id, result))
    }

    /// Look up a cached analysis, ignoring expired entries.
    pub fn cached_analysis(&self, id: &str) -> Option<Arc<AnalysisResult>> {
        let entry = self.analyses.get(id)?;
        if entry.stored_at.elapsed() > self.config.cache_ttl {
            drop(entry);
            self.analyses.remove(id);
            return None;
        }
        Some(entry.result.clone())
    }

    pub fn cached_count(&self) -> usize {
        self.analyses.len()
    }
}

/// Content hash of a batch and its options, rendered as 16 hex digits.
pub fn analysis_key(flights: &[RawFlight], options: &AnalysisOptions) -> String {
    let mut hasher = DefaultHasher::new();
    flights.len().hash(&mut hasher);
    for flight in flights {
        flight.acid.hash(&mut hasher);
        flight.plane_type.hash(&mut hasher);
        flight.route.hash(&mut hasher);
        flight.altitude.hash(&mut hasher);
        flight.departure_airport.hash(&mut hasher);
        flight.arrival_airport.hash(&mut hasher);
        flight.departure_time.hash(&mut hasher);
        flight.aircraft_speed.to_bits().hash(&mut hasher);
        flight.passengers.hash(&mut hasher);
        flight.is_cargo.hash(&mut hasher);
    }
    options.step_sec.hash(&mut hasher);
    options.rules.horizontal_threshold_nm.to_bits().hash(&mut hasher);
    options.rules.vertical_threshold_ft.to_bits().hash(&mut hasher);
    options.rules.cell_size_deg.to_bits().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
