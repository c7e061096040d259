//! Separation minima and sampling parameters for trajectory analysis.

use serde::{Deserialize, Serialize};

/// Minimum horizontal separation in nautical miles.
pub const HORIZONTAL_THRESHOLD_NM: f64 = 5.0;
/// Minimum vertical separation in feet.
pub const VERTICAL_THRESHOLD_FT: f64 = 2000.0;
/// Coarse sampling step used for quick overviews.
pub const DEFAULT_COARSE_STEP_SEC: i64 = 60;
/// Fine sampling step used for conflict detection.
pub const DEFAULT_FINE_STEP_SEC: i64 = 15;
/// Grid cell size for spatial bucketing.
pub const CELL_SIZE_DEG: f64 = 1.0;

/// Configuration for separation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationRules {
    /// Minimum horizontal separation in nautical miles
    pub horizontal_threshold_nm: f64,
    /// Minimum vertical separation in feet
    pub vertical_threshold_ft: f64,
    /// Latitude band size used to prune pairwise checks
    pub cell_size_deg: f64,
}

impl Default for SeparationRules {
    fn default() -> Self {
        Self {
            horizontal_threshold_nm: HORIZONTAL_THRESHOLD_NM,
            vertical_threshold_ft: VERTICAL_THRESHOLD_FT,
            cell_size_deg: CELL_SIZE_DEG,
        }
    }
}

impl SeparationRules {
    /// True when both minima are violated at once.
    pub fn is_loss_of_separation(&self, horizontal_nm: f64, vertical_ft: f64) -> bool {
        horizontal_nm <= self.horizontal_threshold_nm && vertical_ft <= self.vertical_threshold_ft
    }
}
