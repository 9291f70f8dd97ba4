//! Condition scoring constants and the pitch state derived from them.
//!
//! Per-turf thresholds (rain sensitivity, drying time) live on
//! [`TurfType`]; everything here applies to every surface.

use crate::models::{Pitch, TurfType};
use serde::{Deserialize, Serialize};

/// Condition points lost per multiple of the turf's rain cut.
pub const DAMAGE_POINTS_PER_UNIT: i32 = 2;

/// At or below this condition the surface must be replaced.
pub const REPLACEMENT_THRESHOLD: u8 = 2;

/// Below this condition the pitch needs maintenance. A perfect pitch sits
/// exactly on it.
pub const MAINTENANCE_CUT_SCORE: u8 = 10;

/// Condition points restored by one round of maintenance.
pub const MAINTENANCE_POINTS: i32 = 4;

/// How long a maintenance round takes to complete.
pub const MAINTENANCE_DURATION_HOURS: i64 = 6;

const HOURS_PER_DAY: f64 = 24.0;

/// Convert a day's precipitation coverage (percent of the day with measurable
/// rain) into whole hours of rain, truncated.
pub fn rain_hours_from_coverage(coverage_percent: f64) -> u32 {
    if !coverage_percent.is_finite() || coverage_percent <= 0.0 {
        return 0;
    }
    let coverage = coverage_percent.min(100.0);
    (HOURS_PER_DAY * coverage / 100.0).floor() as u32
}

/// Condition points the given amount of rain takes off a surface.
pub fn rain_damage_points(turf_type: TurfType, rain_hours: u32) -> u32 {
    let cut = turf_type.rain_cut_hours();
    if rain_hours < cut {
        return 0;
    }
    (DAMAGE_POINTS_PER_UNIT as u32).saturating_mul(rain_hours / cut)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchState {
    Healthy,
    NeedsMaintenance,
    NeedsReplacement,
}

impl PitchState {
    pub fn of(pitch: &Pitch) -> Self {
        Self::from_condition(pitch.current_condition, pitch.need_to_change_turf)
    }

    pub fn from_condition(condition: u8, flagged_for_replacement: bool) -> Self {
        if flagged_for_replacement || condition <= REPLACEMENT_THRESHOLD {
            PitchState::NeedsReplacement
        } else if condition < MAINTENANCE_CUT_SCORE {
            PitchState::NeedsMaintenance
        } else {
            PitchState::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PitchState::Healthy => "Healthy",
            PitchState::NeedsMaintenance => "Needs maintenance",
            PitchState::NeedsReplacement => "Needs replacement",
        }
    }
}

impl std::fmt::Display for PitchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
