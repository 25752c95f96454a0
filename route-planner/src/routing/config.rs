//! Routing configuration.

/// Tuning parameters for route search and alternative selection.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Edges touching an avoided node have their cost divided by this.
    /// 0.8 means a 25% cost increase.
    pub penalty_factor: f64,

    /// Alternates longer than `direct distance × ratio` are detours...
    pub max_detour_ratio: f64,

    /// ...but only once they are also longer than this (meters).
    pub min_detour_length_m: f64,

    /// Maximum number of alternates to return.
    pub max_alternatives: usize,

    /// Number of concurrent network reads when assembling a route.
    pub batch_size: usize,

    /// How far a point may be from the nearest node and still snap (meters).
    pub max_snap_distance_m: f64,
}

impl RoutingConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        penalty_factor: f64,
        max_detour_ratio: f64,
        min_detour_length_m: f64,
        max_alternatives: usize,
        batch_size: usize,
        max_snap_distance_m: f64,
    ) -> Self {
        Self {
            penalty_factor,
            max_detour_ratio,
            min_detour_length_m,
            max_alternatives,
            batch_size,
            max_snap_distance_m,
        }
    }

    /// Multiplier applied to the cost of an edge touching an avoided node.
    pub fn avoid_multiplier(&self) -> f64 {
        1.0 / self.penalty_factor
    }

    /// Returns true if an alternate of `distance` is an unacceptable detour
    /// given the straight-line `direct` distance between its endpoints.
    ///
    /// Both limits must be exceeded, so short detours always pass.
    pub fn is_excessive_detour(&self, distance: f64, direct: f64) -> bool {
        distance > direct * self.max_detour_ratio && distance > self.min_detour_length_m
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            penalty_factor: 0.8,
            max_detour_ratio: 1.4,
            min_detour_length_m: 500.0,
            max_alternatives: 2,
            batch_size: 8,
            max_snap_distance_m: 5_000.0,
        }
    }
}
