//! Packing configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Solver backend used for every solve of a packing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolverBackend {
    /// Built-in deterministic branch-and-bound solver.
    #[default]
    BranchAndBound,
    /// MILP translation solved through `good_lp`.
    #[cfg(feature = "milp")]
    Milp,
}

/// Configuration for a packing run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackConfig {
    /// If true, width and height shrink by the same amount per item.
    /// If false, the axes shrink independently within their own bounds.
    pub equal_shrink: bool,

    /// If true, Phase 2 optimizes each box independently; if false, one
    /// global model re-optimizes shrink across all boxes.
    pub per_box: bool,

    /// Time budget in seconds, applied to Phase 1 and to each Phase 2 solve.
    pub time_limit_secs: u64,

    /// Backend used for all solves.
    pub backend: SolverBackend,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            equal_shrink: false,
            per_box: false,
            time_limit_secs: 30,
            backend: SolverBackend::default(),
        }
    }
}

impl PackConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the equal-shrink policy.
    pub fn with_equal_shrink(mut self, equal_shrink: bool) -> Self {
        self.equal_shrink = equal_shrink;
        self
    }

    /// Sets the per-box Phase 2 strategy.
    pub fn with_per_box(mut self, per_box: bool) -> Self {
        self.per_box = per_box;
        self
    }

    /// Sets the time budget in seconds (at least 1).
    pub fn with_time_limit_secs(mut self, secs: u64) -> Self {
        self.time_limit_secs = secs.max(1);
        self
    }

    /// Sets the solver backend.
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }
}
