//! Solver termination statuses and their high-level classification.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw termination status of a single solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible solution found, but optimality not proven within budget.
    Feasible,
    /// Proven infeasible: no valid assignment exists.
    Infeasible,
    /// Budget exhausted (or solve cancelled) without a feasible solution.
    #[default]
    Unknown,
}

impl SolverStatus {
    /// Returns true if the solve produced a usable assignment.
    pub fn is_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "Optimal"),
            Self::Feasible => write!(f, "Feasible"),
            Self::Infeasible => write!(f, "Infeasible"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// High-level outcome of a packing optimization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PackingOutcome {
    /// Optimal solution found.
    Optimal,
    /// Feasible solution found, not proven optimal.
    Feasible,
    /// No feasible solution exists (model proven infeasible).
    NoSolutionInfeasible,
    /// No feasible solution found within the time limit.
    NoSolutionTimeout,
    /// No feasible solution found, reason unknown.
    NoSolutionUnknown,
}

impl PackingOutcome {
    /// Returns true if the outcome carries a usable placement.
    pub fn is_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl From<SolverStatus> for PackingOutcome {
    /// Classifies a raw solver status.
    ///
    /// `Unknown` means the budget ran out before the solver could prove
    /// anything, so it classifies as a timeout.
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Optimal => Self::Optimal,
            SolverStatus::Feasible => Self::Feasible,
            SolverStatus::Infeasible => Self::NoSolutionInfeasible,
            SolverStatus::Unknown => Self::NoSolutionTimeout,
        }
    }
}

impl std::fmt::Display for PackingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "Optimal solution found"),
            Self::Feasible => write!(f, "Feasible solution found (not proven optimal)"),
            Self::NoSolutionInfeasible => {
                write!(f, "No feasible solution exists (model proven infeasible)")
            }
            Self::NoSolutionTimeout => {
                write!(f, "No feasible solution found within time limit")
            }
            Self::NoSolutionUnknown => write!(f, "No feasible solution found (unknown reason)"),
        }
    }
}
