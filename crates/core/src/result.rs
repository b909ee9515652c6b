//! Packing result representation.

use crate::item::PackedItem;
use crate::status::{PackingOutcome, SolverStatus};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packing result for a single box, or for one global shrink optimization.
///
/// In per-box mode the report carries one of these per physical box; in
/// global mode it carries a single entry with `box_id` absent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerBoxPackingResult {
    /// Identifier of the box, absent for a global optimization entry.
    pub box_id: Option<u64>,
    /// Placements produced by this solve; absent if it found no solution.
    pub packed_items: Option<Vec<PackedItem>>,
    /// Total shrink over the covered items; absent if no solution was found.
    pub total_shrink: Option<i64>,
    /// Raw solver termination status for this solve.
    pub status: SolverStatus,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
    /// Classified outcome for this solve.
    pub outcome: PackingOutcome,
    /// Optional human-readable detail.
    pub message: Option<String>,
}

impl PerBoxPackingResult {
    /// Returns true if this entry carries a usable placement.
    pub fn has_solution(&self) -> bool {
        self.packed_items.is_some()
    }
}

/// Comprehensive report of one packing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackingResult {
    /// True if a feasible packing was found for all items.
    pub success: bool,
    /// Overall outcome description.
    pub message: String,
    /// Minimum number of boxes determined in Phase 1; absent if Phase 1 failed.
    pub num_boxes_used: Option<usize>,
    /// Raw solver status of the Phase 1 (box minimization) solve.
    pub status_phase1: SolverStatus,
    /// Phase 1 solve time in milliseconds.
    pub solve_time_phase1_ms: u64,
    /// Classified overall outcome.
    pub outcome: PackingOutcome,
    /// Box width used for this run.
    pub box_width: i64,
    /// Box height used for this run.
    pub box_height: i64,
    /// One entry per box (per-box mode) or a single global entry.
    pub packing_results: Vec<PerBoxPackingResult>,
}

impl PackingResult {
    /// Iterates over all placements across all entries.
    pub fn packed_items(&self) -> impl Iterator<Item = &PackedItem> {
        self.packing_results
            .iter()
            .filter_map(|r| r.packed_items.as_deref())
            .flatten()
    }

    /// Total shrink over all entries that produced a solution.
    ///
    /// Returns None when no entry carries a shrink value.
    pub fn total_shrink(&self) -> Option<i64> {
        let mut total = None;
        for entry in &self.packing_results {
            if let Some(shrink) = entry.total_shrink {
                *total.get_or_insert(0) += shrink;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(box_id: u64, items: Vec<PackedItem>, shrink: i64) -> PerBoxPackingResult {
        PerBoxPackingResult {
            box_id: Some(box_id),
            packed_items: Some(items),
            total_shrink: Some(shrink),
            status: SolverStatus::Optimal,
            solve_time_ms: 1,
            outcome: PackingOutcome::Optimal,
            message: None,
        }
    }

    #[test]
    fn test_packed_items_flattens_entries() {
        let a = PackedItem {
            id: 1,
            x: 0,
            y: 0,
            width: 10,
            height: 10,
            box_id: 0,
        };
        let b = PackedItem { id: 2, box_id: 1, ..a };
        let result = PackingResult {
            success: true,
            message: String::new(),
            num_boxes_used: Some(2),
            status_phase1: SolverStatus::Optimal,
            solve_time_phase1_ms: 0,
            outcome: PackingOutcome::Optimal,
            box_width: 100,
            box_height: 100,
            packing_results: vec![entry(0, vec![a], 3), entry(1, vec![b], 4)],
        };

        assert_eq!(result.packed_items().count(), 2);
        assert_eq!(result.total_shrink(), Some(7));
    }

    #[test]
    fn test_total_shrink_absent_without_solutions() {
        let result = PackingResult {
            success: false,
            message: String::new(),
            num_boxes_used: None,
            status_phase1: SolverStatus::Infeasible,
            solve_time_phase1_ms: 0,
            outcome: PackingOutcome::NoSolutionInfeasible,
            box_width: 100,
            box_height: 100,
            packing_results: Vec::new(),
        };
        assert_eq!(result.total_shrink(), None);
        assert_eq!(result.packed_items().count(), 0);
    }
}
