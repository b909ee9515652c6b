//! Two-phase packing orchestration.
//!
//! A packing run validates its input, then:
//!
//! 1. **Phase 1** solves the placement model with a box-count objective to
//!    find the minimum number of boxes that can hold all items (any shrink
//!    within each item's allowed range may be used to make things fit).
//! 2. Items are partitioned into groups by their Phase 1 box assignment.
//! 3. **Phase 2** minimizes total shrink for the fixed box count: either one
//!    global model over all boxes (items may migrate between boxes), or one
//!    independent model per box with the full time budget each.
//! 4. Raw solver statuses are classified into outcomes and aggregated into a
//!    single report.
//!
//! Solve failures are data, not errors: a Phase 1 failure short-circuits
//! with `num_boxes_used` absent, and a Phase 2 failure returns whatever
//! per-box results did succeed so callers can inspect them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use scalepack_core::{
    Assignment, BoxSpec, CpSolver, Error, Item, Model, ModelSolver, PackedItem, PackingOutcome,
    PackingResult, PerBoxPackingResult, Result, SolveOutcome, SolverStatus,
};

use crate::builder::{self, ItemVars};
use crate::config::{PackConfig, SolverBackend};
#[cfg(feature = "milp")]
use crate::milp::MilpSolver;
use crate::validate::validate_input;

/// Phase 1 facts carried into Phase 2 and the final report.
struct PhaseSummary {
    status: SolverStatus,
    solve_time_ms: u64,
    min_boxes: usize,
}

/// The packing engine.
///
/// Holds a [`PackConfig`] and a cancellation flag shared with every solve it
/// starts. Each [`Packer::pack`] call is self-contained: models and results
/// are built fresh and nothing persists between calls.
#[derive(Debug, Clone)]
pub struct Packer {
    config: PackConfig,
    cancelled: Arc<AtomicBool>,
}

impl Packer {
    /// Creates a packer with the given configuration.
    pub fn new(config: PackConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Requests cancellation of any in-flight solve.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// The cancellation flag observed by this packer's solves.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Packs the items into the minimum number of `box_width` x `box_height`
    /// boxes, then minimizes total shrink for that count.
    ///
    /// Returns `Err` only for invalid input; solve failures are reported
    /// inside the returned [`PackingResult`].
    pub fn pack(&self, items: &[Item], box_width: i64, box_height: i64) -> Result<PackingResult> {
        validate_input(items, box_width, box_height, self.config.time_limit_secs)?;
        let bx = BoxSpec::new(0, box_width, box_height);
        let limit = Duration::from_secs(self.config.time_limit_secs);
        log::info!(
            "packing {} items into {}x{} boxes (equal_shrink: {}, per_box: {})",
            items.len(),
            box_width,
            box_height,
            self.config.equal_shrink,
            self.config.per_box
        );

        // Phase 1: minimize the number of boxes, capacity one box per item.
        let (mut model, item_vars) =
            builder::build_pack_model(items, &bx, items.len(), self.config.equal_shrink);
        let max_box_id = builder::add_min_boxes_objective(&mut model, &item_vars);
        let outcome1 = self.run_solver(&model, limit);
        log::info!(
            "phase 1: status {}, {}ms",
            outcome1.status,
            outcome1.solve_time_ms
        );

        if !outcome1.status.is_solution() {
            return Ok(PackingResult {
                success: false,
                message: "Phase 1 (box minimization) failed to find a feasible solution"
                    .to_string(),
                num_boxes_used: None,
                status_phase1: outcome1.status,
                solve_time_phase1_ms: outcome1.solve_time_ms,
                outcome: PackingOutcome::from(outcome1.status),
                box_width,
                box_height,
                packing_results: Vec::new(),
            });
        }
        let Some(assignment) = outcome1.assignment else {
            return Err(Error::Internal(
                "solver reported a solution without an assignment".to_string(),
            ));
        };

        let min_boxes = assignment.value(max_box_id) as usize + 1;
        log::info!("phase 1: minimum {min_boxes} boxes");
        let summary = PhaseSummary {
            status: outcome1.status,
            solve_time_ms: outcome1.solve_time_ms,
            min_boxes,
        };

        if self.config.per_box {
            let groups = partition_by_box(items, &item_vars, &assignment, min_boxes);
            Ok(self.pack_per_box(&groups, &bx, limit, &summary))
        } else {
            Ok(self.pack_global(items, &bx, limit, &summary))
        }
    }

    /// Phase 2, global mode: one model over all boxes; items may be
    /// reassigned across boxes as long as the count stays at the minimum.
    fn pack_global(
        &self,
        items: &[Item],
        bx: &BoxSpec,
        limit: Duration,
        summary: &PhaseSummary,
    ) -> PackingResult {
        let (out, extracted) = self.solve_shrink_model(items, bx, summary.min_boxes, limit);
        let outcome = PackingOutcome::from(out.status);
        log::info!(
            "phase 2 (global): status {}, {}ms",
            out.status,
            out.solve_time_ms
        );

        match extracted {
            Some((packed, total_shrink)) => PackingResult {
                success: true,
                message: format!(
                    "Packing successful with {} boxes. Total shrink: {}",
                    summary.min_boxes, total_shrink
                ),
                num_boxes_used: Some(summary.min_boxes),
                status_phase1: summary.status,
                solve_time_phase1_ms: summary.solve_time_ms,
                outcome,
                box_width: bx.width,
                box_height: bx.height,
                packing_results: vec![PerBoxPackingResult {
                    box_id: None,
                    packed_items: Some(packed),
                    total_shrink: Some(total_shrink),
                    status: out.status,
                    solve_time_ms: out.solve_time_ms,
                    outcome,
                    message: Some("Global shrink optimization successful".to_string()),
                }],
            },
            None => PackingResult {
                success: false,
                message: format!(
                    "Phase 2 (global shrink optimization) failed. Solver status: {}",
                    out.status
                ),
                num_boxes_used: Some(summary.min_boxes),
                status_phase1: summary.status,
                solve_time_phase1_ms: summary.solve_time_ms,
                outcome,
                box_width: bx.width,
                box_height: bx.height,
                packing_results: vec![PerBoxPackingResult {
                    box_id: None,
                    packed_items: None,
                    total_shrink: None,
                    status: out.status,
                    solve_time_ms: out.solve_time_ms,
                    outcome,
                    message: Some(format!("Global shrink optimization failed: {}", out.status)),
                }],
            },
        }
    }

    /// Phase 2, per-box mode: each group is solved independently with the
    /// full time budget; one failed box does not stop the rest.
    fn pack_per_box(
        &self,
        groups: &[Vec<Item>],
        bx: &BoxSpec,
        limit: Duration,
        summary: &PhaseSummary,
    ) -> PackingResult {
        #[cfg(feature = "rayon")]
        let entries: Vec<PerBoxPackingResult> = groups
            .par_iter()
            .enumerate()
            .map(|(box_id, group)| self.solve_box(box_id as u64, group, bx, limit))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let entries: Vec<PerBoxPackingResult> = groups
            .iter()
            .enumerate()
            .map(|(box_id, group)| self.solve_box(box_id as u64, group, bx, limit))
            .collect();

        aggregate_per_box(entries, bx, summary)
    }

    /// Solves one box's shrink optimization (capacity 1).
    fn solve_box(
        &self,
        box_id: u64,
        items: &[Item],
        bx: &BoxSpec,
        limit: Duration,
    ) -> PerBoxPackingResult {
        let (out, extracted) = self.solve_shrink_model(items, bx, 1, limit);
        let outcome = PackingOutcome::from(out.status);
        log::debug!(
            "phase 2 (box {}): status {}, {}ms",
            box_id,
            out.status,
            out.solve_time_ms
        );

        match extracted {
            Some((mut packed, total_shrink)) => {
                for item in &mut packed {
                    item.box_id = box_id;
                }
                PerBoxPackingResult {
                    box_id: Some(box_id),
                    packed_items: Some(packed),
                    total_shrink: Some(total_shrink),
                    status: out.status,
                    solve_time_ms: out.solve_time_ms,
                    outcome,
                    message: Some(format!("Box {box_id} shrink optimization successful")),
                }
            }
            None => PerBoxPackingResult {
                box_id: Some(box_id),
                packed_items: None,
                total_shrink: None,
                status: out.status,
                solve_time_ms: out.solve_time_ms,
                outcome,
                message: Some(format!(
                    "No feasible solution for box {box_id} shrink optimization"
                )),
            },
        }
    }

    /// Builds and solves a shrink model for the given items and capacity.
    ///
    /// The shrink objective is only installed when the items have slack;
    /// rigid groups are solved as pure feasibility problems.
    fn solve_shrink_model(
        &self,
        items: &[Item],
        bx: &BoxSpec,
        capacity: usize,
        limit: Duration,
    ) -> (SolveOutcome, Option<(Vec<PackedItem>, i64)>) {
        let (mut model, item_vars) =
            builder::build_pack_model(items, bx, capacity, self.config.equal_shrink);
        if builder::has_shrink_slack(items) {
            builder::add_min_shrink_objective(&mut model, items, &item_vars);
        }
        let out = self.run_solver(&model, limit);
        let extracted = out
            .assignment
            .as_ref()
            .map(|a| builder::extract_packed_items(items, &item_vars, a));
        (out, extracted)
    }

    fn run_solver(&self, model: &Model, limit: Duration) -> SolveOutcome {
        match self.config.backend {
            SolverBackend::BranchAndBound => CpSolver::new()
                .with_cancel_flag(Arc::clone(&self.cancelled))
                .solve(model, limit),
            #[cfg(feature = "milp")]
            SolverBackend::Milp => MilpSolver::new().solve(model, limit),
        }
    }
}

impl Default for Packer {
    fn default() -> Self {
        Self::new(PackConfig::default())
    }
}

/// Splits items into per-box groups according to the Phase 1 assignment.
///
/// Box ids used by a minimal Phase 1 solution are contiguous, so every item
/// lands in `[0, min_boxes)`.
fn partition_by_box(
    items: &[Item],
    item_vars: &[ItemVars],
    assignment: &Assignment,
    min_boxes: usize,
) -> Vec<Vec<Item>> {
    let mut groups = vec![Vec::new(); min_boxes];
    for (item, vars) in items.iter().zip(item_vars) {
        let box_id = assignment.value(vars.box_var) as usize;
        groups[box_id].push(*item);
    }
    groups
}

/// Combines per-box entries into the overall report.
///
/// Success requires every box to carry a placement; the overall outcome is
/// `Optimal` only when every box proved optimality, `Feasible` when all
/// succeeded but not all optimally, and `NoSolutionUnknown` when any box
/// failed (its own entry keeps the specific reason).
fn aggregate_per_box(
    entries: Vec<PerBoxPackingResult>,
    bx: &BoxSpec,
    summary: &PhaseSummary,
) -> PackingResult {
    let all_solved = entries.iter().all(PerBoxPackingResult::has_solution);
    if all_solved {
        let total_shrink: i64 = entries.iter().filter_map(|e| e.total_shrink).sum();
        let all_optimal = entries
            .iter()
            .all(|e| e.outcome == PackingOutcome::Optimal);
        PackingResult {
            success: true,
            message: format!(
                "Packing successful with {} boxes. Total shrink: {}",
                summary.min_boxes, total_shrink
            ),
            num_boxes_used: Some(summary.min_boxes),
            status_phase1: summary.status,
            solve_time_phase1_ms: summary.solve_time_ms,
            outcome: if all_optimal {
                PackingOutcome::Optimal
            } else {
                PackingOutcome::Feasible
            },
            box_width: bx.width,
            box_height: bx.height,
            packing_results: entries,
        }
    } else {
        let details: Vec<String> = entries
            .iter()
            .filter(|e| !e.has_solution())
            .map(|e| match e.box_id {
                Some(id) => format!("box {id}: {}", e.status),
                None => format!("global: {}", e.status),
            })
            .collect();
        PackingResult {
            success: false,
            message: format!(
                "Phase 2 (shrink optimization) failed for some boxes: {}",
                details.join("; ")
            ),
            num_boxes_used: Some(summary.min_boxes),
            status_phase1: summary.status,
            solve_time_phase1_ms: summary.solve_time_ms,
            outcome: PackingOutcome::NoSolutionUnknown,
            box_width: bx.width,
            box_height: bx.height,
            packing_results: entries,
        }
    }
}
