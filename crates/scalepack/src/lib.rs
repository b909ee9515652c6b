//! # ScalePack
//!
//! Shrink-aware 2D rectangular bin packing.
//!
//! Items with a preferred size and a tolerable minimum size are placed
//! without overlap into the minimum number of identical boxes. Optimization
//! runs in two phases:
//!
//! 1. **Box minimization**: find the smallest number of boxes that can hold
//!    all items, using any shrink within each item's allowed range.
//! 2. **Shrink minimization**: with the box count fixed, minimize the total
//!    size reduction, either globally across all boxes or independently per
//!    box.
//!
//! Solve failures (infeasible, timeout) are reported as data in the
//! [`PackingResult`]; `Err` is reserved for invalid input.
//!
//! ## Quick Start
//!
//! ```rust
//! use scalepack::{pack, Item, PackConfig};
//!
//! let items = vec![
//!     Item::new(1, 100, 50, 80, 40),
//!     Item::new(2, 60, 80, 50, 70),
//! ];
//!
//! let config = PackConfig::new().with_time_limit_secs(10);
//! let result = pack(&items, 200, 200, &config).unwrap();
//!
//! assert!(result.success);
//! println!(
//!     "{} boxes, total shrink {:?}",
//!     result.num_boxes_used.unwrap_or(0),
//!     result.total_shrink()
//! );
//! ```
//!
//! ## Modes
//!
//! - [`PackConfig::with_equal_shrink`]: width and height shrink by the same
//!   amount per item, instead of independently per axis.
//! - [`PackConfig::with_per_box`]: Phase 2 optimizes each box on its own
//!   (each solve gets the full time budget) instead of one global model.
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support for items, configs, and reports
//! - `milp`: MILP solver backend through `good_lp`
//! - `rayon`: Parallel per-box Phase 2 solves

pub mod builder;
pub mod config;
pub mod milp;
pub mod packer;
pub mod validate;

// Re-exports
pub use config::{PackConfig, SolverBackend};
pub use milp::is_milp_available;
pub use packer::Packer;
pub use scalepack_core::{
    BoxSpec, Constraint, CpSolver, Error, Item, LinExpr, Model, ModelSolver, PackedItem,
    PackingOutcome, PackingResult, PerBoxPackingResult, Result, SolveOutcome, SolverStatus,
};

/// Packs `items` into the minimum number of `box_width` x `box_height`
/// boxes, then minimizes total shrink.
///
/// Convenience wrapper over [`Packer::pack`].
pub fn pack(
    items: &[Item],
    box_width: i64,
    box_height: i64,
    config: &PackConfig,
) -> Result<PackingResult> {
    Packer::new(config.clone()).pack(items, box_width, box_height)
}
