//! # ScalePack Core
//!
//! Core types and solver machinery for the ScalePack packing engine.
//!
//! This crate provides the pieces shared by every packing strategy:
//!
//! - **Data model**: [`Item`], [`BoxSpec`], [`PackedItem`]
//! - **Constraint model**: [`Model`], [`IntVar`], [`BoolVar`], [`LinExpr`],
//!   [`Constraint`] — a backend-neutral integer optimization representation
//! - **Solver**: [`ModelSolver`] trait and the built-in [`CpSolver`]
//!   branch-and-bound backend
//! - **Statuses**: [`SolverStatus`] (raw termination) and [`PackingOutcome`]
//!   (classified result quality)
//! - **Reports**: [`PerBoxPackingResult`], [`PackingResult`]
//!
//! ## Solve contract
//!
//! A solve call takes a model and a wall-clock budget and returns one of
//! four statuses: proven optimal, feasible without proof, proven infeasible,
//! or unknown (budget exhausted). Failures are data, not errors; the
//! [`Error`] type only covers invalid input.
//!
//! ```rust
//! use std::time::Duration;
//! use scalepack_core::{Constraint, CpSolver, Model, ModelSolver, SolverStatus};
//!
//! let mut m = Model::new();
//! let x = m.new_int_var(0, 10);
//! m.add(Constraint::le(4, x));
//! m.minimize(x);
//!
//! let out = CpSolver::new().solve(&m, Duration::from_secs(5));
//! assert_eq!(out.status, SolverStatus::Optimal);
//! assert_eq!(out.objective, Some(4));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod item;
pub mod model;
pub mod result;
pub mod solver;
pub mod status;

// Re-exports
pub use error::{Error, Result};
pub use item::{BoxSpec, Item, PackedItem};
pub use model::{Assignment, BoolVar, Constraint, IntVar, LinExpr, Lit, Model, Rel};
pub use result::{PackingResult, PerBoxPackingResult};
pub use solver::{CpSolver, ModelSolver, SolveOutcome};
pub use status::{PackingOutcome, SolverStatus};
