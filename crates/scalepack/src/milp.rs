//! MILP backend for packing models.
//!
//! This module translates the constraint model into a mixed-integer linear
//! program solved through the `good_lp` crate (pure-Rust `microlp` solver).
//! It is an alternative to the built-in branch-and-bound backend, selected
//! with [`SolverBackend::Milp`](crate::SolverBackend::Milp).
//!
//! # Translation
//!
//! - Integer variables map directly; boolean variables become binaries.
//! - A guarded linear constraint is relaxed with big-M terms, one
//!   `M * (1 - literal)` per enforcement literal, so a false guard slackens
//!   the constraint completely. `M` is derived from the expression's bounds.
//! - A `!=` constraint selects a side (`<= -1` or `>= 1`) through one
//!   auxiliary binary.
//! - A boolean disjunction becomes a lower bound on the literal sum.
//!
//! The underlying LP solver runs to completion: a successful solve is
//! reported as optimal (`good_lp` exposes no gap information), infeasibility
//! maps to `Infeasible`, and any other solver error maps to `Unknown`.

#[cfg(feature = "milp")]
use std::time::{Duration, Instant};

#[cfg(feature = "milp")]
use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};

#[cfg(feature = "milp")]
use scalepack_core::{
    Assignment, LinExpr, Lit, Model, ModelSolver, Rel, SolveOutcome, SolverStatus,
};

/// Returns true if the MILP backend was compiled in.
pub fn is_milp_available() -> bool {
    cfg!(feature = "milp")
}

/// MILP solver backend over `good_lp`.
#[cfg(feature = "milp")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MilpSolver;

#[cfg(feature = "milp")]
impl MilpSolver {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "milp")]
impl ModelSolver for MilpSolver {
    fn solve(&self, model: &Model, time_limit: Duration) -> SolveOutcome {
        let start = Instant::now();

        let mut vars = ProblemVariables::new();
        let lp_vars: Vec<Variable> = (0..model.num_vars())
            .map(|v| {
                if model.is_bool_var(v) {
                    vars.add(variable().binary())
                } else {
                    let (lo, hi) = model.var_bounds(v);
                    vars.add(variable().integer().min(lo as f64).max(hi as f64))
                }
            })
            .collect();

        // Side-selection binaries for `!=` constraints, declared up front:
        // variables cannot be added once the objective is installed.
        let side_vars: Vec<Option<Variable>> = model
            .linears()
            .iter()
            .map(|lin| {
                if lin.rel() == Rel::Ne {
                    Some(vars.add(variable().binary()))
                } else {
                    None
                }
            })
            .collect();

        let objective = match model.objective() {
            Some(expr) => to_expression(expr, &lp_vars),
            None => Expression::from(0.0),
        };
        let mut problem = vars.minimise(objective).using(default_solver);

        log::debug!(
            "milp solve: {} vars, {} linear constraints, {} disjunctions",
            model.num_vars(),
            model.linears().len(),
            model.disjunctions().len()
        );

        for (lin, side) in model.linears().iter().zip(&side_vars) {
            let expr = to_expression(lin.expr(), &lp_vars);
            let (lo, hi) = model.expr_bounds(lin.expr());

            match lin.rel() {
                Rel::Le if lin.guards().is_empty() => {
                    problem = problem.with(constraint!(expr <= 0.0));
                }
                Rel::Le => {
                    let lhs = expr - relaxation(lin.guards(), hi.max(0), &lp_vars);
                    problem = problem.with(constraint!(lhs <= 0.0));
                }
                Rel::Eq if lin.guards().is_empty() => {
                    problem = problem.with(constraint!(expr == 0.0));
                }
                Rel::Eq => {
                    // expr <= 0 on one side, expr >= 0 on the other.
                    let upper = to_expression(lin.expr(), &lp_vars)
                        - relaxation(lin.guards(), hi.max(0), &lp_vars);
                    problem = problem.with(constraint!(upper <= 0.0));
                    let lower = Expression::from(0.0)
                        - expr
                        - relaxation(lin.guards(), (-lo).max(0), &lp_vars);
                    problem = problem.with(constraint!(lower <= 0.0));
                }
                Rel::Ne => {
                    let Some(side) = *side else {
                        // Allocated in the pre-scan; cannot be absent.
                        continue;
                    };
                    let m_ge = (1 - lo).max(0);
                    let m_le = (hi + 1).max(0);
                    // side = 1: expr >= 1, as (1 - M) + M*side - expr <= 0.
                    let ge = Expression::from((1 - m_ge) as f64) + (m_ge as f64) * side
                        - to_expression(lin.expr(), &lp_vars)
                        - relaxation(lin.guards(), m_ge, &lp_vars);
                    problem = problem.with(constraint!(ge <= 0.0));
                    // side = 0: expr <= -1, as expr + 1 - M*side <= 0.
                    let le = expr + Expression::from(1.0)
                        - (m_le as f64) * side
                        - relaxation(lin.guards(), m_le, &lp_vars);
                    problem = problem.with(constraint!(le <= 0.0));
                }
            }
        }

        for lits in model.disjunctions() {
            let sum = lits
                .iter()
                .fold(Expression::from(0.0), |acc, &lit| {
                    acc + lit_expression(lit, &lp_vars)
                });
            problem = problem.with(constraint!(sum >= 1.0));
        }

        if start.elapsed() > time_limit {
            log::warn!("milp model construction alone exceeded the time budget");
        }

        let resolution = problem.solve();
        let solve_time_ms = start.elapsed().as_millis() as u64;

        match resolution {
            Ok(solution) => {
                let values: Vec<i64> = (0..model.num_vars())
                    .map(|v| {
                        let value = solution.value(lp_vars[v]);
                        if model.is_bool_var(v) {
                            i64::from(value > 0.5)
                        } else {
                            value.round() as i64
                        }
                    })
                    .collect();
                let assignment = Assignment::from_values(values);
                let objective = model.objective().map(|o| o.value_in(&assignment));
                SolveOutcome {
                    status: SolverStatus::Optimal,
                    assignment: Some(assignment),
                    objective,
                    solve_time_ms,
                }
            }
            Err(ResolutionError::Infeasible) => SolveOutcome {
                status: SolverStatus::Infeasible,
                assignment: None,
                objective: None,
                solve_time_ms,
            },
            Err(e) => {
                log::error!("milp solver error: {:?}", e);
                SolveOutcome {
                    status: SolverStatus::Unknown,
                    assignment: None,
                    objective: None,
                    solve_time_ms,
                }
            }
        }
    }
}

/// Linear expression of a model expression over the LP variables.
#[cfg(feature = "milp")]
fn to_expression(expr: &LinExpr, lp_vars: &[Variable]) -> Expression {
    let mut e = Expression::from(expr.offset() as f64);
    for (c, v) in expr.iter_terms() {
        e = e + (c as f64) * lp_vars[v];
    }
    e
}

/// Expression with value 1 when the literal holds, 0 otherwise.
#[cfg(feature = "milp")]
fn lit_expression(lit: Lit, lp_vars: &[Variable]) -> Expression {
    if lit.is_negated() {
        Expression::from(1.0) - lp_vars[lit.index()]
    } else {
        Expression::from(0.0) + lp_vars[lit.index()]
    }
}

/// Big-M slack released when any of the guard literals is false.
#[cfg(feature = "milp")]
fn relaxation(guards: &[Lit], big_m: i64, lp_vars: &[Variable]) -> Expression {
    let m = big_m as f64;
    guards.iter().fold(Expression::from(0.0), |acc, &lit| {
        // M * (1 - lit): for a plain literal that is M - M*v, for a negated
        // literal (lit = 1 - v) it collapses to M*v.
        if lit.is_negated() {
            acc + m * lp_vars[lit.index()]
        } else {
            acc + (Expression::from(m) - m * lp_vars[lit.index()])
        }
    })
}
