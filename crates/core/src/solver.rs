//! Branch-and-bound solver for constraint models.
//!
//! [`CpSolver`] is the built-in backend: a deterministic depth-first
//! branch-and-bound search with bounds-consistency propagation over the
//! [`Model`] representation. It honors a wall-clock time budget and a
//! cooperative cancellation flag, and reports one of four termination
//! statuses:
//!
//! | Search state                    | Status       |
//! |---------------------------------|--------------|
//! | Exhausted, incumbent found      | `Optimal`    |
//! | Exhausted, no incumbent         | `Infeasible` |
//! | Budget/cancel hit, incumbent    | `Feasible`   |
//! | Budget/cancel hit, no incumbent | `Unknown`    |
//!
//! A model without an objective terminates at the first solution and reports
//! `Optimal` (there is nothing left to prove).
//!
//! Branching is smallest-domain-first with lowest-index tie-breaking and
//! lower-half-first domain splitting, so identical models always explore the
//! same tree and return the same objective value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::model::{Assignment, Constraint, LinExpr, Lit, Model, Rel};
use crate::status::SolverStatus;

/// Result of one solve call.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Termination status.
    pub status: SolverStatus,
    /// Values for every declared variable, present when `status.is_solution()`.
    pub assignment: Option<Assignment>,
    /// Objective value of the assignment, when the model has an objective.
    pub objective: Option<i64>,
    /// Wall-clock solve time in milliseconds.
    pub solve_time_ms: u64,
}

/// A backend capable of solving a [`Model`] within a time budget.
///
/// Implementations must return `Optimal` only with a proof (exhausted
/// search or equivalent), `Feasible` for an incumbent without proof,
/// `Infeasible` only when no assignment can exist, and `Unknown` when the
/// budget ran out before anything could be established.
pub trait ModelSolver {
    /// Solves the model, blocking until done or out of budget.
    fn solve(&self, model: &Model, time_limit: Duration) -> SolveOutcome;
}

/// Built-in deterministic branch-and-bound solver.
#[derive(Debug, Clone)]
pub struct CpSolver {
    cancelled: Arc<AtomicBool>,
}

impl CpSolver {
    /// Creates a solver with its own cancellation flag.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Uses a shared cancellation flag; setting it aborts an in-flight solve
    /// at the next node boundary.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    /// The cancellation flag observed by this solver.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

impl Default for CpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSolver for CpSolver {
    fn solve(&self, model: &Model, time_limit: Duration) -> SolveOutcome {
        let start = Instant::now();
        log::debug!(
            "cp solve: {} vars, {} linear constraints, {} disjunctions, objective: {}",
            model.num_vars(),
            model.linears().len(),
            model.disjunctions().len(),
            model.objective().is_some()
        );

        let mut search = Search {
            model,
            // An unrepresentable deadline means the budget never expires.
            deadline: start.checked_add(time_limit),
            cancelled: &self.cancelled,
            best: None,
            stopped: false,
            satisfied: false,
            nodes: 0,
        };
        let domains: Vec<(i64, i64)> = (0..model.num_vars()).map(|v| model.var_bounds(v)).collect();
        search.dfs(domains);

        let complete = !search.stopped || search.satisfied;
        let status = match (&search.best, complete) {
            (Some(_), true) => SolverStatus::Optimal,
            (Some(_), false) => SolverStatus::Feasible,
            (None, true) => SolverStatus::Infeasible,
            (None, false) => SolverStatus::Unknown,
        };
        let (assignment, objective) = match search.best {
            Some((values, obj)) => (Some(Assignment::from_values(values)), obj),
            None => (None, None),
        };
        let solve_time_ms = start.elapsed().as_millis() as u64;
        log::debug!(
            "cp solve done: status {}, {} nodes, {}ms",
            status,
            search.nodes,
            solve_time_ms
        );

        SolveOutcome {
            status,
            assignment,
            objective,
            solve_time_ms,
        }
    }
}

type Domains = Vec<(i64, i64)>;

struct Search<'a> {
    model: &'a Model,
    deadline: Option<Instant>,
    cancelled: &'a AtomicBool,
    /// Best assignment found so far and its objective value.
    best: Option<(Vec<i64>, Option<i64>)>,
    /// Budget exhausted or cancelled before the tree was explored.
    stopped: bool,
    /// Objective-free model solved; search goal reached.
    satisfied: bool,
    nodes: u64,
}

impl Search<'_> {
    fn dfs(&mut self, mut domains: Domains) {
        self.nodes += 1;
        if self.cancelled.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
        {
            self.stopped = true;
            return;
        }
        if !self.propagate(&mut domains) {
            return;
        }

        match pick_var(&domains) {
            None => self.record_solution(&domains),
            Some(v) => {
                let (lo, hi) = domains[v];
                let mid = lo + (hi - lo) / 2;

                let mut lower = domains.clone();
                lower[v] = (lo, mid);
                self.dfs(lower);
                if self.stopped || self.satisfied {
                    return;
                }

                domains[v] = (mid + 1, hi);
                self.dfs(domains);
            }
        }
    }

    fn record_solution(&mut self, domains: &Domains) {
        let values: Vec<i64> = domains.iter().map(|&(lo, _)| lo).collect();
        match self.model.objective() {
            Some(obj) => {
                let value = eval(obj, &values);
                let improved = match &self.best {
                    Some((_, Some(best))) => value < *best,
                    Some((_, None)) | None => true,
                };
                if improved {
                    self.best = Some((values, Some(value)));
                }
            }
            None => {
                self.best = Some((values, None));
                self.satisfied = true;
            }
        }
    }

    /// Propagates to a fixpoint. Returns false on conflict.
    fn propagate(&self, domains: &mut Domains) -> bool {
        loop {
            let mut changed = false;

            // Incumbent bounding: the next solution must strictly improve.
            if let (Some(obj), Some((_, Some(best)))) = (self.model.objective(), &self.best) {
                match tighten_le(obj, best - 1, domains) {
                    None => return false,
                    Some(c) => changed |= c,
                }
            }

            for constraint in self.model.linears() {
                match propagate_linear(constraint, domains) {
                    None => return false,
                    Some(c) => changed |= c,
                }
            }

            for lits in self.model.disjunctions() {
                match propagate_disjunction(lits, domains) {
                    None => return false,
                    Some(c) => changed |= c,
                }
            }

            if !changed {
                return true;
            }
        }
    }
}

/// Propagates one guarded linear constraint.
/// Returns None on conflict, otherwise whether any domain changed.
fn propagate_linear(constraint: &Constraint, domains: &mut Domains) -> Option<bool> {
    let mut pending: Option<Lit> = None;
    let mut pending_count = 0usize;
    for &guard in constraint.guards() {
        match lit_state(guard, domains) {
            Some(true) => {}
            // A false guard deactivates the constraint entirely.
            Some(false) => return Some(false),
            None => {
                pending = Some(guard);
                pending_count += 1;
            }
        }
    }

    if pending_count == 0 {
        // All guards hold: enforce.
        return match constraint.rel() {
            Rel::Le => tighten_le(constraint.expr(), 0, domains),
            Rel::Eq => {
                let a = tighten_le(constraint.expr(), 0, domains)?;
                let b = tighten_ge(constraint.expr(), 0, domains)?;
                Some(a | b)
            }
            Rel::Ne => prune_ne(constraint.expr(), domains),
        };
    }

    // Guards not settled: if the relation cannot hold under the current
    // domains, the guard conjunction must fail. With a single unfixed guard
    // that pins it false.
    if pending_count == 1 && impossible(constraint.expr(), constraint.rel(), domains) {
        let lit = pending?;
        return fix_lit(lit, false, domains).map(|_| true);
    }
    Some(false)
}

fn propagate_disjunction(lits: &[Lit], domains: &mut Domains) -> Option<bool> {
    let mut pending: Option<Lit> = None;
    let mut pending_count = 0usize;
    for &lit in lits {
        match lit_state(lit, domains) {
            Some(true) => return Some(false),
            Some(false) => {}
            None => {
                pending = Some(lit);
                pending_count += 1;
            }
        }
    }
    match pending_count {
        0 => None,
        1 => {
            let lit = pending?;
            fix_lit(lit, true, domains).map(|_| true)
        }
        _ => Some(false),
    }
}

fn pick_var(domains: &Domains) -> Option<usize> {
    let mut best: Option<(i64, usize)> = None;
    for (v, &(lo, hi)) in domains.iter().enumerate() {
        if lo < hi {
            let span = hi - lo;
            if best.map_or(true, |(s, _)| span < s) {
                best = Some((span, v));
            }
        }
    }
    best.map(|(_, v)| v)
}

fn eval(expr: &LinExpr, values: &[i64]) -> i64 {
    expr.iter_terms().map(|(c, v)| c * values[v]).sum::<i64>() + expr.offset()
}

fn expr_min(expr: &LinExpr, domains: &Domains) -> i64 {
    expr.iter_terms()
        .map(|(c, v)| {
            let (lo, hi) = domains[v];
            if c > 0 {
                c * lo
            } else {
                c * hi
            }
        })
        .sum::<i64>()
        + expr.offset()
}

fn expr_max(expr: &LinExpr, domains: &Domains) -> i64 {
    expr.iter_terms()
        .map(|(c, v)| {
            let (lo, hi) = domains[v];
            if c > 0 {
                c * hi
            } else {
                c * lo
            }
        })
        .sum::<i64>()
        + expr.offset()
}

/// Returns true if the relation cannot hold for any values in the domains.
fn impossible(expr: &LinExpr, rel: Rel, domains: &Domains) -> bool {
    match rel {
        Rel::Le => expr_min(expr, domains) > 0,
        Rel::Eq => {
            let (min, max) = (expr_min(expr, domains), expr_max(expr, domains));
            min > 0 || max < 0
        }
        Rel::Ne => {
            let (min, max) = (expr_min(expr, domains), expr_max(expr, domains));
            min == 0 && max == 0
        }
    }
}

/// Enforces `expr <= bound`, tightening the bounds of its variables.
/// Returns None on conflict, otherwise whether any domain changed.
fn tighten_le(expr: &LinExpr, bound: i64, domains: &mut Domains) -> Option<bool> {
    let min = expr_min(expr, domains);
    if min > bound {
        return None;
    }
    let mut changed = false;
    for (c, v) in expr.iter_terms() {
        let (lo, hi) = domains[v];
        let contrib = if c > 0 { c * lo } else { c * hi };
        // Minimum of the remaining terms; `c * v` may use up the rest.
        let cap = bound - (min - contrib);
        if c > 0 {
            let new_hi = div_floor(cap, c);
            if new_hi < hi {
                if new_hi < lo {
                    return None;
                }
                domains[v] = (lo, new_hi);
                changed = true;
            }
        } else {
            let new_lo = div_ceil(cap, c);
            if new_lo > lo {
                if new_lo > hi {
                    return None;
                }
                domains[v] = (new_lo, hi);
                changed = true;
            }
        }
    }
    Some(changed)
}

/// Enforces `expr >= bound`.
fn tighten_ge(expr: &LinExpr, bound: i64, domains: &mut Domains) -> Option<bool> {
    let max = expr_max(expr, domains);
    if max < bound {
        return None;
    }
    let mut changed = false;
    for (c, v) in expr.iter_terms() {
        let (lo, hi) = domains[v];
        let contrib = if c > 0 { c * hi } else { c * lo };
        let need = bound - (max - contrib);
        if c > 0 {
            let new_lo = div_ceil(need, c);
            if new_lo > lo {
                if new_lo > hi {
                    return None;
                }
                domains[v] = (new_lo, hi);
                changed = true;
            }
        } else {
            let new_hi = div_floor(need, c);
            if new_hi < hi {
                if new_hi < lo {
                    return None;
                }
                domains[v] = (lo, new_hi);
                changed = true;
            }
        }
    }
    Some(changed)
}

/// Enforces `expr != 0` by endpoint pruning once a single variable is left.
fn prune_ne(expr: &LinExpr, domains: &mut Domains) -> Option<bool> {
    let (min, max) = (expr_min(expr, domains), expr_max(expr, domains));
    if min == 0 && max == 0 {
        return None;
    }
    if min > 0 || max < 0 {
        return Some(false);
    }

    let mut unfixed: Option<(i64, usize)> = None;
    let mut rest = expr.offset();
    for (c, v) in expr.iter_terms() {
        let (lo, hi) = domains[v];
        if lo == hi {
            rest += c * lo;
        } else if unfixed.is_some() {
            // Two or more free variables: nothing to prune yet.
            return Some(false);
        } else {
            unfixed = Some((c, v));
        }
    }

    let Some((c, v)) = unfixed else {
        // Fully fixed; the zero case was already handled above.
        return Some(false);
    };
    if (-rest) % c != 0 {
        return Some(false);
    }
    let forbidden = (-rest) / c;
    let (lo, hi) = domains[v];
    if forbidden == lo {
        if lo + 1 > hi {
            return None;
        }
        domains[v] = (lo + 1, hi);
        return Some(true);
    }
    if forbidden == hi {
        if hi - 1 < lo {
            return None;
        }
        domains[v] = (lo, hi - 1);
        return Some(true);
    }
    Some(false)
}

/// Truth state of a literal: fixed true/false, or None while undecided.
fn lit_state(lit: Lit, domains: &Domains) -> Option<bool> {
    let (lo, hi) = domains[lit.index()];
    if lo == hi {
        Some(lo == lit.target())
    } else {
        None
    }
}

fn fix_lit(lit: Lit, value: bool, domains: &mut Domains) -> Option<()> {
    let target = if value { lit.target() } else { 1 - lit.target() };
    let (lo, hi) = domains[lit.index()];
    if target < lo || target > hi {
        return None;
    }
    domains[lit.index()] = (target, target);
    Some(())
}

fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && ((r < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}
