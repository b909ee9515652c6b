//! Constraint model representation.
//!
//! A [`Model`] is a backend-neutral description of an integer optimization
//! problem: bounded integer variables, linear constraints that may be guarded
//! by boolean enforcement literals, boolean disjunctions, and at most one
//! linear minimization objective. Backends (the built-in branch-and-bound
//! solver, or a MILP translation) consume this representation; nothing in it
//! assumes a particular solver.
//!
//! Expressions are built with ordinary operators:
//!
//! ```rust
//! use scalepack_core::model::{Constraint, Model};
//!
//! let mut m = Model::new();
//! let x = m.new_int_var(0, 10);
//! let w = m.new_int_var(2, 5);
//! m.add(Constraint::le(x + w, 10));
//! m.minimize(x);
//! ```

use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

/// Handle to a bounded integer decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntVar(pub(crate) u32);

impl IntVar {
    /// Index of this variable in the model's variable table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a boolean decision variable (domain `{0, 1}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolVar(pub(crate) u32);

impl BoolVar {
    /// Index of this variable in the model's variable table.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The literal that is true when this variable is false.
    pub fn negated(self) -> Lit {
        Lit {
            index: self.0,
            negated: true,
        }
    }
}

/// A possibly-negated boolean variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit {
    index: u32,
    negated: bool,
}

impl Lit {
    /// Index of the underlying boolean variable.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Returns true if this literal is the negation of its variable.
    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// The variable value (0 or 1) under which this literal holds.
    pub fn target(self) -> i64 {
        if self.negated {
            0
        } else {
            1
        }
    }
}

impl From<BoolVar> for Lit {
    fn from(b: BoolVar) -> Self {
        Lit {
            index: b.0,
            negated: false,
        }
    }
}

/// A linear expression over model variables: `sum(coef * var) + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinExpr {
    terms: Vec<(i64, u32)>,
    constant: i64,
}

impl LinExpr {
    /// Iterates over the `(coefficient, variable index)` terms.
    pub fn iter_terms(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.terms.iter().map(|&(c, v)| (c, v as usize))
    }

    /// The constant offset of the expression.
    pub fn offset(&self) -> i64 {
        self.constant
    }

    /// Returns true if the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression against concrete variable values.
    pub fn value_in(&self, assignment: &Assignment) -> i64 {
        self.terms
            .iter()
            .map(|&(c, v)| c * assignment.values[v as usize])
            .sum::<i64>()
            + self.constant
    }

    /// Merges duplicate variable terms and drops zero coefficients.
    fn simplify(mut self) -> Self {
        self.terms.sort_by_key(|&(_, v)| v);
        let mut merged: Vec<(i64, u32)> = Vec::with_capacity(self.terms.len());
        for (c, v) in self.terms {
            match merged.last_mut() {
                Some(last) if last.1 == v => last.0 += c,
                _ => merged.push((c, v)),
            }
        }
        merged.retain(|&(c, _)| c != 0);
        self.terms = merged;
        self
    }
}

impl From<i64> for LinExpr {
    fn from(c: i64) -> Self {
        LinExpr {
            terms: Vec::new(),
            constant: c,
        }
    }
}

impl From<IntVar> for LinExpr {
    fn from(v: IntVar) -> Self {
        LinExpr {
            terms: vec![(1, v.0)],
            constant: 0,
        }
    }
}

impl From<BoolVar> for LinExpr {
    fn from(b: BoolVar) -> Self {
        LinExpr {
            terms: vec![(1, b.0)],
            constant: 0,
        }
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        self + (-rhs.into())
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(mut self) -> LinExpr {
        for term in &mut self.terms {
            term.0 = -term.0;
        }
        self.constant = -self.constant;
        self
    }
}

impl<T: Into<LinExpr>> Add<T> for IntVar {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<T: Into<LinExpr>> Sub<T> for IntVar {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Sub<IntVar> for i64 {
    type Output = LinExpr;

    fn sub(self, rhs: IntVar) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Sub<LinExpr> for i64 {
    type Output = LinExpr;

    fn sub(self, rhs: LinExpr) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Add<IntVar> for i64 {
    type Output = LinExpr;

    fn add(self, rhs: IntVar) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl Sum<LinExpr> for LinExpr {
    fn sum<I: Iterator<Item = LinExpr>>(iter: I) -> LinExpr {
        iter.fold(LinExpr::default(), |acc, e| acc + e)
    }
}

/// Comparison relation of a linear constraint against zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rel {
    /// `expr <= 0`
    Le,
    /// `expr == 0`
    Eq,
    /// `expr != 0`
    Ne,
}

/// A linear constraint, optionally guarded by enforcement literals.
///
/// The constraint is normalized to `expr REL 0`. When guards are present the
/// constraint only has to hold if every guard literal is true (the guards are
/// not reified: a false guard says nothing about the relation).
#[derive(Debug, Clone)]
pub struct Constraint {
    expr: LinExpr,
    rel: Rel,
    guards: Vec<Lit>,
}

impl Constraint {
    /// `lhs <= rhs`
    pub fn le(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Self {
        Self {
            expr: (lhs.into() - rhs.into()).simplify(),
            rel: Rel::Le,
            guards: Vec::new(),
        }
    }

    /// `lhs == rhs`
    pub fn eq(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Self {
        Self {
            expr: (lhs.into() - rhs.into()).simplify(),
            rel: Rel::Eq,
            guards: Vec::new(),
        }
    }

    /// `lhs != rhs`
    pub fn ne(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Self {
        Self {
            expr: (lhs.into() - rhs.into()).simplify(),
            rel: Rel::Ne,
            guards: Vec::new(),
        }
    }

    /// Enforce this constraint only when the given literal is true.
    ///
    /// May be called repeatedly; all literals must hold for the constraint
    /// to be enforced.
    pub fn only_if(mut self, lit: impl Into<Lit>) -> Self {
        self.guards.push(lit.into());
        self
    }

    /// The normalized left-hand expression (compared against zero).
    pub fn expr(&self) -> &LinExpr {
        &self.expr
    }

    /// The comparison relation.
    pub fn rel(&self) -> Rel {
        self.rel
    }

    /// The enforcement literals.
    pub fn guards(&self) -> &[Lit] {
        &self.guards
    }
}

/// Concrete values for every variable of a model, produced by a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<i64>,
}

impl Assignment {
    /// Wraps a value-per-variable vector (indexed by variable index).
    pub fn from_values(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Number of variables covered.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no variables are covered.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of an integer variable.
    pub fn value(&self, v: IntVar) -> i64 {
        self.values[v.index()]
    }

    /// Value of a boolean variable.
    pub fn bool_value(&self, b: BoolVar) -> bool {
        self.values[b.index()] != 0
    }

    /// Returns true if the literal holds under this assignment.
    pub fn lit_holds(&self, lit: Lit) -> bool {
        self.values[lit.index()] == lit.target()
    }
}

/// A constraint optimization model.
#[derive(Debug, Clone, Default)]
pub struct Model {
    bounds: Vec<(i64, i64)>,
    is_bool: Vec<bool>,
    linears: Vec<Constraint>,
    disjunctions: Vec<Vec<Lit>>,
    objective: Option<LinExpr>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an integer variable with inclusive bounds `[lo, hi]`.
    ///
    /// An empty domain (`lo > hi`) is allowed and makes the model
    /// trivially infeasible.
    pub fn new_int_var(&mut self, lo: i64, hi: i64) -> IntVar {
        let index = self.bounds.len() as u32;
        self.bounds.push((lo, hi));
        self.is_bool.push(false);
        IntVar(index)
    }

    /// Declares a boolean variable.
    pub fn new_bool_var(&mut self) -> BoolVar {
        let index = self.bounds.len() as u32;
        self.bounds.push((0, 1));
        self.is_bool.push(true);
        BoolVar(index)
    }

    /// Adds a linear constraint.
    pub fn add(&mut self, constraint: Constraint) {
        self.linears.push(constraint);
    }

    /// Requires at least one of the given literals to hold.
    pub fn add_bool_or(&mut self, lits: impl IntoIterator<Item = Lit>) {
        self.disjunctions.push(lits.into_iter().collect());
    }

    /// Installs the minimization objective, replacing any previous one.
    pub fn minimize(&mut self, expr: impl Into<LinExpr>) {
        self.objective = Some(expr.into().simplify());
    }

    /// Number of declared variables.
    pub fn num_vars(&self) -> usize {
        self.bounds.len()
    }

    /// Declared bounds of a variable.
    pub fn var_bounds(&self, index: usize) -> (i64, i64) {
        self.bounds[index]
    }

    /// Returns true if the variable was declared boolean.
    pub fn is_bool_var(&self, index: usize) -> bool {
        self.is_bool[index]
    }

    /// The linear constraints.
    pub fn linears(&self) -> &[Constraint] {
        &self.linears
    }

    /// The boolean disjunctions.
    pub fn disjunctions(&self) -> &[Vec<Lit>] {
        &self.disjunctions
    }

    /// The minimization objective, if any.
    pub fn objective(&self) -> Option<&LinExpr> {
        self.objective.as_ref()
    }

    /// Bounds of an expression with respect to the declared variable bounds.
    pub fn expr_bounds(&self, expr: &LinExpr) -> (i64, i64) {
        let mut min = expr.offset();
        let mut max = expr.offset();
        for (c, v) in expr.iter_terms() {
            let (lo, hi) = self.bounds[v];
            if c > 0 {
                min += c * lo;
                max += c * hi;
            } else {
                min += c * hi;
                max += c * lo;
            }
        }
        (min, max)
    }
}
