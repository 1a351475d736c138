//! Solver-independent mirror of the master LP.
//!
//! The master problem edits a `LinearProgram`; an `LpSolver` backend turns it
//! into a native model on every solve. Rows and variables are only ever
//! appended, so `RowId`/`VarId` stay valid for the whole run.

#[cfg(feature = "highs")]
mod highs_backend;
#[cfg(feature = "highs")]
pub use highs_backend::HighsSolver;

#[cfg(feature = "gurobi")]
mod gurobi_backend;
#[cfg(feature = "gurobi")]
pub use gurobi_backend::GurobiSolver;

use crate::SolveError;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct VarId(usize);
impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct RowId(usize);
impl RowId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VarKind {
    Continuous,
    Binary,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RowSense {
    Less,
    Equal,
}

#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
    pub cost: f64,
    pub lower: f64,
    pub upper: f64,
    /// Sparse column, at most one entry per row.
    pub coefficients: Vec<(RowId, f64)>,
}

#[derive(Clone, Debug)]
pub struct Row {
    pub name: String,
    pub sense: RowSense,
    pub rhs: f64,
}

/// Minimisation problem `min c'x  s.t.  Ax (<=|=) b,  l <= x <= u`.
#[derive(Clone, Debug, Default)]
pub struct LinearProgram {
    vars: Vec<Variable>,
    rows: Vec<Row>,
}

impl LinearProgram {
    pub fn new() -> Self {
        LinearProgram::default()
    }

    pub fn add_row(&mut self, name: &str, sense: RowSense, rhs: f64) -> RowId {
        self.rows.push(Row {
            name: name.to_string(),
            sense,
            rhs,
        });
        RowId(self.rows.len() - 1)
    }

    pub fn add_var<I>(&mut self, name: &str, kind: VarKind, cost: f64, lower: f64, upper: f64, coefficients: I) -> VarId
    where
        I: IntoIterator<Item = (RowId, f64)>,
    {
        let id = VarId(self.vars.len());
        self.vars.push(Variable {
            name: name.to_string(),
            kind,
            cost,
            lower,
            upper,
            coefficients: Vec::new(),
        });
        for (row, value) in coefficients {
            self.set_coefficient(row, id, value);
        }
        id
    }

    /// Overwrites the coefficient of `var` in `row`.
    pub fn set_coefficient(&mut self, row: RowId, var: VarId, value: f64) {
        let column = &mut self.vars[var.0].coefficients;
        match column.iter_mut().find(|(r, _)| *r == row) {
            Some(entry) => entry.1 = value,
            None => column.push((row, value)),
        }
    }

    pub fn coefficient(&self, row: RowId, var: VarId) -> f64 {
        self.vars[var.0]
            .coefficients
            .iter()
            .find(|(r, _)| *r == row)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    pub fn set_kind(&mut self, var: VarId, kind: VarKind) {
        self.vars[var.0].kind = kind;
    }

    pub fn var(&self, var: VarId) -> &Variable {
        &self.vars[var.0]
    }

    pub fn row(&self, row: RowId) -> &Row {
        &self.rows[row.0]
    }

    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_integral(&self) -> bool {
        self.vars.iter().any(|v| v.kind == VarKind::Binary)
    }

    pub fn objective_of(&self, values: &[f64]) -> f64 {
        self.vars.iter().zip(values).map(|(v, x)| v.cost * x).sum()
    }
}

#[derive(Clone, Debug)]
pub struct LpSolution {
    pub objective: f64,
    pub values: Vec<f64>,
    /// Row duals; only present for a continuous model.
    pub duals: Option<Vec<f64>>,
}

impl LpSolution {
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.0]
    }

    pub fn dual(&self, row: RowId) -> Option<f64> {
        self.duals.as_ref().map(|d| d[row.0])
    }
}

#[derive(Clone, Debug)]
pub enum SolveOutcome {
    Optimal(LpSolution),
    Infeasible,
    /// Anything else the solver reports (unbounded, limits, numerical trouble).
    NotOptimal(String),
}

/// Boundary to the numeric solver. Binary variables make it a MIP, otherwise
/// the backend must return row duals.
pub trait LpSolver {
    fn name(&self) -> &'static str;

    fn solve(&self, program: &LinearProgram) -> Result<SolveOutcome, SolveError>;
}

impl<T: LpSolver + ?Sized> LpSolver for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, program: &LinearProgram) -> Result<SolveOutcome, SolveError> {
        (**self).solve(program)
    }
}

impl<T: LpSolver + ?Sized> LpSolver for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, program: &LinearProgram) -> Result<SolveOutcome, SolveError> {
        (**self).solve(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficients_are_overwritten_not_accumulated() {
        let mut lp = LinearProgram::new();
        let row = lp.add_row("r", RowSense::Less, 10.0);
        let var = lp.add_var("x", VarKind::Continuous, 1.0, 0.0, 1.0, [(row, 2.0)]);
        lp.set_coefficient(row, var, 3.0);

        assert_eq!(lp.coefficient(row, var), 3.0);
        assert_eq!(lp.var(var).coefficients.len(), 1);
        assert_eq!(lp.var(var).coefficients, vec![(row, 3.0)]);
    }

    #[test]
    fn integral_once_any_var_is_binary() {
        let mut lp = LinearProgram::new();
        let var = lp.add_var("x", VarKind::Continuous, 1.0, 0.0, 1.0, []);
        assert!(!lp.is_integral());
        lp.set_kind(var, VarKind::Binary);
        assert!(lp.is_integral());
    }
}
