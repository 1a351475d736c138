use grb::prelude::*;

use crate::lp::{LinearProgram, LpSolution, LpSolver, RowSense, SolveOutcome, VarKind};
use crate::SolveError;

pub struct GurobiSolver {
    env: Env,
}

impl GurobiSolver {
    pub fn new() -> Result<Self, SolveError> {
        let mut env = Env::new("")?;
        env.set(param::OutputFlag, 0)?;
        env.set(param::Threads, 1)?;
        env.set(param::Seed, 12345)?;
        Ok(GurobiSolver { env })
    }
}

impl LpSolver for GurobiSolver {
    fn name(&self) -> &'static str {
        "Gurobi"
    }

    fn solve(&self, program: &LinearProgram) -> Result<SolveOutcome, SolveError> {
        let mut model = Model::with_env("master", &self.env)?;

        let mut constrs = Vec::with_capacity(program.rows().len());
        for row in program.rows() {
            let constr = match row.sense {
                RowSense::Less => model.add_constr(&row.name, c!(Expr::default() <= row.rhs))?,
                RowSense::Equal => model.add_constr(&row.name, c!(Expr::default() == row.rhs))?,
            };
            constrs.push(constr);
        }

        let mut vars = Vec::with_capacity(program.vars().len());
        for var in program.vars() {
            let vtype = match var.kind {
                VarKind::Continuous => Continuous,
                VarKind::Binary => Binary,
            };
            let column: Vec<(Constr, f64)> = var
                .coefficients
                .iter()
                .map(|(row, value)| (constrs[row.index()], *value))
                .collect();
            vars.push(model.add_var(&var.name, vtype, var.cost, var.lower, var.upper, column)?);
        }

        model.update()?;
        model.optimize()?;

        match model.status()? {
            Status::Optimal => {
                let values = model.get_obj_attr_batch(attr::X, vars)?;
                let duals = if program.is_integral() {
                    None
                } else {
                    Some(model.get_obj_attr_batch(attr::Pi, constrs)?)
                };

                Ok(SolveOutcome::Optimal(LpSolution {
                    objective: model.get_attr(attr::ObjVal)?,
                    values,
                    duals,
                }))
            }
            Status::Infeasible => Ok(SolveOutcome::Infeasible),
            other => Ok(SolveOutcome::NotOptimal(format!("{:?}", other))),
        }
    }
}
