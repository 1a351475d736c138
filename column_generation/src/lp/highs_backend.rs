use highs::{ColProblem, HighsModelStatus, Sense};

use crate::lp::{LinearProgram, LpSolution, LpSolver, RowSense, SolveOutcome, VarKind};
use crate::SolveError;

/// HiGHS via the `highs` crate. The model is rebuilt column-wise on every
/// solve; HiGHS row duals follow `c - A'y = reduced cost`.
#[derive(Debug, Clone)]
pub struct HighsSolver {
    pub verbose: bool,
    pub threads: i32,
}

impl Default for HighsSolver {
    fn default() -> Self {
        HighsSolver {
            verbose: false,
            threads: 1,
        }
    }
}

impl LpSolver for HighsSolver {
    fn name(&self) -> &'static str {
        "HiGHS"
    }

    fn solve(&self, program: &LinearProgram) -> Result<SolveOutcome, SolveError> {
        let mut problem = ColProblem::default();

        let rows: Vec<highs::Row> = program
            .rows()
            .iter()
            .map(|row| match row.sense {
                RowSense::Less => problem.add_row(..=row.rhs),
                RowSense::Equal => problem.add_row(row.rhs..=row.rhs),
            })
            .collect();

        for var in program.vars() {
            let factors: Vec<(highs::Row, f64)> = var
                .coefficients
                .iter()
                .map(|(row, value)| (rows[row.index()], *value))
                .collect();
            match var.kind {
                VarKind::Continuous => problem.add_column(var.cost, var.lower..=var.upper, &factors),
                VarKind::Binary => problem.add_integer_column(var.cost, var.lower..=var.upper, &factors),
            }
        }

        let integral = program.is_integral();
        let mut model = problem.optimise(Sense::Minimise);
        if !self.verbose {
            model.make_quiet();
        }
        model.set_option("threads", self.threads);
        if integral {
            model.set_option("mip_rel_gap", 0.0);
        }

        let solved = model.solve();
        match solved.status() {
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => {
                let solution = solved.get_solution();
                let values = solution.columns().to_vec();
                let duals = if integral {
                    None
                } else {
                    Some(solution.dual_rows().to_vec())
                };

                Ok(SolveOutcome::Optimal(LpSolution {
                    objective: program.objective_of(&values),
                    values,
                    duals,
                }))
            }
            HighsModelStatus::Infeasible => Ok(SolveOutcome::Infeasible),
            other => Ok(SolveOutcome::NotOptimal(format!("{:?}", other))),
        }
    }
}
