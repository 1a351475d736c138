use std::time::Instant;

use log::{debug, info, warn};
use shared::ProblemData;

use crate::lp::LpSolver;
use crate::master::MasterProblem;
use crate::pricing::PricingEngine;
use crate::solution::NetworkDesign;
use crate::{SolveError, CG_EPSILON};

/// Alternates master relaxation and pricing until pricing finds nothing,
/// then solves the master once more with binary routes and warehouses.
pub struct ColumnGeneration<'a, S: LpSolver> {
    problem: &'a ProblemData,
    solver: S,
    max_iterations: Option<usize>,
}

impl<'a, S: LpSolver> ColumnGeneration<'a, S> {
    pub fn new(problem: &'a ProblemData, solver: S) -> Self {
        ColumnGeneration {
            problem,
            solver,
            max_iterations: problem.config().max_iterations,
        }
    }

    /// Stops pricing after this many calls even if improving routes remain.
    /// The integral solve then runs on whatever columns exist.
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn solve(&self) -> Result<NetworkDesign, SolveError> {
        let start = Instant::now();
        let mut master = MasterProblem::new(self.problem);
        let mut pricing = PricingEngine::new(self.problem);

        let mut history: Vec<f64> = Vec::new();
        let mut iterations = 0;

        loop {
            let relaxation = master.solve_relaxation(&self.solver)?;

            if let Some(previous) = history.last() {
                if relaxation.objective > previous + CG_EPSILON * previous.abs().max(1.0) {
                    warn!(
                        "Relaxation objective rose from {:.4} to {:.4}",
                        previous, relaxation.objective
                    );
                }
            }
            history.push(relaxation.objective);

            let routes = pricing.find(&relaxation.duals);
            iterations += 1;
            info!(
                "Iteration {:>4}: relaxation {:>14.2}, {:>5} new routes, {:>6} total",
                iterations,
                relaxation.objective,
                routes.len(),
                pricing.num_columns()
            );

            if routes.is_empty() {
                debug!("No improving routes left");
                break;
            }
            master.add_columns(&routes)?;

            if let Some(max) = self.max_iterations {
                if iterations >= max {
                    warn!("Stopped pricing after {} iterations without convergence", iterations);
                    break;
                }
            }
        }

        let objective = master.finalize_integral(&self.solver)?;
        info!(
            "Integral objective {:.2} after {} iterations in {:.2}s using {}",
            objective,
            iterations,
            start.elapsed().as_secs_f64(),
            self.solver.name()
        );

        NetworkDesign::from_master(self.problem, &master, history, iterations, pricing.num_columns())
    }
}
