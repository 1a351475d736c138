use log::info;
use shared::ProblemData;

use crate::lp::LpSolver;
use crate::master::MasterProblem;
use crate::pricing::PricingEngine;
use crate::solution::NetworkDesign;
use crate::SolveError;

/// The full formulation with every priced route as a column, solved as one
/// MIP. Used to cross-check column generation on small instances.
pub struct ExactFormulation<'a, S: LpSolver> {
    problem: &'a ProblemData,
    solver: S,
}

impl<'a, S: LpSolver> ExactFormulation<'a, S> {
    pub fn new(problem: &'a ProblemData, solver: S) -> Self {
        ExactFormulation { problem, solver }
    }

    pub fn solve(&self) -> Result<NetworkDesign, SolveError> {
        let mut master = MasterProblem::new(self.problem);
        let mut pricing = PricingEngine::new(self.problem);

        let routes = pricing.enumerate_all();
        info!("Full formulation with {} routes", routes.len());
        master.add_columns(&routes)?;

        master.finalize_integral(&self.solver)?;
        NetworkDesign::from_master(self.problem, &master, Vec::new(), 0, routes.len())
    }
}
