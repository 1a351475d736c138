#![deny(clippy::all)]
#![allow(clippy::type_complexity)]

pub mod lp;

mod error;
pub use error::SolveError;

mod duals;
pub use duals::DualPrices;

mod route_pool;
pub use route_pool::{Route, RoutePool};

pub mod master;
pub use master::{MasterProblem, MasterState, RelaxationResult};

pub mod pricing;
pub use pricing::{Candidate, PricingEngine};

mod controller;
pub use controller::ColumnGeneration;

mod exact;
pub use exact::ExactFormulation;

mod solution;
pub use solution::{check_feasibility, NetworkDesign, TerminalStatus, Violation};

#[cfg(feature = "perf_statistics")]
mod metrics;

#[cfg(not(any(feature = "highs", feature = "gurobi")))]
compile_error!("enable at least one solver backend: `highs` or `gurobi`");

/// Reduced costs must be below `-CG_EPSILON` to count as improving.
pub const CG_EPSILON: f64 = 1e-5_f64;

/// Gurobi when compiled in, HiGHS otherwise.
pub fn default_solver() -> Result<Box<dyn lp::LpSolver>, SolveError> {
    #[cfg(feature = "gurobi")]
    {
        Ok(Box::new(lp::GurobiSolver::new()?))
    }
    #[cfg(all(feature = "highs", not(feature = "gurobi")))]
    {
        Ok(Box::new(lp::HighsSolver::default()))
    }
}
