use std::error::Error;
use std::fmt::{Display, Formatter};

use shared::Facility;

use crate::master::MasterState;

#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The solver proved the model infeasible.
    Infeasible,
    /// The solver stopped without an optimal solution.
    NotOptimal(String),
    /// The solver backend itself failed.
    Solver(String),
    /// An optimal relaxation came back without row duals.
    MissingDuals,
    InvalidState { operation: &'static str, state: MasterState },
    DuplicateColumn { shipment: usize, facility: Facility },
    UnknownShipment(usize),
    UnknownFacility(Facility),
}

impl Display for SolveError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            SolveError::Infeasible => f.write_str("model is infeasible"),
            SolveError::NotOptimal(status) => write!(f, "solver finished without optimum ({})", status),
            SolveError::Solver(msg) => write!(f, "solver error: {}", msg),
            SolveError::MissingDuals => f.write_str("relaxation solved but no dual prices available"),
            SolveError::InvalidState { operation, state } => {
                write!(f, "cannot {} while master problem is {:?}", operation, state)
            }
            SolveError::DuplicateColumn { shipment, facility } => {
                write!(f, "column for shipment {} at {} was already added", shipment, facility)
            }
            SolveError::UnknownShipment(index) => write!(f, "unknown shipment index {}", index),
            SolveError::UnknownFacility(facility) => write!(f, "unknown facility {}", facility),
        }
    }
}

impl Error for SolveError {}

#[cfg(feature = "gurobi")]
impl From<grb::Error> for SolveError {
    fn from(e: grb::Error) -> Self {
        SolveError::Solver(e.to_string())
    }
}
