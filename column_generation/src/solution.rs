use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use itertools::Itertools;
use log::warn;
use shared::{Facility, Month, ProblemData};

use crate::master::MasterProblem;
use crate::{SolveError, CG_EPSILON};

/// Network design read from a solved integral master.
#[derive(Clone, Debug)]
pub struct NetworkDesign {
    pub objective: f64,
    /// Relaxation objective after each master solve, in order.
    pub relaxation_history: Vec<f64>,
    /// Pricing calls made, the last one returning nothing unless stopped early.
    pub iterations: usize,
    pub columns_generated: usize,
    /// Per shipment, where it is handled. `None` while it sits on its slack.
    pub assignments: Vec<Option<Facility>>,
    /// Ids of the shipments left on their slack.
    pub unserved: Vec<usize>,
    /// Per shipment, sum of its covering row in the integral solution.
    pub coverage: Vec<f64>,
    pub open_warehouses: Vec<usize>,
    /// Assigned weight per (facility, month).
    pub loads: IndexMap<(Facility, Month), f64>,
}

impl NetworkDesign {
    pub fn from_master(
        problem: &ProblemData,
        master: &MasterProblem,
        relaxation_history: Vec<f64>,
        iterations: usize,
        columns_generated: usize,
    ) -> Result<NetworkDesign, SolveError> {
        let objective = master
            .solution()
            .map(|s| s.objective)
            .ok_or(SolveError::InvalidState {
                operation: "read the design",
                state: master.state(),
            })?;

        let unserved = master
            .unserved_shipments()?
            .into_iter()
            .map(|i| problem.shipments()[i].id)
            .collect_vec();
        if !unserved.is_empty() {
            warn!("{} shipments left on their slack: {:?}", unserved.len(), unserved);
        }

        let mut assignments = Vec::with_capacity(problem.shipments().len());
        let mut loads = IndexMap::new();
        for (shipment, route) in problem.shipments().iter().zip(master.assigned_routes()?) {
            let facility = route.map(|r| r.facility);
            if let Some(facility) = facility {
                *loads.entry((facility, shipment.month)).or_insert(0.0) += shipment.weight;
            }
            assignments.push(facility);
        }
        loads.sort_keys();

        Ok(NetworkDesign {
            objective,
            relaxation_history,
            iterations,
            columns_generated,
            assignments,
            unserved,
            coverage: master.coverage()?,
            open_warehouses: master.open_warehouses()?,
            loads,
        })
    }

    pub fn load(&self, facility: Facility, month: Month) -> f64 {
        self.loads.get(&(facility, month)).copied().unwrap_or(0.0)
    }

    pub fn is_open(&self, warehouse: usize) -> bool {
        self.open_warehouses.contains(&warehouse)
    }

    pub fn shipments_at(&self, facility: Facility) -> usize {
        self.assignments.iter().filter(|f| **f == Some(facility)).count()
    }

    pub fn is_complete(&self) -> bool {
        self.unserved.is_empty()
    }
}

/// How a run ended, for reporting.
#[derive(Clone, Debug, PartialEq)]
pub enum TerminalStatus {
    Success(f64),
    /// Solved, but some shipments stayed on their slack.
    Partial { objective: f64, unserved: usize },
    Infeasible,
    SolverError(String),
}

impl TerminalStatus {
    pub fn of(result: &Result<NetworkDesign, SolveError>) -> TerminalStatus {
        match result {
            Ok(design) if design.is_complete() => TerminalStatus::Success(design.objective),
            Ok(design) => TerminalStatus::Partial {
                objective: design.objective,
                unserved: design.unserved.len(),
            },
            Err(SolveError::Infeasible) => TerminalStatus::Infeasible,
            Err(e) => TerminalStatus::SolverError(e.to_string()),
        }
    }
}

impl Display for TerminalStatus {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            TerminalStatus::Success(objective) => write!(f, "SUCCESS {:.2}", objective),
            TerminalStatus::Partial { objective, unserved } => {
                write!(f, "PARTIAL {:.2} ({} shipments unserved)", objective, unserved)
            }
            TerminalStatus::Infeasible => f.write_str("INFEASIBLE"),
            TerminalStatus::SolverError(msg) => write!(f, "ERROR {}", msg),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    NotPartitioned { shipment: usize, coverage: f64 },
    OverCapacity { facility: Facility, month: Month, load: f64, capacity: f64 },
    ClosedWarehouseUsed { warehouse: usize, month: Month, load: f64 },
    UnknownFacility(Facility),
}

/// Re-checks a design against the data it was computed from: every shipment
/// covered exactly once, no (facility, month) over capacity, nothing routed
/// through a closed warehouse.
pub fn check_feasibility(problem: &ProblemData, design: &NetworkDesign) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (shipment, coverage) in problem.shipments().iter().zip(&design.coverage) {
        if (coverage - 1.0).abs() > CG_EPSILON {
            violations.push(Violation::NotPartitioned {
                shipment: shipment.id,
                coverage: *coverage,
            });
        }
    }

    for ((facility, month), load) in &design.loads {
        let capacity = match facility {
            Facility::Site(index) => problem.sites().get(*index).map(|s| s.capacity),
            Facility::Warehouse(index) => problem.warehouses().get(*index).map(|w| w.capacity),
        };
        let capacity = match capacity {
            Some(capacity) => capacity,
            None => {
                violations.push(Violation::UnknownFacility(*facility));
                continue;
            }
        };

        if let Facility::Warehouse(index) = facility {
            if !design.is_open(*index) && *load > CG_EPSILON {
                violations.push(Violation::ClosedWarehouseUsed {
                    warehouse: *index,
                    month: *month,
                    load: *load,
                });
                continue;
            }
        }

        if *load > capacity + CG_EPSILON {
            violations.push(Violation::OverCapacity {
                facility: *facility,
                month: *month,
                load: *load,
                capacity,
            });
        }
    }

    violations
}
