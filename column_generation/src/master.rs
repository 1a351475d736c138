use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, trace};
use ndarray::Array2;
use shared::{month_index, CustomHashSet, Facility, Month, ProblemData, MONTHS_PER_YEAR};

use crate::duals::DualPrices;
use crate::lp::{LinearProgram, LpSolution, LpSolver, RowId, RowSense, SolveOutcome, VarId, VarKind};
use crate::route_pool::Route;
use crate::SolveError;

#[cfg(feature = "perf_statistics")]
use crate::metrics::*;

/// Values above this count as "chosen" in an integral solution.
const INTEGRAL_THRESHOLD: f64 = 0.5;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MasterState {
    RelaxationBuilt,
    RelaxationSolved,
    ColumnsAdded,
    IntegralSolved,
}

#[derive(Clone, Debug)]
pub struct RelaxationResult {
    pub objective: f64,
    pub duals: DualPrices,
}

/// Restricted master problem.
///
/// One equality row per shipment, covered by a big-M slack until a real
/// route takes over; one capacity row per (site, month) and per
/// (warehouse, month), the latter linked to the warehouse's open variable.
pub struct MasterProblem<'a> {
    problem: &'a ProblemData,
    program: LinearProgram,
    state: MasterState,

    covering: Vec<RowId>,
    slack_vars: Vec<VarId>,
    site_capacity: Array2<RowId>,
    warehouse_capacity: Array2<RowId>,
    open_vars: Vec<VarId>,

    columns: IndexMap<(usize, Facility), (VarId, Route)>,
    solution: Option<LpSolution>,
}

impl<'a> MasterProblem<'a> {
    pub fn new(problem: &'a ProblemData) -> MasterProblem<'a> {
        let mut program = LinearProgram::new();
        let big_m = problem.config().big_m;

        let mut covering = Vec::with_capacity(problem.shipments().len());
        let mut slack_vars = Vec::with_capacity(problem.shipments().len());
        for shipment in problem.shipments() {
            let row = program.add_row(&format!("cover[{}]", shipment.id), RowSense::Equal, 1.0);
            let slack = program.add_var(
                &format!("slack[{}]", shipment.id),
                VarKind::Continuous,
                big_m,
                0.0,
                1.0,
                [(row, 1.0)],
            );
            covering.push(row);
            slack_vars.push(slack);
        }

        let sites = problem.sites();
        let site_capacity = Array2::from_shape_fn((sites.len(), MONTHS_PER_YEAR), |(s, m)| {
            program.add_row(
                &format!("siteCapacity[{},{}]", sites[s].code, m + 1),
                RowSense::Less,
                sites[s].capacity,
            )
        });

        let warehouses = problem.warehouses();
        let warehouse_capacity = Array2::from_shape_fn((warehouses.len(), MONTHS_PER_YEAR), |(w, m)| {
            program.add_row(
                &format!("warehouseCapacity[{},{}]", warehouses[w].code, m + 1),
                RowSense::Less,
                0.0,
            )
        });

        let open_vars = warehouses
            .iter()
            .map(|warehouse| {
                let linking = warehouse_capacity
                    .row(warehouse.index)
                    .iter()
                    .map(|row| (*row, -warehouse.capacity))
                    .collect_vec();
                program.add_var(
                    &format!("open[{}]", warehouse.code),
                    VarKind::Continuous,
                    warehouse.opening_cost,
                    0.0,
                    1.0,
                    linking,
                )
            })
            .collect();

        debug!(
            "Master built with {} covering rows, {} capacity rows",
            covering.len(),
            site_capacity.len() + warehouse_capacity.len()
        );

        MasterProblem {
            problem,
            program,
            state: MasterState::RelaxationBuilt,
            covering,
            slack_vars,
            site_capacity,
            warehouse_capacity,
            open_vars,
            columns: IndexMap::new(),
            solution: None,
        }
    }

    pub fn state(&self) -> MasterState {
        self.state
    }

    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn covering_row(&self, shipment: usize) -> Result<RowId, SolveError> {
        self.covering
            .get(shipment)
            .copied()
            .ok_or(SolveError::UnknownShipment(shipment))
    }

    pub fn capacity_row(&self, facility: Facility, month: Month) -> Result<RowId, SolveError> {
        let grid = match facility {
            Facility::Site(index) => self.site_capacity.get((index, month_index(month))),
            Facility::Warehouse(index) => self.warehouse_capacity.get((index, month_index(month))),
        };
        grid.copied().ok_or(SolveError::UnknownFacility(facility))
    }

    pub fn slack_var(&self, shipment: usize) -> Result<VarId, SolveError> {
        self.slack_vars
            .get(shipment)
            .copied()
            .ok_or(SolveError::UnknownShipment(shipment))
    }

    pub fn open_var(&self, warehouse: usize) -> Result<VarId, SolveError> {
        self.open_vars
            .get(warehouse)
            .copied()
            .ok_or(SolveError::UnknownFacility(Facility::Warehouse(warehouse)))
    }

    pub fn column(&self, shipment: usize, facility: Facility) -> Option<VarId> {
        self.columns.get(&(shipment, facility)).map(|(var, _)| *var)
    }

    pub fn solution(&self) -> Option<&LpSolution> {
        self.solution.as_ref()
    }

    /// Solves the continuous master and returns its objective together with
    /// the dual price of every covering and capacity row.
    pub fn solve_relaxation<S: LpSolver>(&mut self, solver: &S) -> Result<RelaxationResult, SolveError> {
        if self.state == MasterState::IntegralSolved {
            return Err(SolveError::InvalidState {
                operation: "solve the relaxation",
                state: self.state,
            });
        }

        #[cfg(feature = "perf_statistics")]
        LPS_SOLVED.mark();

        match solver.solve(&self.program)? {
            SolveOutcome::Optimal(solution) => {
                let duals = self.extract_duals(&solution)?;
                let objective = solution.objective;
                trace!("Relaxation solved by {} with objective {:.4}", solver.name(), objective);
                self.solution = Some(solution);
                self.state = MasterState::RelaxationSolved;
                Ok(RelaxationResult { objective, duals })
            }
            SolveOutcome::Infeasible => Err(SolveError::Infeasible),
            SolveOutcome::NotOptimal(status) => Err(SolveError::NotOptimal(status)),
        }
    }

    fn extract_duals(&self, solution: &LpSolution) -> Result<DualPrices, SolveError> {
        let duals = solution.duals.as_ref().ok_or(SolveError::MissingDuals)?;
        if duals.len() != self.program.rows().len() {
            return Err(SolveError::MissingDuals);
        }

        Ok(DualPrices {
            covering: self.covering.iter().map(|row| duals[row.index()]).collect(),
            site_capacity: self.site_capacity.map(|row| duals[row.index()]),
            warehouse_capacity: self.warehouse_capacity.map(|row| duals[row.index()]),
        })
    }

    /// Adds one variable per route: coefficient 1 in the shipment's covering
    /// row and the shipment's weight in the facility's capacity row for the
    /// shipment's month. The whole batch is rejected, with the master left
    /// untouched, if any route repeats a (shipment, facility) pair or refers
    /// to something the master does not know.
    pub fn add_columns(&mut self, routes: &[Route]) -> Result<usize, SolveError> {
        if self.state == MasterState::IntegralSolved {
            return Err(SolveError::InvalidState {
                operation: "add columns",
                state: self.state,
            });
        }

        let problem = self.problem;

        let mut batch = CustomHashSet::default();
        for route in routes {
            let shipment = problem
                .shipments()
                .get(route.shipment)
                .ok_or(SolveError::UnknownShipment(route.shipment))?;
            self.capacity_row(route.facility, shipment.month)?;
            let key = (route.shipment, route.facility);
            if self.columns.contains_key(&key) || !batch.insert(key) {
                return Err(SolveError::DuplicateColumn {
                    shipment: route.shipment,
                    facility: route.facility,
                });
            }
        }

        for route in routes {
            let shipment = &problem.shipments()[route.shipment];
            let cover = self.covering_row(route.shipment)?;
            let capacity = self.capacity_row(route.facility, shipment.month)?;
            let var = self.program.add_var(
                &format!("route[{},{}]", shipment.id, route.facility),
                VarKind::Continuous,
                route.cost,
                0.0,
                1.0,
                [(cover, 1.0), (capacity, shipment.weight)],
            );
            trace!("Added column {} with cost {:.2}", self.program.var(var).name, route.cost);
            self.columns.insert((route.shipment, route.facility), (var, route.clone()));
        }

        if !routes.is_empty() {
            self.state = MasterState::ColumnsAdded;
        }
        Ok(routes.len())
    }

    /// Turns route and open variables binary and solves the resulting MIP
    /// over the columns generated so far. Slack variables stay continuous.
    pub fn finalize_integral<S: LpSolver>(&mut self, solver: &S) -> Result<f64, SolveError> {
        if self.state == MasterState::IntegralSolved {
            return Err(SolveError::InvalidState {
                operation: "finalize",
                state: self.state,
            });
        }

        self.set_integral(VarKind::Binary);

        #[cfg(feature = "perf_statistics")]
        MIPS_SOLVED.mark();

        let outcome = match solver.solve(&self.program) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.set_integral(VarKind::Continuous);
                return Err(e);
            }
        };

        match outcome {
            SolveOutcome::Optimal(solution) => {
                let objective = solution.objective;
                debug!("Integral master solved with objective {:.4}", objective);
                self.solution = Some(solution);
                self.state = MasterState::IntegralSolved;
                Ok(objective)
            }
            SolveOutcome::Infeasible => {
                self.set_integral(VarKind::Continuous);
                Err(SolveError::Infeasible)
            }
            SolveOutcome::NotOptimal(status) => {
                self.set_integral(VarKind::Continuous);
                Err(SolveError::NotOptimal(status))
            }
        }
    }

    fn set_integral(&mut self, kind: VarKind) {
        let vars = self
            .columns
            .values()
            .map(|(var, _)| *var)
            .chain(self.open_vars.iter().copied())
            .collect_vec();
        for var in vars {
            self.program.set_kind(var, kind);
        }
    }

    fn current_solution(&self, operation: &'static str) -> Result<&LpSolution, SolveError> {
        self.solution.as_ref().ok_or(SolveError::InvalidState {
            operation,
            state: self.state,
        })
    }

    /// Sum of all variable values in each covering row of the last solution.
    pub fn coverage(&self) -> Result<Vec<f64>, SolveError> {
        let solution = self.current_solution("read coverage")?;
        let mut coverage = self
            .slack_vars
            .iter()
            .map(|var| solution.value(*var))
            .collect_vec();
        for ((shipment, _), (var, _)) in &self.columns {
            coverage[*shipment] += solution.value(*var);
        }
        Ok(coverage)
    }

    /// Per shipment the route chosen in the last solution, if any.
    pub fn assigned_routes(&self) -> Result<Vec<Option<&Route>>, SolveError> {
        let solution = self.current_solution("read assignments")?;
        let mut assigned = vec![None; self.covering.len()];
        for ((shipment, _), (var, route)) in &self.columns {
            if solution.value(*var) > INTEGRAL_THRESHOLD {
                assigned[*shipment] = Some(route);
            }
        }
        Ok(assigned)
    }

    pub fn open_warehouses(&self) -> Result<Vec<usize>, SolveError> {
        let solution = self.current_solution("read warehouses")?;
        Ok(self
            .open_vars
            .iter()
            .enumerate()
            .filter(|(_, var)| solution.value(**var) > INTEGRAL_THRESHOLD)
            .map(|(index, _)| index)
            .collect())
    }

    pub fn unserved_shipments(&self) -> Result<Vec<usize>, SolveError> {
        let solution = self.current_solution("read slack")?;
        Ok(self
            .slack_vars
            .iter()
            .enumerate()
            .filter(|(_, var)| solution.value(**var) > crate::CG_EPSILON)
            .map(|(index, _)| index)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Location, Planning, ProductionSite, RunConfig, Shipment, TariffTable, Warehouse};
    use std::cell::RefCell;

    fn problem() -> ProblemData {
        let shipments = vec![
            Shipment {
                id: 7,
                index: 0,
                month: 3,
                destination: Some(Location::new("DE", "10")),
                origin: "CH01".to_string(),
                weight: 400.0,
                is_hazardous: false,
                planning: Planning::Standard,
            },
            Shipment {
                id: 9,
                index: 1,
                month: 12,
                destination: None,
                origin: "CH01".to_string(),
                weight: 150.0,
                is_hazardous: true,
                planning: Planning::MakeToOrder,
            },
        ];
        let sites = vec![ProductionSite {
            code: "CH01".to_string(),
            index: 0,
            location: Location::new("CH", "40"),
            capacity: 1000.0,
        }];
        let warehouses = vec![Warehouse {
            code: "FR01".to_string(),
            index: 0,
            location: Location::new("FR", "74"),
            capacity: 5000.0,
            opening_cost: 250.0,
            shuttle_cost: None,
            inbound_cost: 0.0,
            outbound_cost: 0.0,
            hazardous_cost: 0.0,
            non_hazardous_cost: 0.0,
        }];
        ProblemData::new(shipments, sites, warehouses, TariffTable::default(), RunConfig::default())
    }

    /// Records the programs it is asked to solve and answers with a fixed outcome.
    struct ScriptedSolver {
        outcome: SolveOutcome,
        seen: RefCell<Vec<LinearProgram>>,
    }

    impl ScriptedSolver {
        fn new(outcome: SolveOutcome) -> Self {
            ScriptedSolver {
                outcome,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl LpSolver for ScriptedSolver {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn solve(&self, program: &LinearProgram) -> Result<SolveOutcome, SolveError> {
            self.seen.borrow_mut().push(program.clone());
            Ok(self.outcome.clone())
        }
    }

    fn route(shipment: usize, facility: Facility, cost: f64) -> Route {
        Route {
            shipment,
            facility,
            cost,
        }
    }

    #[test]
    fn initial_master_has_slack_and_capacity_rows() {
        let problem = problem();
        let master = MasterProblem::new(&problem);
        let lp = master.program();

        assert_eq!(master.state(), MasterState::RelaxationBuilt);
        // 2 covering + 12 site + 12 warehouse rows
        assert_eq!(lp.rows().len(), 2 + 12 + 12);
        // 2 slacks + 1 open variable
        assert_eq!(lp.vars().len(), 3);

        let slack = master.slack_var(1).unwrap();
        assert_eq!(lp.var(slack).cost, 1e5);
        assert_eq!(lp.var(slack).upper, 1.0);
        assert_eq!(lp.coefficient(master.covering_row(1).unwrap(), slack), 1.0);

        let site_row = master.capacity_row(Facility::Site(0), 5).unwrap();
        assert_eq!(lp.row(site_row).rhs, 1000.0);
        assert_eq!(lp.row(site_row).sense, RowSense::Less);

        let open = master.open_var(0).unwrap();
        let warehouse_row = master.capacity_row(Facility::Warehouse(0), 12).unwrap();
        assert_eq!(lp.row(warehouse_row).rhs, 0.0);
        assert_eq!(lp.coefficient(warehouse_row, open), -5000.0);
        assert_eq!(lp.var(open).cost, 250.0);
    }

    #[test]
    fn columns_enter_cover_and_capacity_of_their_month() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);

        let added = master
            .add_columns(&[route(0, Facility::Site(0), 80.0), route(1, Facility::Warehouse(0), 20.0)])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(master.state(), MasterState::ColumnsAdded);

        let lp = master.program();
        let direct = master.column(0, Facility::Site(0)).unwrap();
        assert_eq!(lp.coefficient(master.covering_row(0).unwrap(), direct), 1.0);
        assert_eq!(lp.coefficient(master.capacity_row(Facility::Site(0), 3).unwrap(), direct), 400.0);
        assert_eq!(lp.coefficient(master.capacity_row(Facility::Site(0), 4).unwrap(), direct), 0.0);

        let via_warehouse = master.column(1, Facility::Warehouse(0)).unwrap();
        assert_eq!(
            lp.coefficient(master.capacity_row(Facility::Warehouse(0), 12).unwrap(), via_warehouse),
            150.0
        );
        assert_eq!(lp.var(via_warehouse).cost, 20.0);
    }

    #[test]
    fn duplicate_in_batch_rejects_whole_batch() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);
        let vars_before = master.program().vars().len();

        let result = master.add_columns(&[
            route(1, Facility::Site(0), 10.0),
            route(0, Facility::Site(0), 80.0),
            route(0, Facility::Site(0), 81.0),
        ]);

        assert_eq!(
            result,
            Err(SolveError::DuplicateColumn {
                shipment: 0,
                facility: Facility::Site(0)
            })
        );
        assert_eq!(master.program().vars().len(), vars_before);
        assert_eq!(master.num_columns(), 0);
        assert_eq!(master.state(), MasterState::RelaxationBuilt);
    }

    #[test]
    fn column_already_in_master_is_rejected() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);
        master.add_columns(&[route(0, Facility::Site(0), 80.0)]).unwrap();

        assert!(matches!(
            master.add_columns(&[route(0, Facility::Site(0), 80.0)]),
            Err(SolveError::DuplicateColumn { .. })
        ));
        assert_eq!(master.num_columns(), 1);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);

        assert_eq!(
            master.add_columns(&[route(5, Facility::Site(0), 1.0)]),
            Err(SolveError::UnknownShipment(5))
        );
        assert_eq!(
            master.add_columns(&[route(0, Facility::Warehouse(3), 1.0)]),
            Err(SolveError::UnknownFacility(Facility::Warehouse(3)))
        );
    }

    #[test]
    fn relaxation_maps_row_duals() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);
        let rows = master.program().rows().len();

        let mut duals = vec![0.0; rows];
        duals[master.covering_row(0).unwrap().index()] = 100000.0;
        duals[master.capacity_row(Facility::Site(0), 3).unwrap().index()] = -2.5;
        duals[master.capacity_row(Facility::Warehouse(0), 12).unwrap().index()] = -0.5;

        let solver = ScriptedSolver::new(SolveOutcome::Optimal(LpSolution {
            objective: 200000.0,
            values: vec![1.0, 1.0, 0.0],
            duals: Some(duals),
        }));

        let relaxation = master.solve_relaxation(&solver).unwrap();
        assert_eq!(relaxation.objective, 200000.0);
        assert_eq!(relaxation.duals.lambda(0), 100000.0);
        assert_eq!(relaxation.duals.lambda(1), 0.0);
        assert_eq!(relaxation.duals.mu(0, 3), -2.5);
        assert_eq!(relaxation.duals.mu(0, 4), 0.0);
        assert_eq!(relaxation.duals.sigma(0, 12), -0.5);
        assert_eq!(master.state(), MasterState::RelaxationSolved);
        assert_eq!(master.coverage().unwrap(), vec![1.0, 1.0]);
        assert_eq!(master.unserved_shipments().unwrap(), vec![0, 1]);
    }

    #[test]
    fn relaxation_without_duals_is_an_error() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);
        let solver = ScriptedSolver::new(SolveOutcome::Optimal(LpSolution {
            objective: 0.0,
            values: vec![0.0; 3],
            duals: None,
        }));
        assert_eq!(master.solve_relaxation(&solver).unwrap_err(), SolveError::MissingDuals);
    }

    #[test]
    fn infeasible_relaxation_is_reported() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);
        let solver = ScriptedSolver::new(SolveOutcome::Infeasible);
        assert_eq!(master.solve_relaxation(&solver).unwrap_err(), SolveError::Infeasible);
    }

    #[test]
    fn finalize_makes_routes_and_warehouses_binary_and_locks_master() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);
        master
            .add_columns(&[route(0, Facility::Site(0), 80.0), route(1, Facility::Warehouse(0), 20.0)])
            .unwrap();

        // slack0, slack1, open, route0, route1
        let solver = ScriptedSolver::new(SolveOutcome::Optimal(LpSolution {
            objective: 350.0,
            values: vec![0.0, 0.0, 1.0, 1.0, 1.0],
            duals: None,
        }));
        assert_eq!(master.finalize_integral(&solver).unwrap(), 350.0);
        assert_eq!(master.state(), MasterState::IntegralSolved);

        {
            let seen = solver.seen.borrow();
            let solved = &seen[0];
            assert_eq!(solved.var(master.slack_var(0).unwrap()).kind, VarKind::Continuous);
            assert_eq!(solved.var(master.open_var(0).unwrap()).kind, VarKind::Binary);
            assert_eq!(solved.var(master.column(0, Facility::Site(0)).unwrap()).kind, VarKind::Binary);
        }

        let assigned = master.assigned_routes().unwrap();
        assert_eq!(assigned[0].map(|r| r.facility), Some(Facility::Site(0)));
        assert_eq!(assigned[1].map(|r| r.facility), Some(Facility::Warehouse(0)));
        assert_eq!(master.open_warehouses().unwrap(), vec![0]);
        assert!(master.unserved_shipments().unwrap().is_empty());

        assert!(matches!(
            master.add_columns(&[route(1, Facility::Site(0), 1.0)]),
            Err(SolveError::InvalidState { .. })
        ));
        assert!(matches!(
            master.solve_relaxation(&solver),
            Err(SolveError::InvalidState { .. })
        ));
    }

    #[test]
    fn failed_finalize_restores_continuous_model() {
        let problem = problem();
        let mut master = MasterProblem::new(&problem);
        master.add_columns(&[route(0, Facility::Site(0), 80.0)]).unwrap();

        let solver = ScriptedSolver::new(SolveOutcome::NotOptimal("TimeLimit".to_string()));
        assert_eq!(
            master.finalize_integral(&solver).unwrap_err(),
            SolveError::NotOptimal("TimeLimit".to_string())
        );
        assert!(!master.program().is_integral());
        assert_eq!(master.state(), MasterState::ColumnsAdded);
    }
}
