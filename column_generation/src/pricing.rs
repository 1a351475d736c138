use std::cmp::Reverse;

use itertools::Itertools;
use log::{debug, trace, warn};
use noisy_float::prelude::*;
use shared::{ColumnPolicy, Facility, ProblemData, RouteError, Shipment, Warehouse};

use crate::duals::DualPrices;
use crate::route_pool::{Route, RoutePool};
use crate::CG_EPSILON;

#[cfg(feature = "perf_statistics")]
use crate::metrics::*;

/// A priced (shipment, facility) option. Costs do not depend on duals, so
/// they are computed once.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    pub facility: Facility,
    pub cost: f64,
}

/// Cost of serving `shipment` directly from its origin site: nothing for a
/// pickup, otherwise the routing cost from the origin.
pub fn direct_cost(problem: &ProblemData, shipment: &Shipment) -> Result<f64, RouteError> {
    match &shipment.destination {
        None => Ok(0.0),
        Some(destination) => problem.route_cost().routing_cost(
            destination,
            &shipment.origin,
            shipment.weight,
            shipment.is_hazardous,
        ),
    }
}

/// Cost of sending `shipment` through `warehouse`: the leg into the
/// warehouse, the leg out of it and the per-kg handling.
///
/// A co-located warehouse is fed by shuttle and ships onwards on the
/// origin's tariff; any other warehouse is reached on the origin's tariff to
/// the warehouse location and ships on its own tariff.
pub fn warehouse_cost(problem: &ProblemData, shipment: &Shipment, warehouse: &Warehouse) -> Result<f64, RouteError> {
    let route_cost = problem.route_cost();
    let weight = shipment.weight;
    let hazardous = shipment.is_hazardous;

    let inbound = match warehouse.shuttle_cost {
        Some(rate) => rate * weight,
        None => route_cost.routing_cost(&warehouse.location, &shipment.origin, weight, hazardous)?,
    };

    let outbound = match &shipment.destination {
        None => 0.0,
        Some(destination) if warehouse.is_co_located() => {
            route_cost.routing_cost(destination, &shipment.origin, weight, hazardous)?
        }
        Some(destination) => route_cost.routing_cost(destination, &warehouse.code, weight, hazardous)?,
    };

    let goods_factor = if shipment.is_make_to_order() {
        problem.config().make_to_order_factor
    } else {
        1.0
    };

    Ok(inbound + outbound + weight * warehouse.handling_rate(hazardous, goods_factor))
}

/// Searches for routes with negative reduced cost.
///
/// Every shipment can be served by its origin site (if that site has
/// capacity) or by any warehouse. Candidates whose lane has no tariff are
/// dropped once at construction and counted.
pub struct PricingEngine<'a> {
    problem: &'a ProblemData,
    policy: ColumnPolicy,
    candidates: Vec<Vec<Candidate>>,
    pool: RoutePool,
    unpriced: usize,
}

impl<'a> PricingEngine<'a> {
    pub fn new(problem: &'a ProblemData) -> PricingEngine<'a> {
        let mut unpriced = 0;
        let candidates = problem
            .shipments()
            .iter()
            .map(|shipment| {
                let mut options = Vec::with_capacity(problem.warehouses().len() + 1);

                if let Some(site) = problem.direct_site(shipment) {
                    match direct_cost(problem, shipment) {
                        Ok(cost) => options.push(Candidate {
                            facility: Facility::Site(site.index),
                            cost,
                        }),
                        Err(e) => {
                            debug!("Shipment {} direct: {}", shipment.id, e);
                            unpriced += 1;
                        }
                    }
                }

                for warehouse in problem.warehouses() {
                    match warehouse_cost(problem, shipment, warehouse) {
                        Ok(cost) => options.push(Candidate {
                            facility: Facility::Warehouse(warehouse.index),
                            cost,
                        }),
                        Err(e) => {
                            debug!("Shipment {} via {}: {}", shipment.id, warehouse.code, e);
                            unpriced += 1;
                        }
                    }
                }
                options
            })
            .collect_vec();

        if unpriced > 0 {
            warn!("{} candidate routes have no tariff and are never generated", unpriced);
        }

        PricingEngine {
            problem,
            policy: problem.config().column_policy,
            candidates,
            pool: RoutePool::new(),
            unpriced,
        }
    }

    pub fn with_policy(mut self, policy: ColumnPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn candidates(&self, shipment: usize) -> &[Candidate] {
        &self.candidates[shipment]
    }

    /// Number of (shipment, facility) options dropped for missing tariffs.
    pub fn unpriced_routes(&self) -> usize {
        self.unpriced
    }

    pub fn num_columns(&self) -> usize {
        self.pool.num_columns()
    }

    pub fn reduced_cost(&self, shipment: &Shipment, candidate: &Candidate, duals: &DualPrices) -> f64 {
        candidate.cost - duals.lambda(shipment.index) - shipment.weight * duals.capacity(candidate.facility, shipment.month)
    }

    /// Routes with reduced cost below `-CG_EPSILON` that were never generated
    /// before. Shipments are scanned by descending covering dual; under
    /// `BestPerShipment` only the most negative route of each shipment is
    /// returned. Every returned pair is marked used.
    pub fn find(&mut self, duals: &DualPrices) -> Vec<Route> {
        #[cfg(feature = "perf_statistics")]
        let _timer = PricingTimer::new();

        let problem = self.problem;
        let order = problem
            .shipments()
            .iter()
            .sorted_by_key(|s| (Reverse(n64(duals.lambda(s.index))), s.index))
            .collect_vec();

        let mut routes = Vec::new();
        for shipment in order {
            let mut improving = self.candidates[shipment.index]
                .iter()
                .filter(|c| !self.pool.is_used(shipment.index, c.facility))
                .map(|c| (self.reduced_cost(shipment, c, duals), *c))
                .filter(|(reduced_cost, _)| *reduced_cost < -CG_EPSILON)
                .collect_vec();

            if self.policy == ColumnPolicy::BestPerShipment {
                improving = improving
                    .into_iter()
                    .min_by(|a, b| a.0.total_cmp(&b.0))
                    .into_iter()
                    .collect();
            }

            for (reduced_cost, candidate) in improving {
                trace!(
                    "Shipment {} at {}: cost {:.2}, reduced cost {:.2}",
                    shipment.id,
                    candidate.facility,
                    candidate.cost,
                    reduced_cost
                );
                let route = Route {
                    shipment: shipment.index,
                    facility: candidate.facility,
                    cost: candidate.cost,
                };
                if self.pool.add_route(&route) {
                    routes.push(route);
                }
            }
        }

        debug!("Pricing found {} improving routes", routes.len());
        routes
    }

    /// Every priced route not generated yet, for solving the full
    /// formulation directly.
    pub fn enumerate_all(&mut self) -> Vec<Route> {
        let mut routes = Vec::new();
        for (shipment, options) in self.candidates.iter().enumerate() {
            for candidate in options {
                let route = Route {
                    shipment,
                    facility: candidate.facility,
                    cost: candidate.cost,
                };
                if self.pool.add_route(&route) {
                    routes.push(route);
                }
            }
        }
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Lane, Location, Planning, ProductionSite, RunConfig, TariffTable};

    fn lane(rate: f64, minimum: f64) -> Lane {
        Lane {
            minimum,
            rates: [Some(rate); 10],
            ..Lane::default()
        }
    }

    fn shipment(id: usize, month: u8, weight: f64, destination: Option<Location>) -> Shipment {
        Shipment {
            id,
            index: 0,
            month,
            destination,
            origin: "CH01".to_string(),
            weight,
            is_hazardous: false,
            planning: Planning::Standard,
        }
    }

    fn warehouse(code: &str, location: Location, shuttle_cost: Option<f64>) -> Warehouse {
        Warehouse {
            code: code.to_string(),
            index: 0,
            location,
            capacity: 5000.0,
            opening_cost: 100.0,
            shuttle_cost,
            inbound_cost: 0.1,
            outbound_cost: 0.2,
            hazardous_cost: 2.0,
            non_hazardous_cost: 1.0,
        }
    }

    fn problem(shipments: Vec<Shipment>, warehouses: Vec<Warehouse>, site_capacity: f64) -> ProblemData {
        let de = Location::new("DE", "10");
        let mut tariffs = TariffTable::default();
        tariffs.insert(&de, "CH01", lane(100.0, 50.0));
        tariffs.insert(&de, "FR01", lane(60.0, 0.0));
        tariffs.insert(&Location::new("FR", "74"), "CH01", lane(50.0, 0.0));

        let sites = vec![ProductionSite {
            code: "CH01".to_string(),
            index: 0,
            location: Location::new("CH", "40"),
            capacity: site_capacity,
        }];
        ProblemData::new(shipments, sites, warehouses, tariffs, RunConfig::default())
    }

    #[test]
    fn candidates_cover_direct_and_warehouse_routes() {
        let de = Location::new("DE", "10");
        let problem = problem(
            vec![shipment(1, 1, 800.0, Some(de))],
            vec![warehouse("FR01", Location::new("FR", "74"), None)],
            1000.0,
        );
        let engine = PricingEngine::new(&problem);

        let options = engine.candidates(0);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].facility, Facility::Site(0));
        assert!((options[0].cost - 800.0).abs() < 1e-9);
        // 400 in, 480 out, 800 kg * (0.1 + 0.2 + 1.0) handling
        assert_eq!(options[1].facility, Facility::Warehouse(0));
        assert!((options[1].cost - (400.0 + 480.0 + 1040.0)).abs() < 1e-9);
        assert_eq!(engine.unpriced_routes(), 0);
    }

    #[test]
    fn co_located_warehouse_uses_shuttle_and_origin_tariff() {
        let de = Location::new("DE", "10");
        let problem = problem(
            vec![shipment(1, 1, 200.0, Some(de))],
            vec![warehouse("CHW1", Location::new("CH", "40"), Some(0.5))],
            0.0,
        );
        let engine = PricingEngine::new(&problem);

        // uncapacitated origin: no direct route
        let options = engine.candidates(0);
        assert_eq!(options.len(), 1);
        // shuttle 100, outbound from CH01 200, handling 200 * 1.3
        assert!((options[0].cost - (100.0 + 200.0 + 260.0)).abs() < 1e-9);
    }

    #[test]
    fn pickup_skips_outbound_leg_and_mto_discounts_goods_handling() {
        let mut pickup = shipment(1, 1, 100.0, None);
        pickup.planning = Planning::MakeToOrder;
        let problem = problem(
            vec![pickup],
            vec![warehouse("FR01", Location::new("FR", "74"), None)],
            1000.0,
        );
        let engine = PricingEngine::new(&problem);

        let options = engine.candidates(0);
        assert_eq!(options[0].cost, 0.0);
        // inbound 50, handling 100 * (0.1 + 0.2 + 1.0 * 0.25)
        assert!((options[1].cost - (50.0 + 55.0)).abs() < 1e-9);
    }

    #[test]
    fn unpriced_lanes_are_dropped_and_counted() {
        let problem = problem(
            vec![shipment(1, 1, 100.0, Some(Location::new("IT", "20")))],
            vec![warehouse("FR01", Location::new("FR", "74"), None)],
            1000.0,
        );
        let engine = PricingEngine::new(&problem);

        assert!(engine.candidates(0).is_empty());
        assert_eq!(engine.unpriced_routes(), 2);
    }

    #[test]
    fn finds_best_route_per_shipment_once() {
        let de = Location::new("DE", "10");
        let problem = problem(
            vec![shipment(1, 1, 800.0, Some(de.clone())), shipment(2, 2, 10.0, Some(de))],
            vec![warehouse("FR01", Location::new("FR", "74"), None)],
            1000.0,
        );
        let mut engine = PricingEngine::new(&problem);

        let mut duals = DualPrices::zeros(&problem);
        duals.covering = vec![1e5, 1e5];
        let routes = engine.find(&duals);

        // 800 kg: direct 800 beats 1920 via FR01; 10 kg: 24 via FR01 beats the 50 minimum
        assert_eq!(routes.len(), 2);
        assert_eq!((routes[0].shipment, routes[0].facility), (0, Facility::Site(0)));
        assert_eq!((routes[1].shipment, routes[1].facility), (1, Facility::Warehouse(0)));
        assert!((routes[1].cost - 24.0).abs() < 1e-9);

        // same duals again: the other option of each shipment is next
        let routes = engine.find(&duals);
        assert_eq!(routes.len(), 2);
        assert_eq!((routes[0].shipment, routes[0].facility), (0, Facility::Warehouse(0)));
        assert_eq!((routes[1].shipment, routes[1].facility), (1, Facility::Site(0)));
        assert_eq!(routes[1].cost, 50.0);

        assert!(engine.find(&duals).is_empty());
        assert_eq!(engine.num_columns(), 4);
    }

    #[test]
    fn capacity_dual_is_weighted() {
        let de = Location::new("DE", "10");
        let problem = problem(
            vec![shipment(1, 3, 800.0, Some(de))],
            vec![warehouse("FR01", Location::new("FR", "74"), None)],
            1000.0,
        );
        let mut engine = PricingEngine::new(&problem);

        let mut duals = DualPrices::zeros(&problem);
        duals.covering = vec![900.0];
        // direct: 800 - 900 - 800 * (-0.2) = 60, not improving
        duals.site_capacity[[0, 2]] = -0.2;
        let shipment = &problem.shipments()[0];
        let direct = engine.candidates(0)[0];
        assert!((engine.reduced_cost(shipment, &direct, &duals) - 60.0).abs() < 1e-9);
        assert!(engine.find(&duals).is_empty());

        duals.covering = vec![2000.0];
        let routes = engine.find(&duals);
        assert_eq!(routes.len(), 1);
        // direct: -1040, warehouse: 1920 - 2000 = -80
        assert_eq!(routes[0].facility, Facility::Site(0));
    }

    #[test]
    fn all_improving_policy_returns_every_negative_route() {
        let de = Location::new("DE", "10");
        let problem = problem(
            vec![shipment(1, 1, 800.0, Some(de))],
            vec![warehouse("FR01", Location::new("FR", "74"), None)],
            1000.0,
        );
        let mut engine = PricingEngine::new(&problem).with_policy(ColumnPolicy::AllImproving);

        let mut duals = DualPrices::zeros(&problem);
        duals.covering = vec![1e5];
        assert_eq!(engine.find(&duals).len(), 2);
        assert!(engine.find(&duals).is_empty());
    }

    #[test]
    fn enumerate_all_skips_generated_routes() {
        let de = Location::new("DE", "10");
        let problem = problem(
            vec![shipment(1, 1, 800.0, Some(de))],
            vec![warehouse("FR01", Location::new("FR", "74"), None)],
            1000.0,
        );
        let mut engine = PricingEngine::new(&problem);

        let mut duals = DualPrices::zeros(&problem);
        duals.covering = vec![1e5];
        engine.find(&duals);

        let rest = engine.enumerate_all();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].facility, Facility::Warehouse(0));
    }
}
