use std::ops::RangeInclusive;

use crate::{
    CostCoefficients, DataError, DepartureResolution, Month, ProductionSite, RouteCostModel,
    RunConfig, Shipment, TariffTable, Warehouse, MONTHS_PER_YEAR,
};

/// Everything one optimization run reads. Immutable once built.
pub struct ProblemData {
    shipments: Vec<Shipment>,
    sites: Vec<ProductionSite>,
    warehouses: Vec<Warehouse>,
    route_cost: RouteCostModel,
    config: RunConfig,
}

impl ProblemData {
    /// Indices of shipments, sites and warehouses are reassigned to their
    /// position in the given lists.
    pub fn new(
        mut shipments: Vec<Shipment>,
        mut sites: Vec<ProductionSite>,
        mut warehouses: Vec<Warehouse>,
        tariffs: TariffTable,
        config: RunConfig,
    ) -> ProblemData {
        shipments.iter_mut().enumerate().for_each(|(i, s)| s.index = i);
        sites.iter_mut().enumerate().for_each(|(i, s)| s.index = i);
        warehouses.iter_mut().enumerate().for_each(|(i, w)| w.index = i);

        let resolution = DepartureResolution {
            primary: config.primary_departures.clone(),
            secondary: config.secondary_departures.clone(),
        };
        let route_cost = RouteCostModel::new(tariffs, config.coefficients, resolution);

        ProblemData {
            shipments,
            sites,
            warehouses,
            route_cost,
            config,
        }
    }

    pub fn load(
        shipments_path: &str,
        tariffs_path: &str,
        sites_path: &str,
        warehouses_path: &str,
        config: RunConfig,
    ) -> Result<ProblemData, DataError> {
        let shipments = Shipment::load(shipments_path)?;
        let tariffs = TariffTable::load(tariffs_path)?;
        let sites = ProductionSite::load(sites_path)?;
        let warehouses = Warehouse::load(warehouses_path)?;

        Ok(ProblemData::new(shipments, sites, warehouses, tariffs, config))
    }

    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    pub fn sites(&self) -> &[ProductionSite] {
        &self.sites
    }

    pub fn warehouses(&self) -> &[Warehouse] {
        &self.warehouses
    }

    /// Calendar months of the planning horizon.
    pub fn months(&self) -> RangeInclusive<Month> {
        1..=MONTHS_PER_YEAR as Month
    }

    pub fn route_cost(&self) -> &RouteCostModel {
        &self.route_cost
    }

    pub fn coefficients(&self) -> &CostCoefficients {
        &self.config.coefficients
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn site(&self, code: &str) -> Option<&ProductionSite> {
        self.sites.iter().find(|s| s.code == code)
    }

    /// The site a shipment can be served from directly, if its origin is a
    /// production site with capacity.
    pub fn direct_site(&self, shipment: &Shipment) -> Option<&ProductionSite> {
        self.site(&shipment.origin).filter(|s| s.is_capacitated())
    }
}
