use ndarray::Array2;
use shared::{month_index, Facility, Month, ProblemData, MONTHS_PER_YEAR};

/// Dual prices of one relaxation solve. Pricing only ever reads a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DualPrices {
    /// lambda, one per shipment covering row
    pub covering: Vec<f64>,
    /// mu, (site, month)
    pub site_capacity: Array2<f64>,
    /// sigma, (warehouse, month)
    pub warehouse_capacity: Array2<f64>,
}

impl DualPrices {
    pub fn zeros(problem: &ProblemData) -> Self {
        DualPrices {
            covering: vec![0.0; problem.shipments().len()],
            site_capacity: Array2::zeros((problem.sites().len(), MONTHS_PER_YEAR)),
            warehouse_capacity: Array2::zeros((problem.warehouses().len(), MONTHS_PER_YEAR)),
        }
    }

    pub fn lambda(&self, shipment: usize) -> f64 {
        self.covering[shipment]
    }

    pub fn mu(&self, site: usize, month: Month) -> f64 {
        self.site_capacity[[site, month_index(month)]]
    }

    pub fn sigma(&self, warehouse: usize, month: Month) -> f64 {
        self.warehouse_capacity[[warehouse, month_index(month)]]
    }

    pub fn capacity(&self, facility: Facility, month: Month) -> f64 {
        match facility {
            Facility::Site(site) => self.mu(site, month),
            Facility::Warehouse(warehouse) => self.sigma(warehouse, month),
        }
    }
}
