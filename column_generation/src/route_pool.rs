use shared::{CustomHashSet, Facility};

#[cfg(feature = "perf_statistics")]
use crate::metrics::*;

/// One column: a shipment handled at a facility, with its true routing cost.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub shipment: usize,
    pub facility: Facility,
    pub cost: f64,
}

/// The (shipment, facility) pairs handed to the master so far. A pair is
/// accepted once and never proposed again; the routes themselves live in the
/// master.
#[derive(Clone, Debug, Default)]
pub struct RoutePool {
    used: CustomHashSet<(usize, Facility)>,
    entry_count: usize,
}

impl RoutePool {
    pub fn new() -> RoutePool {
        RoutePool::default()
    }

    pub fn num_columns(&self) -> usize {
        self.entry_count
    }

    pub fn is_used(&self, shipment: usize, facility: Facility) -> bool {
        self.used.contains(&(shipment, facility))
    }

    /// Returns `false` and keeps the pool unchanged if the pair is used.
    pub fn add_route(&mut self, route: &Route) -> bool {
        if !self.used.insert((route.shipment, route.facility)) {
            return false;
        }

        #[cfg(feature = "perf_statistics")]
        COLUMNS_GENERATED.mark();

        self.entry_count += 1;
        true
    }
}
