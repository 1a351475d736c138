#![warn(clippy::all)]

use std::fs::File;
use std::io::Read;

use flate2::read::GzDecoder;

mod error;
pub use error::DataError;

mod location;
pub use location::Location;

mod shipment;
pub use shipment::{Planning, Shipment, PICKUP_SENTINEL};

mod site;
pub use site::ProductionSite;

mod warehouse;
pub use warehouse::Warehouse;

mod facility;
pub use facility::Facility;

mod tariff;
pub use tariff::{Lane, TariffTable, FTL_THRESHOLD, WEIGHT_BRACKETS};

mod route_cost;
pub use route_cost::{DepartureResolution, RouteCostModel, RouteError};

mod config;
pub use config::{ColumnPolicy, CostCoefficients, RunConfig};

mod problem;
pub use problem::ProblemData;

mod table;
pub use table::NumberParser;

mod custom_hashmap;
pub use custom_hashmap::CustomHashMap;
pub use custom_hashmap::CustomHashSet;

mod console_logger;
pub use console_logger::init_console_logger;

#[cfg(feature = "perf_statistics")]
mod print_metrics;
#[cfg(feature = "perf_statistics")]
pub use print_metrics::setup_metrics_printer;

/// Calendar month, 1 to 12.
pub type Month = u8;
pub const MONTHS_PER_YEAR: usize = 12;

pub fn month_index(month: Month) -> usize {
    usize::from(month.saturating_sub(1)) % MONTHS_PER_YEAR
}

/// Opens an input file, decompressing on the fly if it ends in `.gz`.
pub fn get_reader(path: &str) -> Result<Box<dyn Read>, DataError> {
    let file = File::open(path).map_err(|e| DataError::Io(path.to_string(), e))?;
    if path.ends_with(".gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}
