use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::{CostCoefficients, Lane, Location, TariffTable};

/// A lane that cannot be priced. This is a gap in the input data, callers
/// drop the affected route instead of aborting.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteError {
    UnpricedLane { destination: Location, departure: String },
    NoRate { destination: Location, departure: String, weight: f64 },
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            RouteError::UnpricedLane { destination, departure } => {
                write!(f, "no tariff from {} to {}", departure, destination)
            }
            RouteError::NoRate { destination, departure, weight } => write!(
                f,
                "tariff from {} to {} has no rate for {} kg",
                departure, destination, weight
            ),
        }
    }
}

impl Error for RouteError {}

/// Production-site codes that do not have their own tariff rows are priced
/// from a substitute site: the cheapest primary one, else the cheapest
/// secondary one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DepartureResolution {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

pub struct RouteCostModel {
    tariffs: TariffTable,
    coefficients: CostCoefficients,
    resolution: DepartureResolution,
}

impl RouteCostModel {
    pub fn new(
        tariffs: TariffTable,
        coefficients: CostCoefficients,
        resolution: DepartureResolution,
    ) -> RouteCostModel {
        RouteCostModel {
            tariffs,
            coefficients,
            resolution,
        }
    }

    pub fn tariffs(&self) -> &TariffTable {
        &self.tariffs
    }

    pub fn coefficients(&self) -> &CostCoefficients {
        &self.coefficients
    }

    fn cheapest_of<'a>(&'a self, destination: &Location, candidates: &'a [String]) -> Option<&'a str> {
        candidates
            .iter()
            .filter_map(|code| {
                self.tariffs
                    .lane(destination, code)
                    .map(|lane| (code.as_str(), lane.minimum))
            })
            // first one wins on equal minimum
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(code, _)| code)
    }

    /// The departure point whose tariff is used for `departure`. Only
    /// production-site codes are substituted; any other code must be priced
    /// as it is.
    pub fn resolve_departure<'a>(
        &'a self,
        destination: &Location,
        departure: &'a str,
    ) -> Result<&'a str, RouteError> {
        if self.tariffs.lane(destination, departure).is_some() {
            return Ok(departure);
        }

        let substitute = if self.resolution.primary.iter().any(|c| c == departure) {
            self.cheapest_of(destination, &self.resolution.primary)
                .or_else(|| self.cheapest_of(destination, &self.resolution.secondary))
        } else {
            None
        };

        substitute.ok_or_else(|| RouteError::UnpricedLane {
            destination: destination.clone(),
            departure: departure.to_string(),
        })
    }

    pub fn lane(&self, destination: &Location, departure: &str) -> Result<&Lane, RouteError> {
        let resolved = self.resolve_departure(destination, departure)?;
        self.tariffs
            .lane(destination, resolved)
            .ok_or_else(|| RouteError::UnpricedLane {
                destination: destination.clone(),
                departure: departure.to_string(),
            })
    }

    /// Tariff charge of one shipment.
    pub fn cost(
        &self,
        destination: &Location,
        departure: &str,
        weight: f64,
        is_hazardous: bool,
    ) -> Result<f64, RouteError> {
        self.lane(destination, departure)?
            .charge(weight, is_hazardous)
            .ok_or_else(|| RouteError::NoRate {
                destination: destination.clone(),
                departure: departure.to_string(),
                weight,
            })
    }

    pub fn distance(&self, destination: &Location, departure: &str) -> Result<f64, RouteError> {
        Ok(self.lane(destination, departure)?.distance)
    }

    pub fn lead_time(&self, destination: &Location, departure: &str) -> Result<f64, RouteError> {
        Ok(self.lane(destination, departure)?.lead_time)
    }

    /// Tariff weighted with the distance and lead-time penalties; this is the
    /// cost a route contributes to the objective.
    pub fn routing_cost(
        &self,
        destination: &Location,
        departure: &str,
        weight: f64,
        is_hazardous: bool,
    ) -> Result<f64, RouteError> {
        let lane = self.lane(destination, departure)?;
        let tariff = lane
            .charge(weight, is_hazardous)
            .ok_or_else(|| RouteError::NoRate {
                destination: destination.clone(),
                departure: departure.to_string(),
                weight,
            })?;
        let c = &self.coefficients;

        Ok(c.gamma * tariff + c.alpha * c.eta * weight * lane.distance + c.beta * lane.lead_time)
    }
}
