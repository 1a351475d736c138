use indexmap::IndexMap;
use noisy_float::prelude::*;
use superslice::Ext;

use crate::table::{cell, NumberParser, Table};
use crate::{DataError, Location};

/// Upper weight limits (kg) of the less-than-truckload brackets, ascending.
pub const WEIGHT_BRACKETS: [f64; 10] = [
    50.0, 100.0, 200.0, 400.0, 800.0, 1500.0, 5000.0, 10000.0, 15000.0, 20000.0,
];
/// Above this weight one full truck is charged and the rest goes by bracket.
pub const FTL_THRESHOLD: f64 = 20_000.0;

const BRACKET_COLUMNS: [&str; 10] = [
    "<=50kg", "<=100kg", "<=200", "<=400", "<=800", "<=1500", "<=5000", "<=10000", "<=15000",
    "<=20000",
];

/// Tariff of one (destination, departure point) lane. Rates are per 100 kg.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lane {
    pub minimum: f64,
    pub rates: [Option<f64>; 10],
    pub full_truck_load: Option<f64>,
    pub customs_clearance: f64,
    pub hazardous_surcharge: f64,
    /// km
    pub distance: f64,
    /// working days
    pub lead_time: f64,
}

impl Lane {
    /// Rate of the smallest bracket that holds `weight`. Brackets without a
    /// rate are skipped upwards; weights past the largest bracket use the
    /// largest rate available.
    pub fn rate_for(&self, weight: f64) -> Option<f64> {
        let weight = n64(weight);
        let first = WEIGHT_BRACKETS.lower_bound_by(|limit| n64(*limit).cmp(&weight));

        self.rates[first.min(self.rates.len())..]
            .iter()
            .find_map(|r| *r)
            .or_else(|| {
                if first >= self.rates.len() {
                    self.rates.iter().rev().find_map(|r| *r)
                } else {
                    None
                }
            })
    }

    /// Monetary charge for one shipment on this lane, `None` if the lane has
    /// no rate that covers the weight.
    pub fn charge(&self, weight: f64, is_hazardous: bool) -> Option<f64> {
        let mut cost = 0.0;
        let mut remaining = weight;

        // one full truck plus a residual less-than-truckload part
        if remaining > FTL_THRESHOLD {
            cost += self.full_truck_load?;
            remaining -= FTL_THRESHOLD;
        }

        if remaining > 0.0 {
            cost += self.rate_for(remaining)? * remaining / 100.0;
        }
        cost += self.customs_clearance;

        let mut cost = cost.max(self.minimum);
        if is_hazardous {
            cost += self.hazardous_surcharge;
        }
        Some(cost)
    }
}

/// All lanes, keyed destination country -> postal area -> departure point.
#[derive(Debug, Clone, Default)]
pub struct TariffTable {
    lanes: IndexMap<String, IndexMap<String, IndexMap<String, Lane>>>,
    len: usize,
}

impl TariffTable {
    pub fn insert(&mut self, destination: &Location, departure: &str, lane: Lane) {
        let previous = self
            .lanes
            .entry(destination.country.clone())
            .or_default()
            .entry(destination.postal_area.clone())
            .or_default()
            .insert(departure.to_string(), lane);
        if previous.is_none() {
            self.len += 1;
        }
    }

    pub fn lane(&self, destination: &Location, departure: &str) -> Option<&Lane> {
        self.lanes
            .get(destination.country.as_str())
            .and_then(|areas| areas.get(destination.postal_area.as_str()))
            .and_then(|departures| departures.get(departure))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn load(path: &str) -> Result<TariffTable, DataError> {
        let mut table = Table::open(path)?;
        let numbers = NumberParser::default();

        let origin_column = table.columns.column("Origin")?;
        let country_column = table.columns.column("Ship to Country code")?;
        let postal_column = table.columns.column("Ship to simplified postcode 2 digits")?;
        let minimum_column = table.columns.column("Minimum")?;
        // the 20t bracket is missing from older tariff sheets
        let bracket_columns: Vec<Option<usize>> = BRACKET_COLUMNS
            .iter()
            .map(|name| table.columns.optional_column(name))
            .collect();
        let ftl_column = table.columns.column("FTL")?;
        let customs_column = table.columns.column("Custom Clearance")?;
        let surcharge_column = table.columns.column("DG Surcharge per shipment")?;
        let distance_column = table.columns.column("Distance")?;
        let lead_time_column = table.columns.column("Carrier Leadtime in working days")?;

        let mut tariffs = TariffTable::default();
        let (_, rows) = table.rows();
        for record in rows {
            let record = record?;
            let number = |column: usize| numbers.extract(cell(&record, column));

            let mut rates = [None; 10];
            for (rate, column) in rates.iter_mut().zip(bracket_columns.iter()) {
                *rate = column.and_then(|c| number(c));
            }

            let lane = Lane {
                minimum: number(minimum_column).unwrap_or_default(),
                rates,
                full_truck_load: number(ftl_column),
                customs_clearance: number(customs_column).unwrap_or_default(),
                hazardous_surcharge: number(surcharge_column).unwrap_or_default(),
                distance: number(distance_column).unwrap_or_default(),
                lead_time: number(lead_time_column).unwrap_or_default(),
            };

            let destination =
                Location::new(cell(&record, country_column), cell(&record, postal_column));
            tariffs.insert(&destination, cell(&record, origin_column), lane);
        }

        log::info!("Loaded {} tariff lanes from {}", tariffs.len(), path);
        Ok(tariffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_lane(rate: f64) -> Lane {
        Lane {
            rates: [Some(rate); 10],
            full_truck_load: Some(1000.0),
            ..Lane::default()
        }
    }

    #[test]
    fn each_limit_belongs_to_its_own_bracket() {
        let mut lane = flat_lane(0.0);
        for (i, rate) in lane.rates.iter_mut().enumerate() {
            *rate = Some(i as f64);
        }
        for (i, limit) in WEIGHT_BRACKETS.iter().enumerate() {
            assert_eq!(lane.rate_for(*limit), Some(i as f64));
            assert_eq!(lane.rate_for(limit + 0.5), Some((i + 1).min(9) as f64));
        }
        assert_eq!(lane.rate_for(0.1), Some(0.0));
    }

    #[test]
    fn missing_bracket_falls_through_to_next() {
        let mut lane = flat_lane(10.0);
        lane.rates[0] = None;
        lane.rates[1] = Some(7.0);
        assert_eq!(lane.rate_for(30.0), Some(7.0));
    }

    #[test]
    fn weight_past_largest_bracket_uses_largest_rate() {
        let mut lane = flat_lane(10.0);
        lane.rates[9] = None;
        lane.rates[8] = Some(3.0);
        assert_eq!(lane.rate_for(25_000.0), Some(3.0));
    }

    #[test]
    fn lane_without_rates_is_unpriced() {
        let lane = Lane::default();
        assert_eq!(lane.charge(10.0, false), None);
    }

    #[test]
    fn exact_truck_load_has_no_residual() {
        let mut lane = flat_lane(10.0);
        lane.full_truck_load = Some(900.0);
        assert_eq!(lane.charge(20_000.0, false), Some(2000.0));
        assert_eq!(lane.charge(20_000.5, false), Some(900.0 + 10.0 * 0.5 / 100.0));
    }

    #[test]
    fn insert_counts_distinct_lanes() {
        let mut tariffs = TariffTable::default();
        let de = Location::new("DE", "10");
        tariffs.insert(&de, "CH01", flat_lane(1.0));
        tariffs.insert(&de, "CH01", flat_lane(2.0));
        tariffs.insert(&de, "FR01", flat_lane(3.0));
        assert_eq!(tariffs.len(), 2);
        assert_eq!(tariffs.lane(&de, "CH01").and_then(|l| l.rates[0]), Some(2.0));
        assert!(tariffs.lane(&Location::new("DE", "11"), "CH01").is_none());
    }
}
