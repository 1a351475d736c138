use std::hash::{Hash, Hasher};

use crate::table::{cell, NumberParser, Table};
use crate::{DataError, Location, Month, MONTHS_PER_YEAR};

/// Destination value marking a shipment that is collected at its origin.
pub const PICKUP_SENTINEL: &str = "pickup";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Planning {
    Standard,
    MakeToOrder,
}

#[derive(Debug, Clone)]
pub struct Shipment {
    pub id: usize,
    pub index: usize,
    pub month: Month,
    /// `None` for a direct pickup.
    pub destination: Option<Location>,
    pub origin: String,
    pub weight: f64,
    pub is_hazardous: bool,
    pub planning: Planning,
}

impl Hash for Shipment {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        state.write_usize(self.id);
    }
}

impl Eq for Shipment {}

impl PartialEq for Shipment {
    fn eq(&self, other: &Shipment) -> bool {
        self.id == other.id
    }
}

impl Shipment {
    pub fn is_pickup(&self) -> bool {
        self.destination.is_none()
    }

    pub fn is_make_to_order(&self) -> bool {
        self.planning == Planning::MakeToOrder
    }

    pub fn load(path: &str) -> Result<Vec<Shipment>, DataError> {
        let mut table = Table::open(path)?;
        let numbers = NumberParser::default();

        // get the ids for the relevant columns!
        let month_column = table.columns.column("Month-Year")?;
        let postal_column = table.columns.column("Postal Code 2 digits")?;
        let country_column = table.columns.column("Country of Destination")?;
        let hazardous_column = table.columns.column("Dangerous Goods")?;
        let weight_column = table.columns.column("KG2")?;
        let planning_column = table.columns.column("Planning")?;
        let origin_column = table.columns.column("Starting Point")?;

        let mut shipments = Vec::new();
        let (columns, rows) = table.rows();
        for (row, record) in rows.enumerate() {
            let record = record?;

            // "2023-07" and "202307" both end in the month
            let month_cell = cell(&record, month_column);
            let month = month_cell
                .get(month_cell.len().saturating_sub(2)..)
                .and_then(|m| m.parse::<Month>().ok())
                .filter(|m| (1..=MONTHS_PER_YEAR as Month).contains(m))
                .ok_or_else(|| columns.parse_error(&record, month_column))?;

            let country = cell(&record, country_column);
            let destination = if country.eq_ignore_ascii_case(PICKUP_SENTINEL) {
                None
            } else {
                Some(Location::new(country, cell(&record, postal_column)))
            };

            let weight = numbers
                .extract(cell(&record, weight_column))
                .ok_or_else(|| columns.parse_error(&record, weight_column))?;

            let planning = if cell(&record, planning_column).eq_ignore_ascii_case("mto") {
                Planning::MakeToOrder
            } else {
                Planning::Standard
            };

            shipments.push(Shipment {
                id: row,
                index: shipments.len(),
                month,
                destination,
                origin: cell(&record, origin_column).to_string(),
                weight,
                is_hazardous: cell(&record, hazardous_column).eq_ignore_ascii_case("dg"),
                planning,
            });
        }

        log::info!("Loaded {} shipments from {}", shipments.len(), path);
        Ok(shipments)
    }
}
