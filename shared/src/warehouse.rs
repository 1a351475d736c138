use std::hash::{Hash, Hasher};

use crate::table::{cell, NumberParser, Table};
use crate::{DataError, Location};

#[derive(Debug, Clone)]
pub struct Warehouse {
    pub code: String,
    pub index: usize,
    pub location: Location,
    /// Monthly throughput in kg once opened.
    pub capacity: f64,
    pub opening_cost: f64,
    /// Per-kg shuttle rate; only warehouses next to production have one.
    pub shuttle_cost: Option<f64>,
    pub inbound_cost: f64,
    pub outbound_cost: f64,
    pub hazardous_cost: f64,
    pub non_hazardous_cost: f64,
}

impl Hash for Warehouse {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.code.hash(state);
    }
}

impl Eq for Warehouse {}

impl PartialEq for Warehouse {
    fn eq(&self, other: &Warehouse) -> bool {
        self.code == other.code
    }
}

impl Warehouse {
    pub fn is_co_located(&self) -> bool {
        self.shuttle_cost.is_some()
    }

    /// Per-kg handling rate for one shipment; the goods-class part is scaled
    /// by `goods_factor` (the make-to-order discount).
    pub fn handling_rate(&self, is_hazardous: bool, goods_factor: f64) -> f64 {
        let goods = if is_hazardous {
            self.hazardous_cost
        } else {
            self.non_hazardous_cost
        };
        self.inbound_cost + self.outbound_cost + goods * goods_factor
    }

    pub fn load(path: &str) -> Result<Vec<Warehouse>, DataError> {
        let mut table = Table::open(path)?;
        let numbers = NumberParser::default();

        let id_column = table.columns.column("id")?;
        let country_column = table.columns.column("country")?;
        let postal_column = table.columns.column("postalCode")?;
        let capacity_column = table.columns.column("capacity")?;
        let opening_column = table.columns.column("openingCost")?;
        let shuttle_column = table.columns.column("shuttleCost")?;
        let inbound_column = table.columns.column("inboundCost")?;
        let outbound_column = table.columns.column("outboundCost")?;
        let dg_column = table.columns.column("dgCost")?;
        let non_dg_column = table.columns.column("nonDgCost")?;

        let mut warehouses = Vec::new();
        let (columns, rows) = table.rows();
        for record in rows {
            let record = record?;
            let number = |column: usize| {
                numbers
                    .extract(cell(&record, column))
                    .ok_or_else(|| columns.parse_error(&record, column))
            };

            let shuttle_cell = cell(&record, shuttle_column);
            let shuttle_cost = if shuttle_cell.is_empty() {
                None
            } else {
                Some(number(shuttle_column)?)
            };

            warehouses.push(Warehouse {
                code: cell(&record, id_column).to_string(),
                index: warehouses.len(),
                location: Location::new(cell(&record, country_column), cell(&record, postal_column)),
                capacity: number(capacity_column)?,
                opening_cost: number(opening_column)?,
                shuttle_cost,
                inbound_cost: number(inbound_column)?,
                outbound_cost: number(outbound_column)?,
                hazardous_cost: number(dg_column)?,
                non_hazardous_cost: number(non_dg_column)?,
            });
        }

        Ok(warehouses)
    }
}
