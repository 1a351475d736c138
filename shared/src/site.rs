use crate::location::Location;

use std::hash::{Hash, Hasher};

use crate::table::{cell, NumberParser, Table};
use crate::DataError;

/// A production site. Only sites with a positive monthly capacity take
/// direct shipments; the others are kept so that their codes still resolve.
#[derive(Debug, Clone)]
pub struct ProductionSite {
    pub code: String,
    pub index: usize,
    pub location: Location,
    pub capacity: f64,
}

impl Hash for ProductionSite {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.code.hash(state);
    }
}

impl Eq for ProductionSite {}

impl PartialEq for ProductionSite {
    fn eq(&self, other: &ProductionSite) -> bool {
        self.code == other.code
    }
}

impl ProductionSite {
    pub fn is_capacitated(&self) -> bool {
        self.capacity > 0.0
    }

    pub fn load(path: &str) -> Result<Vec<ProductionSite>, DataError> {
        let mut table = Table::open(path)?;
        let numbers = NumberParser::default();

        let id_column = table.columns.column("id")?;
        let country_column = table.columns.column("country")?;
        let postal_column = table.columns.column("postalCode")?;
        let capacity_column = table.columns.column("capacity")?;

        let mut sites = Vec::new();
        let (columns, rows) = table.rows();
        for record in rows {
            let record = record?;
            let capacity = numbers
                .extract(cell(&record, capacity_column))
                .ok_or_else(|| columns.parse_error(&record, capacity_column))?;

            sites.push(ProductionSite {
                code: cell(&record, id_column).to_string(),
                index: sites.len(),
                location: Location::new(cell(&record, country_column), cell(&record, postal_column)),
                capacity,
            });
        }

        Ok(sites)
    }
}
