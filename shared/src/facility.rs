use std::fmt;

/// Where a shipment is handled: directly by a production site or through a
/// warehouse. Both carry the index into the respective list of `ProblemData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Facility {
    Site(usize),
    Warehouse(usize),
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Facility::Site(index) => write!(f, "site[{}]", index),
            Facility::Warehouse(index) => write!(f, "warehouse[{}]", index),
        }
    }
}
