use std::fmt;

/// Destination granularity used by the tariffs: a country code plus the first
/// two digits of the postal code.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub country: String,
    pub postal_area: String,
}

impl Location {
    pub fn new(country: &str, postal_area: &str) -> Location {
        Location {
            country: country.trim().to_string(),
            postal_area: postal_area.trim().to_string(),
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.country, self.postal_area)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.country, self.postal_area)
    }
}
