use std::fmt;
use serde::{Deserialize, Serialize};

pub const LOCATION: &str = "Location";
pub const DATE: &str = "Date";
pub const LAT: &str = "lat";
pub const LNG: &str = "lng";
pub const MIN_TEMP: &str = "MinTemp";
pub const MAX_TEMP: &str = "MaxTemp";
pub const RAINFALL: &str = "Rainfall";

/// Weather fields that can be shown in the tooltip of a snapshot map marker.
///
/// The declaration order is the canonical tooltip order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapFeature {
    MinTemp,
    MaxTemp,
    Rainfall,
    Evaporation,
    Sunshine,
    WindGustSpeed,
    WindSpeed9am,
    Humidity9am,
    Pressure9am,
    Cloud9am,
    Temp9am,
}

impl MapFeature {
    pub const ALL: [MapFeature; 11] = [
        MapFeature::MinTemp,
        MapFeature::MaxTemp,
        MapFeature::Rainfall,
        MapFeature::Evaporation,
        MapFeature::Sunshine,
        MapFeature::WindGustSpeed,
        MapFeature::WindSpeed9am,
        MapFeature::Humidity9am,
        MapFeature::Pressure9am,
        MapFeature::Cloud9am,
        MapFeature::Temp9am,
    ];

    /// Returns the name of the column holding this feature in the map data
    pub fn column(&self) -> &'static str {
        match self {
            MapFeature::MinTemp => MIN_TEMP,
            MapFeature::MaxTemp => MAX_TEMP,
            MapFeature::Rainfall => RAINFALL,
            MapFeature::Evaporation => "Evaporation",
            MapFeature::Sunshine => "Sunshine",
            MapFeature::WindGustSpeed => "WindGustSpeed",
            MapFeature::WindSpeed9am => "WindSpeed9am",
            MapFeature::Humidity9am => "Humidity9am",
            MapFeature::Pressure9am => "Pressure9am",
            MapFeature::Cloud9am => "Cloud9am",
            MapFeature::Temp9am => "Temp9am",
        }
    }
}

impl fmt::Display for MapFeature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_follows_declaration() {
        let mut shuffled = vec![MapFeature::Temp9am, MapFeature::MinTemp, MapFeature::Sunshine];
        shuffled.sort();
        assert_eq!(shuffled, vec![MapFeature::MinTemp, MapFeature::Sunshine, MapFeature::Temp9am]);
    }

    #[test]
    fn column_names_match_display() {
        assert_eq!(MapFeature::WindSpeed9am.column(), "WindSpeed9am");
        assert_eq!(MapFeature::MinTemp.to_string(), "MinTemp");
    }
}
