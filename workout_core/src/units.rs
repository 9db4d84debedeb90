//! Unit normalization for weights and distances.
//!
//! Every total in the crate goes through these helpers so that a single
//! conversion factor applies on every code path.

use crate::{Distance, DistanceUnit, Weight, WeightUnit};

/// Pounds per kilogram, used for every lb/kg conversion
pub const LB_PER_KG: f64 = 2.20462;

pub const KM_PER_MILE: f64 = 1.609344;

/// Convert a weight value between units
pub fn convert_weight(value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    match (from, to) {
        (WeightUnit::Lb, WeightUnit::Lb) | (WeightUnit::Kg, WeightUnit::Kg) => value,
        (WeightUnit::Kg, WeightUnit::Lb) => value * LB_PER_KG,
        (WeightUnit::Lb, WeightUnit::Kg) => value / LB_PER_KG,
    }
}

impl Weight {
    pub fn to_unit(&self, unit: WeightUnit) -> f64 {
        convert_weight(self.value, self.unit, unit)
    }
}

impl Distance {
    pub fn to_km(&self) -> f64 {
        match self.unit {
            DistanceUnit::Km => self.value,
            DistanceUnit::M => self.value / 1000.0,
            DistanceUnit::Mi => self.value * KM_PER_MILE,
        }
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lb" | "lbs" => Ok(WeightUnit::Lb),
            "kg" | "kgs" => Ok(WeightUnit::Kg),
            other => Err(format!("unknown weight unit: {}", other)),
        }
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "km" => Ok(DistanceUnit::Km),
            "m" => Ok(DistanceUnit::M),
            "mi" => Ok(DistanceUnit::Mi),
            other => Err(format!("unknown distance unit: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_conversion_is_symmetric() {
        let kg = convert_weight(100.0, WeightUnit::Lb, WeightUnit::Kg);
        let back = convert_weight(kg, WeightUnit::Kg, WeightUnit::Lb);
        assert!((back - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_unit_is_identity() {
        assert_eq!(convert_weight(42.5, WeightUnit::Kg, WeightUnit::Kg), 42.5);
    }

    #[test]
    fn test_distance_to_km() {
        let m = Distance { value: 1500.0, unit: DistanceUnit::M };
        let mi = Distance { value: 1.0, unit: DistanceUnit::Mi };
        assert!((m.to_km() - 1.5).abs() < 1e-9);
        assert!((mi.to_km() - KM_PER_MILE).abs() < 1e-9);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("LBS".parse::<WeightUnit>().unwrap(), WeightUnit::Lb);
        assert_eq!("kg".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert!("stone".parse::<WeightUnit>().is_err());
        assert_eq!("mi".parse::<DistanceUnit>().unwrap(), DistanceUnit::Mi);
    }
}
