//! Volume units and liter normalization.
//!
//! Every volume in the system is carried as a number plus a [`Unit`] and
//! normalized to liters before any physiological arithmetic.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Volume unit accepted for drinks
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Unit {
    #[serde(rename = "L")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "cl")]
    Centiliter,
}

impl Unit {
    /// Convert a volume in this unit to liters. Pure, no side effects.
    pub fn to_liters(self, volume: f64) -> f64 {
        match self {
            Unit::Liter => volume,
            Unit::Centiliter => volume / 100.0,
            Unit::Milliliter => volume / 1000.0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Liter => "L",
            Unit::Milliliter => "ml",
            Unit::Centiliter => "cl",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "l" => Ok(Unit::Liter),
            "ml" => Ok(Unit::Milliliter),
            "cl" => Ok(Unit::Centiliter),
            _ => Err(Error::InvalidUnit(format!(
                "'{}' is not one of L, ml, cl",
                s
            ))),
        }
    }
}

/// Round to 2 decimal places
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Round to 3 decimal places
pub(crate) fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Normalize a volume/unit pair to liters
///
/// Fails with [`Error::InvalidUnit`] for any unit string other than
/// `L`, `ml` or `cl` (case-insensitive).
pub fn to_liters(volume: f64, unit: &str) -> Result<f64> {
    Ok(Unit::from_str(unit)?.to_liters(volume))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_is_unit_consistent() {
        assert_eq!(to_liters(1000.0, "ml").unwrap(), 1.0);
        assert_eq!(to_liters(100.0, "cl").unwrap(), 1.0);
        assert_eq!(to_liters(1.0, "L").unwrap(), 1.0);
    }

    #[test]
    fn test_conversion_is_linear() {
        assert_eq!(to_liters(500.0, "ml").unwrap(), 0.5);
        assert_eq!(to_liters(4.0, "cl").unwrap(), 0.04);
        assert_eq!(to_liters(0.33, "L").unwrap(), 0.33);
    }

    #[test]
    fn test_unit_parsing_is_case_insensitive() {
        assert_eq!(Unit::from_str("ML").unwrap(), Unit::Milliliter);
        assert_eq!(Unit::from_str("l").unwrap(), Unit::Liter);
        assert_eq!(Unit::from_str("Cl").unwrap(), Unit::Centiliter);
    }

    #[test]
    fn test_invalid_unit_is_rejected() {
        let err = to_liters(1.0, "oz").unwrap_err();
        assert!(matches!(err, Error::InvalidUnit(_)));
    }

    #[test]
    fn test_unit_display_roundtrip() {
        for unit in [Unit::Liter, Unit::Milliliter, Unit::Centiliter] {
            let parsed = Unit::from_str(&unit.to_string()).unwrap();
            assert_eq!(parsed, unit);
        }
    }
}
