//! The [`Drink`] value type.
//!
//! A drink is validated on construction and immutable afterwards, except for
//! the liter canonicalization rewrite performed by [`Drink::volume_in_liters`].
//! Its `Display` form doubles as the external token the ledger resolves
//! drinks by, so the formatting must stay reproducible from the four fields.

use crate::units::{round2, Unit};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MIN_ALCOHOL: f64 = 0.0;
const MAX_ALCOHOL: f64 = 100.0;
const MAX_VOLUME_LITERS: f64 = 50.0;

/// Ethanol mass per liter in grams. The calculation runs in grams
/// end-to-end; density is folded into the Widmark-style constants.
const ETHANOL_GRAMS_PER_LITER: f64 = 1000.0;

/// A single beverage: name, volume with unit, and alcohol percentage
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawDrink")]
pub struct Drink {
    name: String,
    volume: f64,
    unit: Unit,
    alcohol: f64,
}

/// Unvalidated mirror of [`Drink`] used to re-validate on deserialization
#[derive(Debug, Deserialize)]
struct RawDrink {
    name: String,
    volume: f64,
    unit: Unit,
    alcohol: f64,
}

impl TryFrom<RawDrink> for Drink {
    type Error = Error;

    fn try_from(raw: RawDrink) -> Result<Self> {
        Drink::new(raw.name, raw.volume, raw.unit, raw.alcohol)
    }
}

/// Structural identity of a drink after canonicalization
///
/// Used for deduplication instead of the display token, which is kept
/// purely for the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DrinkKey {
    name: String,
    unit: Unit,
    volume_bits: u64,
    alcohol_bits: u64,
}

impl Drink {
    /// Create a validated drink
    ///
    /// Validates the alcohol percentage (0–100), the name (non-empty,
    /// uppercase first character) and the converted volume (0 < liters ≤ 50).
    /// Construction is atomic: on any failure no drink is observable.
    pub fn new(name: impl Into<String>, volume: f64, unit: Unit, alcohol: f64) -> Result<Self> {
        let name = name.into();

        if !(MIN_ALCOHOL..=MAX_ALCOHOL).contains(&alcohol) {
            return Err(Error::OutOfRange(format!(
                "alcohol percentage must be between {} and {}, got {}",
                MIN_ALCOHOL, MAX_ALCOHOL, alcohol
            )));
        }

        match name.chars().next() {
            None => {
                return Err(Error::InvalidName("drink name must not be empty".into()));
            }
            Some(first) if !first.is_uppercase() => {
                return Err(Error::InvalidName(format!(
                    "drink name must start with an uppercase letter, got '{}'",
                    name
                )));
            }
            Some(_) => {}
        }

        let liters = unit.to_liters(volume);
        if !(liters > 0.0 && liters <= MAX_VOLUME_LITERS) {
            return Err(Error::OutOfRange(format!(
                "volume must be between 0 (exclusive) and {} liters, got {}",
                MAX_VOLUME_LITERS, liters
            )));
        }

        Ok(Self {
            name,
            volume,
            unit,
            alcohol,
        })
    }

    /// Construct a preset literal without revalidation
    ///
    /// Reserved for catalog literals that `Catalog::validate` re-checks.
    pub(crate) fn preset(name: &str, volume: f64, unit: Unit, alcohol: f64) -> Self {
        Self {
            name: name.into(),
            volume,
            unit,
            alcohol,
        }
    }

    /// Create a drink from raw form field strings
    ///
    /// This is the explicit parse-and-validate step for the
    /// `custom-drink-*` boundary fields.
    pub fn parse(name: &str, volume: &str, unit: &str, alcohol: &str) -> Result<Self> {
        let unit = Unit::from_str(unit)?;
        let volume: f64 = volume
            .trim()
            .parse()
            .map_err(|_| Error::OutOfRange(format!("volume '{}' is not a number", volume)))?;
        let alcohol: f64 = alcohol
            .trim()
            .parse()
            .map_err(|_| Error::OutOfRange(format!("alcohol '{}' is not a number", alcohol)))?;
        Self::new(name, volume, unit, alcohol)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn alcohol(&self) -> f64 {
        self.alcohol
    }

    /// Volume in liters without the canonicalization side effect
    pub fn liters(&self) -> f64 {
        self.unit.to_liters(self.volume)
    }

    /// Volume in liters, canonicalizing the stored representation
    ///
    /// If the stored unit is `ml` or `cl` and the equivalent reaches one
    /// liter, the stored volume and unit are rewritten to liters (volume
    /// rounded to 2 decimals). Idempotent after the first call: subsequent
    /// calls see the unit already as `L`.
    pub fn volume_in_liters(&mut self) -> f64 {
        let liters = self.unit.to_liters(self.volume);
        if self.unit != Unit::Liter && liters >= 1.0 {
            self.volume = round2(liters);
            self.unit = Unit::Liter;
        }
        liters
    }

    /// Ethanol mass of this drink in grams, rounded to 2 decimals
    ///
    /// Canonicalizes the stored volume as a side effect of reading it.
    pub fn alcohol_grams(&mut self) -> f64 {
        round2(self.volume_in_liters() * (self.alcohol / 100.0) * ETHANOL_GRAMS_PER_LITER)
    }

    /// Structural key after canonicalization, for deduplication
    pub fn key(&self) -> DrinkKey {
        let mut canonical = self.clone();
        canonical.volume_in_liters();
        DrinkKey {
            name: canonical.name.to_lowercase(),
            unit: canonical.unit,
            volume_bits: canonical.volume.to_bits(),
            alcohol_bits: canonical.alcohol.to_bits(),
        }
    }
}

impl fmt::Display for Drink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}, {}%)",
            self.name, self.volume, self.unit, self.alcohol
        )
    }
}

impl PartialEq for Drink {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.unit == other.unit
            && self.alcohol == other.alcohol
            && self.volume == other.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beer_500ml() -> Drink {
        Drink::new("Beer", 500.0, Unit::Milliliter, 5.0).unwrap()
    }

    #[test]
    fn test_valid_drink_construction() {
        let drink = beer_500ml();
        assert_eq!(drink.name(), "Beer");
        assert_eq!(drink.volume(), 500.0);
        assert_eq!(drink.unit(), Unit::Milliliter);
        assert_eq!(drink.alcohol(), 5.0);
    }

    #[test]
    fn test_alcohol_out_of_range_rejected() {
        let err = Drink::new("Beer", 0.5, Unit::Liter, 101.0).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        let err = Drink::new("Beer", 0.5, Unit::Liter, -0.1).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
    }

    #[test]
    fn test_name_validation() {
        let err = Drink::new("", 0.5, Unit::Liter, 5.0).unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
        let err = Drink::new("beer", 0.5, Unit::Liter, 5.0).unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
    }

    #[test]
    fn test_volume_bounds() {
        let err = Drink::new("Beer", 0.0, Unit::Liter, 5.0).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        let err = Drink::new("Keg", 51.0, Unit::Liter, 5.0).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        // 50 liters exactly is still allowed
        assert!(Drink::new("Keg", 50.0, Unit::Liter, 5.0).is_ok());
    }

    #[test]
    fn test_parse_from_form_fields() {
        let drink = Drink::parse("Cider", "330", "ml", "4.5").unwrap();
        assert_eq!(drink.alcohol(), 4.5);
        assert_eq!(drink.unit(), Unit::Milliliter);

        let err = Drink::parse("Cider", "a lot", "ml", "4.5").unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        let err = Drink::parse("Cider", "330", "pints", "4.5").unwrap_err();
        assert!(matches!(err, Error::InvalidUnit(_)));
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let mut drink = Drink::new("Bier", 1000.0, Unit::Milliliter, 6.0).unwrap();

        assert_eq!(drink.volume_in_liters(), 1.0);
        assert_eq!(drink.volume(), 1.0);
        assert_eq!(drink.unit(), Unit::Liter);

        // Second read sees the rewritten representation unchanged
        assert_eq!(drink.volume_in_liters(), 1.0);
        assert_eq!(drink.volume(), 1.0);
        assert_eq!(drink.unit(), Unit::Liter);
    }

    #[test]
    fn test_canonicalization_rewrites_large_ml_volumes() {
        let mut drink = Drink::new("Beer", 2000.0, Unit::Milliliter, 5.0).unwrap();
        assert_eq!(drink.volume_in_liters(), 2.0);
        assert_eq!(drink.volume(), 2.0);
        assert_eq!(drink.unit(), Unit::Liter);
    }

    #[test]
    fn test_small_volumes_keep_their_unit() {
        let mut drink = beer_500ml();
        assert_eq!(drink.volume_in_liters(), 0.5);
        assert_eq!(drink.unit(), Unit::Milliliter);
        assert_eq!(drink.volume(), 500.0);
    }

    #[test]
    fn test_display_token() {
        assert_eq!(beer_500ml().to_string(), "Beer (500 ml, 5%)");
        let wine = Drink::new("Rotwein", 0.2, Unit::Liter, 13.0).unwrap();
        assert_eq!(wine.to_string(), "Rotwein (0.2 L, 13%)");
    }

    #[test]
    fn test_token_stable_after_canonicalization() {
        let mut drink = Drink::new("Bier", 1000.0, Unit::Milliliter, 6.0).unwrap();
        drink.volume_in_liters();
        assert_eq!(drink.to_string(), "Bier (1 L, 6%)");
    }

    #[test]
    fn test_equality_ignores_name_case() {
        let a = Drink::new("Beer", 0.5, Unit::Liter, 5.0).unwrap();
        let b = Drink::new("BEER", 0.5, Unit::Liter, 5.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_inequality_on_differing_volume() {
        let a = beer_500ml();
        let b = Drink::new("Beer", 330.0, Unit::Milliliter, 5.0).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_key_matches_across_equivalent_representations() {
        // 1000 ml and 1 L are the same drink structurally
        let ml = Drink::new("Bier", 1000.0, Unit::Milliliter, 6.0).unwrap();
        let l = Drink::new("Bier", 1.0, Unit::Liter, 6.0).unwrap();
        assert_eq!(ml.key(), l.key());
    }

    #[test]
    fn test_roundtrip_from_own_fields() {
        let drink = beer_500ml();
        let rebuilt =
            Drink::new(drink.name(), drink.volume(), drink.unit(), drink.alcohol()).unwrap();
        assert_eq!(drink, rebuilt);
    }

    #[test]
    fn test_alcohol_grams() {
        assert_eq!(beer_500ml().alcohol_grams(), 25.0);
        let mut bier = Drink::new("Bier", 1.0, Unit::Liter, 6.0).unwrap();
        assert_eq!(bier.alcohol_grams(), 60.0);
    }

    #[test]
    fn test_deserialization_revalidates() {
        let json = r#"{"name":"beer","volume":0.5,"unit":"L","alcohol":5.0}"#;
        let result: std::result::Result<Drink, _> = serde_json::from_str(json);
        assert!(result.is_err(), "lowercase name must be rejected");

        let json = r#"{"name":"Beer","volume":500.0,"unit":"ml","alcohol":5.0}"#;
        let drink: Drink = serde_json::from_str(json).unwrap();
        assert_eq!(drink, beer_500ml());
    }
}
