//! Preset drink catalog.
//!
//! The built-in drinks offered for selection before the user adds anything.

use crate::drink::Drink;
use crate::units::Unit;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of preset drinks
///
/// **Note**: Prefer [`get_default_catalog`] which returns a cached
/// reference. This function is retained for testing and for callers that
/// extend the catalog with configured presets.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Catalog {
    use Unit::*;

    let drinks = vec![
        preset("Bier", 1.0, Liter, 6.0),
        preset("Bier", 0.5, Liter, 5.0),
        preset("Bier", 0.33, Liter, 5.0),
        preset("Rotwein", 0.2, Liter, 13.0),
        preset("Weißwein", 0.2, Liter, 11.0),
        preset("Sekt", 100.0, Milliliter, 11.0),
        preset("Schnaps", 4.0, Centiliter, 40.0),
        preset("Schnaps", 2.0, Centiliter, 40.0),
    ];

    Catalog { drinks }
}

// Preset literals are known-valid; validate() and the catalog tests keep
// that claim honest.
fn preset(name: &str, volume: f64, unit: Unit, alcohol: f64) -> Drink {
    Drink::preset(name, volume, unit, alcohol)
}

/// The fixed list of preset drinks offered for selection
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    drinks: Vec<Drink>,
}

impl Catalog {
    pub fn drinks(&self) -> &[Drink] {
        &self.drinks
    }

    /// Append an additional preset, e.g. from configuration
    pub fn push(&mut self, drink: Drink) {
        self.drinks.push(drink);
    }

    /// Resolve a display token against the presets (exact, case-sensitive)
    pub fn resolve(&self, token: &str) -> Option<&Drink> {
        self.drinks.iter().find(|d| d.to_string() == token)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.drinks.is_empty() {
            errors.push("Catalog has no drinks".to_string());
        }

        for drink in &self.drinks {
            // Re-run entity validation over the stored fields
            if let Err(e) = Drink::new(drink.name(), drink.volume(), drink.unit(), drink.alcohol())
            {
                errors.push(format!("Preset '{}' is invalid: {}", drink, e));
            }
        }

        let mut tokens = HashSet::new();
        for drink in &self.drinks {
            if !tokens.insert(drink.to_string()) {
                errors.push(format!("Duplicate preset token '{}'", drink));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.drinks().len(), 8);
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = get_default_catalog().validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_tokens_are_unique() {
        let catalog = build_default_catalog();
        let mut tokens = HashSet::new();
        for drink in catalog.drinks() {
            assert!(tokens.insert(drink.to_string()), "duplicate: {}", drink);
        }
    }

    #[test]
    fn test_resolve_by_token() {
        let catalog = build_default_catalog();
        let drink = catalog.resolve("Bier (1 L, 6%)").unwrap();
        assert_eq!(drink.name(), "Bier");
        assert_eq!(drink.alcohol(), 6.0);

        // Matching is case-sensitive
        assert!(catalog.resolve("bier (1 L, 6%)").is_none());
        assert!(catalog.resolve("Met (0.2 L, 12%)").is_none());
    }

    #[test]
    fn test_validate_flags_duplicates() {
        let mut catalog = build_default_catalog();
        catalog.push(Drink::preset("Bier", 1.0, Unit::Liter, 6.0));
        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
    }
}
