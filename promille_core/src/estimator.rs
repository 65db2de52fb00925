//! Widmark-style BAC estimation.
//!
//! All functions here are pure and total over valid inputs: no I/O, no
//! mutation beyond the drinks' own liter canonicalization. The alcohol unit
//! is grams end-to-end (see [`crate::drink::Drink::alcohol_grams`]); the BAC
//! result is a per-mille figure.

use crate::units::{round2, round3};
use crate::{DrinkLedger, Error, Result};
use crate::{Drink, Gender, User};
use std::collections::BTreeMap;

/// Share of ingested alcohol assumed to reach the bloodstream
pub const ALCOHOL_ABSORPTION_RATE: f64 = 0.85;

/// Baseline metabolism in promille per hour at the reference weight
pub const ALCOHOL_METABOLISM_RATE: f64 = 0.15;

/// Lower bound on the age-adjusted metabolism rate, preventing
/// pathological near-zero decay for very old ages
pub const METABOLISM_RATE_FLOOR: f64 = 0.10;

/// Reference body weight in kg the metabolism rate is scaled against
pub const BASELINE_WEIGHT_KG: f64 = 70.0;

/// Calculation result handed to the renderer
#[derive(Clone, Debug, PartialEq)]
pub struct BacReport {
    /// Estimated blood alcohol concentration in promille
    pub bac: f64,
    /// Estimated hours until the BAC decays to zero
    pub time_to_sober: f64,
    /// Occurrence count per drink token within the combined selection
    pub drink_summary: BTreeMap<String, usize>,
}

/// Age adjustment factor: decreases by 0.001 per year above 20
pub fn age_factor(age: u32) -> f64 {
    if age > 20 {
        1.0 - (age - 20) as f64 * 0.001
    } else {
        1.0
    }
}

/// Gender- and age-adjusted Widmark reduction factor
pub fn reduction_factor(gender: &Gender, age: u32) -> f64 {
    gender.reduction_constant() * age_factor(age)
}

/// Total ethanol mass of the given drinks in grams, rounded to 2 decimals
///
/// An empty slice yields 0; callers must treat that as the distinct
/// "no drinks" condition instead of computing a degenerate BAC.
pub fn total_alcohol_grams(drinks: &mut [Drink]) -> f64 {
    round2(drinks.iter_mut().map(Drink::alcohol_grams).sum())
}

/// Estimate the blood alcohol concentration in promille
///
/// `total_alcohol` is the ingested ethanol mass in grams. Fails with
/// [`Error::DivisionUndefined`] when weight or the reduction factor is
/// non-positive; gender and user validation normally reject that upstream.
pub fn bac(weight: f64, gender: &Gender, age: u32, total_alcohol: f64) -> Result<f64> {
    let denominator = weight * reduction_factor(gender, age);
    if denominator <= 0.0 {
        return Err(Error::DivisionUndefined(format!(
            "weight ({}) times reduction factor must be positive",
            weight
        )));
    }
    let absorbed = round2(total_alcohol * ALCOHOL_ABSORPTION_RATE);
    Ok(round3(absorbed / denominator))
}

/// Metabolism rate before display rounding
fn raw_metabolism_rate(age: u32, weight: f64) -> f64 {
    let rate = (ALCOHOL_METABOLISM_RATE * age_factor(age)).max(METABOLISM_RATE_FLOOR);
    rate * (weight / BASELINE_WEIGHT_KG)
}

/// Age- and weight-adjusted metabolism rate, rounded to 2 decimals
pub fn adjusted_metabolism_rate(age: u32, weight: f64) -> f64 {
    round2(raw_metabolism_rate(age, weight))
}

/// Hours until the given BAC decays to zero, rounded to 2 decimals
///
/// Divides by the unrounded metabolism rate so the 2-decimal display
/// rounding of [`adjusted_metabolism_rate`] never skews the estimate.
pub fn time_to_sober(bac: f64, weight: f64, age: u32) -> Result<f64> {
    let rate = raw_metabolism_rate(age, weight);
    if rate <= 0.0 {
        // Cannot occur given the floor, checked defensively
        return Err(Error::DivisionUndefined(
            "adjusted metabolism rate must be positive".into(),
        ));
    }
    let hours = round2(bac / rate);
    tracing::debug!(age, weight, bac, rate, hours, "time to sober");
    Ok(hours)
}

/// Run the full estimation over the ledger's combined drink set
///
/// Returns [`Error::NoDrinksSelected`] for an empty selection; arithmetic
/// failures surface as [`Error::DivisionUndefined`] and are never folded
/// into a default numeric result.
pub fn calculate(user: &User, ledger: &DrinkLedger) -> Result<BacReport> {
    let mut drinks = ledger.combined();
    if drinks.is_empty() {
        return Err(Error::NoDrinksSelected);
    }

    let total = total_alcohol_grams(&mut drinks);
    let bac = bac(user.weight(), user.gender(), user.age(), total)?;
    let time_to_sober = time_to_sober(bac, user.weight(), user.age())?;

    tracing::info!(
        total_alcohol_grams = total,
        bac,
        time_to_sober,
        "calculated sobriety estimate"
    );

    Ok(BacReport {
        bac,
        time_to_sober,
        drink_summary: ledger.summary(),
    })
}
