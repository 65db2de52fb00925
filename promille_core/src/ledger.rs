//! Session-scoped drink ledger.
//!
//! The ledger owns the drinks a user picked from the catalog, their custom
//! drinks, and an append-only history log. It is loaded, mutated and saved
//! once per request; nothing here is shared or ambient.

use crate::catalog::Catalog;
use crate::drink::Drink;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

const HISTORY_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// One line of the audit trail: which drink was added and when
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Display token of the drink at the time it was added
    pub drink: String,
    /// Formatted wall-clock time, shown to the user
    pub time: String,
    /// Milliseconds since the epoch, strictly increasing per ledger
    pub timestamp: i64,
}

/// Selected and custom drinks of one session plus their history log
///
/// The serialized field names (`user_drinks`, `custom_drinks`) are the
/// session file contract and must not drift with the Rust names.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DrinkLedger {
    #[serde(rename = "user_drinks")]
    selected: Vec<Drink>,
    #[serde(rename = "custom_drinks")]
    custom: Vec<Drink>,
    history: Vec<HistoryEntry>,
}

impl DrinkLedger {
    pub fn selected(&self) -> &[Drink] {
        &self.selected
    }

    pub fn custom(&self) -> &[Drink] {
        &self.custom
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Selected and custom drinks, stable-sorted by descending liters
    ///
    /// Ties keep input order: selected before custom, then insertion order.
    pub fn combined(&self) -> Vec<Drink> {
        let mut drinks: Vec<Drink> = self
            .selected
            .iter()
            .chain(self.custom.iter())
            .cloned()
            .collect();
        drinks.sort_by(|a, b| {
            b.liters()
                .partial_cmp(&a.liters())
                .unwrap_or(Ordering::Equal)
        });
        drinks
    }

    /// Occurrence count per display token within [`Self::combined`]
    pub fn summary(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for drink in self.combined() {
            *counts.entry(drink.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// The deduplicated selection pool: catalog presets plus combined drinks
    ///
    /// Deduplication uses the structural drink key, presentation order is
    /// descending liters.
    pub fn offerings(&self, catalog: &Catalog) -> Vec<Drink> {
        let mut seen = std::collections::HashSet::new();
        let mut pool: Vec<Drink> = catalog
            .drinks()
            .iter()
            .cloned()
            .chain(self.combined())
            .filter(|d| seen.insert(d.key()))
            .collect();
        pool.sort_by(|a, b| {
            b.liters()
                .partial_cmp(&a.liters())
                .unwrap_or(Ordering::Equal)
        });
        pool
    }

    /// Resolve a token against catalog ∪ combined (exact, case-sensitive)
    fn resolve(&self, catalog: &Catalog, token: &str) -> Result<Drink> {
        catalog
            .resolve(token)
            .cloned()
            .or_else(|| self.combined().into_iter().find(|d| d.to_string() == token))
            .ok_or_else(|| Error::NotFound(token.to_string()))
    }

    /// Add a drink from the selection pool to the selected list
    ///
    /// Appends a history entry on success; fails with [`Error::NotFound`]
    /// (leaving all state untouched) when the token does not resolve.
    pub fn add_selected(
        &mut self,
        catalog: &Catalog,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Drink> {
        let drink = self.resolve(catalog, token)?;
        self.selected.push(drink.clone());
        self.log(&drink, now);
        tracing::info!(drink = %drink, "drink added");
        Ok(drink)
    }

    /// Construct a custom drink from raw form fields and add it
    ///
    /// Construction failures propagate before any mutation.
    pub fn add_custom(
        &mut self,
        name: &str,
        volume: &str,
        unit: &str,
        alcohol: &str,
        now: DateTime<Utc>,
    ) -> Result<Drink> {
        let drink = Drink::parse(name, volume, unit, alcohol)?;
        self.custom.push(drink.clone());
        self.log(&drink, now);
        tracing::info!(drink = %drink, "custom drink added");
        Ok(drink)
    }

    /// Remove the first matching drink from the selection
    ///
    /// Searches `selected` before `custom`. Also removes the single most
    /// recent history entry recorded for the same token; older entries stay.
    /// [`Error::NotFound`] leaves the ledger, history included, unchanged.
    pub fn remove(&mut self, catalog: &Catalog, token: &str) -> Result<Drink> {
        let drink = self.resolve(catalog, token)?;

        let removed = if let Some(pos) = self.selected.iter().position(|d| d == &drink) {
            self.selected.remove(pos)
        } else if let Some(pos) = self.custom.iter().position(|d| d == &drink) {
            self.custom.remove(pos)
        } else {
            return Err(Error::NotFound(format!(
                "'{}' is not in the current selection",
                token
            )));
        };

        if let Some(pos) = self.history.iter().rposition(|e| e.drink == token) {
            self.history.remove(pos);
        }

        tracing::info!(drink = %removed, "drink removed");
        Ok(removed)
    }

    /// Remove history entries matching the exact (drink, time) pair
    ///
    /// A no-op, not an error, when nothing matches.
    pub fn remove_history_entry(&mut self, drink: &str, time: &str) {
        self.history
            .retain(|e| e.drink != drink || e.time != time);
    }

    /// Clear the selected and custom drinks; the history stays
    pub fn reset(&mut self) {
        self.selected.clear();
        self.custom.clear();
        tracing::info!("selection reset");
    }

    /// Clear the selection and the history log
    pub fn reset_history(&mut self) {
        self.reset();
        self.history.clear();
        tracing::info!("history reset");
    }

    fn log(&mut self, drink: &Drink, now: DateTime<Utc>) {
        let mut timestamp = now.timestamp_millis();
        if let Some(last) = self.history.last() {
            if timestamp <= last.timestamp {
                timestamp = last.timestamp + 1;
            }
        }
        self.history.push(HistoryEntry {
            drink: drink.to_string(),
            time: now.format(HISTORY_TIME_FORMAT).to_string(),
            timestamp,
        });
    }
}
