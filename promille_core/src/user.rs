//! The [`User`] value type and boundary form parsing.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_AGE: u32 = 0;
const MAX_AGE: u32 = 150;
const MIN_WEIGHT_KG: f64 = 0.0;
const MAX_WEIGHT_KG: f64 = 500.0;

const DEFAULT_WEIGHT_KG: f64 = 70.0;
const DEFAULT_AGE: u32 = 20;

/// Gender as relevant to the Widmark reduction factor
///
/// Unrecognized form values are carried as [`Gender::Other`] and fall back
/// to the male reduction constant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl Gender {
    /// Body-water-distribution constant for this gender
    pub fn reduction_constant(&self) -> f64 {
        match self {
            Gender::Male => 0.7,
            Gender::Female => 0.6,
            // Documented fallback for unrecognized values
            Gender::Other(_) => 0.7,
        }
    }
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Other(s.trim().to_string()),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other(s) => write!(f, "{}", s),
        }
    }
}

/// The drinker's physiological inputs
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    name: String,
    age: u32,
    gender: Gender,
    weight: f64,
}

impl User {
    /// Create a validated user
    ///
    /// Age must be within 0–150 and weight within 0–500 kg.
    pub fn new(name: impl Into<String>, age: u32, gender: Gender, weight: f64) -> Result<Self> {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(Error::OutOfRange(format!(
                "age must be between {} and {}, got {}",
                MIN_AGE, MAX_AGE, age
            )));
        }
        if !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight) {
            return Err(Error::OutOfRange(format!(
                "weight must be between {} and {} kg, got {}",
                MIN_WEIGHT_KG, MAX_WEIGHT_KG, weight
            )));
        }
        Ok(Self {
            name: name.into(),
            age,
            gender,
            weight,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> &Gender {
        &self.gender
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} years, {}, {} Kg)",
            self.name, self.age, self.gender, self.weight
        )
    }
}

/// Raw form fields for user construction
///
/// Missing or unparsable fields take the documented defaults
/// (70 kg, male, 20 years); values that parse but fall outside the valid
/// ranges are an [`Error::OutOfRange`].
#[derive(Clone, Debug, Default)]
pub struct UserForm {
    pub weight: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
}

impl UserForm {
    /// Parse the form into a validated [`User`]
    pub fn parse(&self) -> Result<User> {
        let weight = self
            .weight
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_WEIGHT_KG);
        let gender = self
            .gender
            .as_deref()
            .map(Gender::from)
            .unwrap_or(Gender::Male);
        let age = self
            .age
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_AGE);

        User::new("User", age, gender, weight)
    }
}
