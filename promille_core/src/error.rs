//! Error types for the promille_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for promille_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Volume unit is not one of L, ml, cl
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    /// A numeric field is outside its valid range
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Drink name failed validation
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Drink token did not resolve against the catalog or selection
    #[error("Drink not found: {0}")]
    NotFound(String),

    /// A calculation would divide by a non-positive denominator
    #[error("Division undefined: {0}")]
    DivisionUndefined(String),

    /// Calculation requested with an empty combined drink set
    #[error("No drinks selected")]
    NoDrinksSelected,
}
