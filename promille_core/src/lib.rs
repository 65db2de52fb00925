#![forbid(unsafe_code)]

//! Core domain model and business logic for the Promille BAC estimator.
//!
//! This crate provides:
//! - Domain types (drinks, units, users)
//! - The preset drink catalog
//! - The Widmark-style BAC estimator
//! - The session drink ledger with its history log
//! - Session persistence and configuration

pub mod catalog;
pub mod config;
pub mod drink;
pub mod error;
pub mod estimator;
pub mod ledger;
pub mod logging;
pub mod session;
pub mod units;
pub mod user;

// Re-export commonly used types
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use drink::{Drink, DrinkKey};
pub use error::{Error, Result};
pub use estimator::{calculate, BacReport};
pub use ledger::{DrinkLedger, HistoryEntry};
pub use session::{session_path, Session};
pub use units::{to_liters, Unit};
pub use user::{Gender, User, UserForm};
