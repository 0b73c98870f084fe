//! Domain model, error taxonomy, settings and formatting shared by the PV
//! dashboard crates.

pub mod dates;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{DashboardError, Result};
