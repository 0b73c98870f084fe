//! Data layer for the PV dashboard.
//!
//! Loads the generation worksheet from a workbook, extracts the daily and
//! hourly series, filters them by date range and computes the KPIs and the
//! hour-of-day profile the presenters display.

pub mod aggregator;
pub mod extract;
pub mod reader;
pub mod session;

pub use pv_core as core;
