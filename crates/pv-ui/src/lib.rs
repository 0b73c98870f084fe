//! Terminal presentation layer for the PV dashboard.
//!
//! Two interchangeable [`presenter::Presenter`] implementations consume the
//! same [`pv_data::session::DashboardSession`]: the interactive ratatui
//! dashboard in [`app`] and the one-shot text/JSON output in [`report`].

pub mod app;
pub mod charts;
pub mod components;
pub mod presenter;
pub mod report;
pub mod table_view;
pub mod themes;

pub use pv_core as core;
