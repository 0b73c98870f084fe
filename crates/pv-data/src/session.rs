//! Explicit per-session dashboard state.
//!
//! A [`DashboardSession`] owns a shared reference to the loaded worksheet and
//! the currently selected date range.  Every call to
//! [`DashboardSession::snapshot`] re-runs the whole pipeline (extract, filter,
//! aggregate) so presenters never see stale figures.

use std::sync::Arc;

use pv_core::error::{DashboardError, Result};
use pv_core::models::{
    DailyRecord, DateRange, HourlyProfile, HourlyRecord, KpiSet, RawSheet, SignPolicy,
};
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{compute_hourly_profile, compute_kpis, filter_by_range};
use crate::extract::{extract_daily, extract_hourly};

// ── DashboardSnapshot ─────────────────────────────────────────────────────────

/// Everything a presenter needs to draw one frame or print one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub sheet_name: String,
    pub sign_policy: SignPolicy,
    /// Range the figures below were computed for.
    pub range: DateRange,
    /// Span of the whole daily series.
    pub full_range: DateRange,
    pub daily: Vec<DailyRecord>,
    pub hourly: Vec<HourlyRecord>,
    pub kpis: KpiSet,
    pub profile: HourlyProfile,
}

impl DashboardSnapshot {
    /// `true` when the active range matched no daily and no hourly records.
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty() && self.hourly.is_empty()
    }
}

// ── DashboardSession ──────────────────────────────────────────────────────────

/// Loaded worksheet plus the user's date range selection.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    sheet: Arc<RawSheet>,
    range: DateRange,
    policy: SignPolicy,
    full_range: DateRange,
}

impl DashboardSession {
    /// Start a session over `sheet`, selecting the full span of its daily
    /// series.
    ///
    /// Fails with [`DashboardError::EmptyDataset`] when the sheet has no
    /// usable daily rows, and with any extraction error the sheet triggers.
    pub fn new(sheet: impl Into<Arc<RawSheet>>, policy: SignPolicy) -> Result<Self> {
        let sheet = sheet.into();
        let daily = extract_daily(&sheet, policy)?;
        let full_range =
            DateRange::covering(daily.iter().map(|r| r.date)).ok_or(DashboardError::EmptyDataset)?;

        debug!(
            "Session opened on '{}' spanning {}",
            sheet.name,
            full_range.label()
        );
        Ok(Self {
            sheet,
            range: full_range,
            policy,
            full_range,
        })
    }

    pub fn sheet(&self) -> &RawSheet {
        &self.sheet
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Default range: `[min(date), max(date)]` of the unfiltered daily series.
    pub fn full_range(&self) -> DateRange {
        self.full_range
    }

    pub fn policy(&self) -> SignPolicy {
        self.policy
    }

    /// Replace the active range.
    pub fn set_range(&mut self, range: DateRange) {
        debug!("Range changed to {}", range.label());
        self.range = range;
    }

    /// Return to the full span.
    pub fn reset_range(&mut self) {
        self.set_range(self.full_range);
    }

    /// Move the start of the range by `days`, never past its end.
    pub fn shift_start(&mut self, days: i64) {
        self.set_range(self.range.shift_start(days));
    }

    /// Move the end of the range by `days`, never before its start.
    pub fn shift_end(&mut self, days: i64) {
        self.set_range(self.range.shift_end(days));
    }

    /// Recompute every derived figure for the active range.
    pub fn snapshot(&self) -> Result<DashboardSnapshot> {
        let daily_all = extract_daily(&self.sheet, self.policy)?;
        let hourly_all = extract_hourly(&self.sheet, self.policy)?;

        let daily = filter_by_range(&daily_all, &self.range);
        let hourly = filter_by_range(&hourly_all, &self.range);
        let kpis = compute_kpis(&daily, &hourly);
        let profile = compute_hourly_profile(&hourly);

        debug!(
            "Snapshot for {}: {} daily, {} hourly records",
            self.range.label(),
            daily.len(),
            hourly.len()
        );
        Ok(DashboardSnapshot {
            sheet_name: self.sheet.name.clone(),
            sign_policy: self.policy,
            range: self.range,
            full_range: self.full_range,
            daily,
            hourly,
            kpis,
            profile,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
