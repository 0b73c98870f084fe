//! Range filtering and aggregation over extracted generation records.

use std::collections::BTreeMap;

use pv_core::models::{DailyRecord, DateRange, Dated, HourlyProfile, HourlyRecord, KpiSet};

// ── Filtering ─────────────────────────────────────────────────────────────────

/// Keep the records whose calendar date falls inside `range` (both ends
/// included), in their original order.
pub fn filter_by_range<T>(records: &[T], range: &DateRange) -> Vec<T>
where
    T: Dated + Clone,
{
    records
        .iter()
        .filter(|r| range.contains(r.date()))
        .cloned()
        .collect()
}

// ── KPIs ──────────────────────────────────────────────────────────────────────

/// Compute the four headline figures for an already-filtered series.
///
/// An empty daily series gives a total of `0.0` and `None` for the mean and
/// peak.  `peak_hourly_energy` is `None` when `hourly` is empty.
pub fn compute_kpis(daily: &[DailyRecord], hourly: &[HourlyRecord]) -> KpiSet {
    let total_energy: f64 = daily.iter().map(|r| r.energy_kwh).sum();
    let average_daily_energy = if daily.is_empty() {
        None
    } else {
        Some(total_energy / daily.len() as f64)
    };

    KpiSet {
        total_energy,
        average_daily_energy,
        peak_daily_energy: max_energy(daily.iter().map(|r| r.energy_kwh)),
        peak_hourly_energy: max_energy(hourly.iter().map(|r| r.energy_kwh)),
    }
}

fn max_energy(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |best, v| match best {
        Some(b) if b >= v => Some(b),
        _ => Some(v),
    })
}

// ── Hourly profile ────────────────────────────────────────────────────────────

/// Mean energy per hour of day.  Hours with no records are left out.
pub fn compute_hourly_profile(hourly: &[HourlyRecord]) -> HourlyProfile {
    let mut groups: BTreeMap<u32, (f64, u32)> = BTreeMap::new();
    for record in hourly {
        let slot = groups.entry(record.hour_of_day()).or_insert((0.0, 0));
        slot.0 += record.energy_kwh;
        slot.1 += 1;
    }

    HourlyProfile::from_map(
        groups
            .into_iter()
            .map(|(hour, (sum, count))| (hour, sum / f64::from(count)))
            .collect(),
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
