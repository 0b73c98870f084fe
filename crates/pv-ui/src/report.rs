//! One-shot report output.
//!
//! Prints the snapshot for the session's range as plain text (KPI block,
//! daily bars and hourly profile, optionally the raw tables) or as JSON.

use std::io::{self, Write};
use std::str::FromStr;

use pv_core::error::DashboardError;
use pv_core::formatting::{format_kwh, format_number, format_optional_kwh, NO_DATA};
use pv_data::session::{DashboardSession, DashboardSnapshot};
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::presenter::Presenter;

/// Columns used by the longest text bar.
const BAR_WIDTH: usize = 40;
const BAR_CHAR: &str = "█";

// ── ReportFormat ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(DashboardError::Other(anyhow::anyhow!(
                "unknown report format: {other}"
            ))),
        }
    }
}

// ── ReportPresenter ───────────────────────────────────────────────────────────

/// Writes a single report for the session's current range to `writer`.
pub struct ReportPresenter<W: Write> {
    writer: W,
    format: ReportFormat,
    include_raw: bool,
    source_name: String,
}

impl<W: Write> ReportPresenter<W> {
    pub fn new(writer: W, format: ReportFormat, source_name: impl Into<String>) -> Self {
        Self {
            writer,
            format,
            include_raw: false,
            source_name: source_name.into(),
        }
    }

    /// Append the raw daily and hourly tables to text output.
    pub fn with_raw(mut self, include_raw: bool) -> Self {
        self.include_raw = include_raw;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Presenter for ReportPresenter<W> {
    fn present(&mut self, session: DashboardSession) -> io::Result<()> {
        let snapshot = session.snapshot().map_err(io::Error::other)?;
        info!(
            "Writing {:?} report for {} ({} daily records)",
            self.format,
            snapshot.range.label(),
            snapshot.daily.len()
        );

        match self.format {
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut self.writer, &snapshot)?;
                writeln!(self.writer)?;
            }
            ReportFormat::Text => {
                for line in render_text(&snapshot, &self.source_name, self.include_raw) {
                    writeln!(self.writer, "{line}")?;
                }
            }
        }
        self.writer.flush()
    }
}

// ── Text rendering ────────────────────────────────────────────────────────────

/// Build the text report line by line.
pub fn render_text(snapshot: &DashboardSnapshot, source_name: &str, include_raw: bool) -> Vec<String> {
    let mut lines = vec![
        "☀ PV GENERATION REPORT ☀".to_string(),
        "=".repeat(60),
        format!("Source: {} | Sheet: {}", source_name, snapshot.sheet_name),
        format!(
            "Range:  {} ({} days of {})",
            snapshot.range.label(),
            snapshot.range.days(),
            snapshot.full_range.days()
        ),
        format!("Sign policy: {}", snapshot.sign_policy.as_str()),
        String::new(),
    ];

    let kpis = &snapshot.kpis;
    lines.push("Key figures".to_string());
    lines.extend(aligned_pairs(&[
        ("Total Energy Generated", format_optional_kwh(Some(kpis.total_energy))),
        ("Average Daily Energy", format_optional_kwh(kpis.average_daily_energy)),
        ("Peak Daily Energy", format_optional_kwh(kpis.peak_daily_energy)),
        ("Peak Hourly Energy", format_optional_kwh(kpis.peak_hourly_energy)),
    ]));
    lines.push(String::new());

    if snapshot.is_empty() {
        lines.push(format!("{NO_DATA} for the selected range"));
        return lines;
    }

    lines.push("Daily generation (kWh)".to_string());
    let daily: Vec<(String, f64)> = snapshot
        .daily
        .iter()
        .map(|r| (r.date.format("%Y-%m-%d").to_string(), r.energy_kwh))
        .collect();
    lines.extend(text_bars(&daily));
    lines.push(String::new());

    lines.push("Average hourly generation (kWh)".to_string());
    let hourly: Vec<(String, f64)> = snapshot
        .profile
        .iter()
        .map(|(h, v)| (format!("{h:02}:00"), v))
        .collect();
    lines.extend(text_bars(&hourly));
    if let Some((hour, value)) = snapshot.profile.peak() {
        lines.push(format!("  Peak hour: {hour:02}:00 ({})", format_kwh(value)));
    }

    if include_raw {
        lines.push(String::new());
        lines.push("Raw daily data".to_string());
        lines.extend(aligned_pairs(
            &snapshot
                .daily
                .iter()
                .map(|r| (r.date.format("%Y-%m-%d").to_string(), format_number(r.energy_kwh, 2)))
                .collect::<Vec<_>>(),
        ));
        lines.push(String::new());
        lines.push("Raw hourly data".to_string());
        lines.extend(aligned_pairs(
            &snapshot
                .hourly
                .iter()
                .map(|r| {
                    (
                        r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                        format_number(r.energy_kwh, 2),
                    )
                })
                .collect::<Vec<_>>(),
        ));
    }

    lines
}

/// `label │████   │ value` rows scaled to the largest value.
///
/// Negative values draw an empty bar.
pub fn text_bars(rows: &[(String, f64)]) -> Vec<String> {
    if rows.is_empty() {
        return vec![format!("  ({})", NO_DATA.to_lowercase())];
    }

    let max_val = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.width()).max().unwrap_or(0);

    rows.iter()
        .map(|(label, value)| {
            let filled = if max_val > 0.0 {
                ((value.max(0.0) / max_val) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "  {}{} │{}{}│ {}",
                label,
                " ".repeat(label_width - label.width()),
                BAR_CHAR.repeat(filled),
                " ".repeat(BAR_WIDTH - filled),
                format_number(*value, 2)
            )
        })
        .collect()
}

/// Two-column rows with the first column padded to a common display width.
fn aligned_pairs<L: AsRef<str>>(pairs: &[(L, String)]) -> Vec<String> {
    let width = pairs.iter().map(|(l, _)| l.as_ref().width()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(label, value)| {
            let label = label.as_ref();
            format!("  {}{}   {}", label, " ".repeat(width - label.width()), value)
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
