use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

// ── Worksheet layout ──────────────────────────────────────────────────────────

/// Zero-based position of the worksheet holding the generation records.
pub const DEFAULT_SHEET_INDEX: usize = 2;

/// Header of the daily date column.
pub const DAILY_DATE_COLUMN: &str = "Date";
/// Header of the daily energy column.
pub const DAILY_ENERGY_COLUMN: &str = "Daily generated electricity [kWh]";
/// Header of the hourly timestamp column.
pub const HOURLY_TIMESTAMP_COLUMN: &str = "Date/Time";
/// Header of the hourly energy column.
pub const HOURLY_ENERGY_COLUMN: &str = "Hourly generated electricity [kWh]";

// ── Cell / RawSheet ───────────────────────────────────────────────────────────

/// A single worksheet value, independent of the workbook format it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// A cell the workbook itself typed as a date or date/time.
    DateTime(NaiveDateTime),
    /// A formula error such as `#N/A`.
    Error(String),
}

impl Cell {
    /// `true` for cells that count as an absent value.
    ///
    /// Blank cells, formula errors and whitespace-only text are all missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty | Cell::Error(_) => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
            Cell::Bool(_) | Cell::DateTime(_) => false,
        }
    }

    /// Human-readable rendering used in error messages.
    pub fn display_value(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.to_string(),
            Cell::Error(e) => e.clone(),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// One worksheet's rows, addressed by column name.
///
/// The first used worksheet row supplies the column names, which are trimmed
/// of surrounding whitespace on construction.  Rows shorter than the header
/// read as [`Cell::Empty`] in the missing positions.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    /// Worksheet name as stored in the workbook.
    pub name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    /// 1-based worksheet row holding the header.
    header_row: usize,
}

impl RawSheet {
    /// Build a sheet from its header and data rows.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(|c| c.trim().to_string()).collect(),
            rows,
            header_row: 1,
        }
    }

    /// Place the header on worksheet row `row` (1-based) when blank rows
    /// precede it.
    pub fn with_header_row(mut self, row: usize) -> Self {
        self.header_row = row.max(1);
        self
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Worksheet row number (1-based) of data row `index`.
    pub fn sheet_row(&self, index: usize) -> usize {
        self.header_row + 1 + index
    }

    /// Trimmed column names in worksheet order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of the column called `name`, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Number of data rows (excluding the header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at data row `row`, column position `col`.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// Anything that can be placed on the calendar for range filtering.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// Energy generated on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub energy_kwh: f64,
}

impl Dated for DailyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Energy generated in the hour starting at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub timestamp: NaiveDateTime,
    pub energy_kwh: f64,
}

impl HourlyRecord {
    /// Hour of day in `0..=23`.
    pub fn hour_of_day(&self) -> u32 {
        self.timestamp.hour()
    }
}

impl Dated for HourlyRecord {
    fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

// ── SignPolicy ────────────────────────────────────────────────────────────────

/// How negative energy readings are normalised during extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignPolicy {
    /// Replace every reading with its absolute value.
    #[default]
    Absolutize,
    /// Keep readings exactly as stored.
    Preserve,
}

impl SignPolicy {
    /// Apply the policy to one reading.
    pub fn apply(self, energy_kwh: f64) -> f64 {
        match self {
            SignPolicy::Absolutize => energy_kwh.abs(),
            SignPolicy::Preserve => energy_kwh,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignPolicy::Absolutize => "absolutize",
            SignPolicy::Preserve => "preserve",
        }
    }
}

impl FromStr for SignPolicy {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "absolutize" => Ok(SignPolicy::Absolutize),
            "preserve" => Ok(SignPolicy::Preserve),
            other => Err(DashboardError::Other(anyhow::anyhow!(
                "unknown sign policy: {other}"
            ))),
        }
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Calendar range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateRangeFields")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked wire form of [`DateRange`].
#[derive(Deserialize)]
struct DateRangeFields {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<DateRangeFields> for DateRange {
    type Error = DashboardError;

    fn try_from(fields: DateRangeFields) -> Result<Self> {
        DateRange::new(fields.start, fields.end)
    }
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Smallest range covering every date in `dates`, or `None` when empty.
    pub fn covering<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut iter = dates.into_iter();
        let first = iter.next()?;
        let (start, end) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `true` when `date` lies within the range (both ends included).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Move the start by `days`, never past the end.
    pub fn shift_start(&self, days: i64) -> Self {
        let start = (self.start + Duration::days(days)).min(self.end);
        Self { start, ..*self }
    }

    /// Move the end by `days`, never before the start.
    pub fn shift_end(&self, days: i64) -> Self {
        let end = (self.end + Duration::days(days)).max(self.start);
        Self { end, ..*self }
    }

    /// Short label such as `2024-01-01 → 2024-01-31`.
    pub fn label(&self) -> String {
        format!("{} → {}", self.start, self.end)
    }

    /// `true` when both ends fall in the same calendar year.
    pub fn within_single_year(&self) -> bool {
        self.start.year() == self.end.year()
    }
}

// ── Aggregates ────────────────────────────────────────────────────────────────

/// Headline figures for the active date range.
///
/// Mean and maximum over an empty series are `None` ("no data").  The total
/// of an empty series is `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub total_energy: f64,
    pub average_daily_energy: Option<f64>,
    pub peak_daily_energy: Option<f64>,
    pub peak_hourly_energy: Option<f64>,
}

/// Mean energy per hour of day.  Hours without records have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlyProfile(BTreeMap<u32, f64>);

impl HourlyProfile {
    pub fn from_map(map: BTreeMap<u32, f64>) -> Self {
        Self(map)
    }

    /// Mean energy for `hour`, if any record fell in that hour.
    pub fn get(&self, hour: u32) -> Option<f64> {
        self.0.get(&hour).copied()
    }

    /// `(hour, mean)` pairs in ascending hour order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(h, v)| (*h, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hour with the highest mean, ties resolved to the earliest hour.
    pub fn peak(&self) -> Option<(u32, f64)> {
        self.iter().fold(None, |best, (h, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((h, v)),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
