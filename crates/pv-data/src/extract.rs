//! Record extraction from a loaded worksheet.
//!
//! Selects the daily and hourly column pairs, drops incomplete rows, coerces
//! dates and numbers, and applies the configured [`SignPolicy`].

use pv_core::dates::{cell_to_date, cell_to_datetime};
use pv_core::error::{DashboardError, Result};
use pv_core::models::{
    Cell, DailyRecord, HourlyRecord, RawSheet, SignPolicy, DAILY_DATE_COLUMN,
    DAILY_ENERGY_COLUMN, HOURLY_ENERGY_COLUMN, HOURLY_TIMESTAMP_COLUMN,
};
use tracing::debug;

/// Extract the daily series from `Date` / `Daily generated electricity [kWh]`.
///
/// Rows missing either value are dropped.  Source row order is preserved.
pub fn extract_daily(sheet: &RawSheet, policy: SignPolicy) -> Result<Vec<DailyRecord>> {
    extract_pairs(
        sheet,
        DAILY_DATE_COLUMN,
        DAILY_ENERGY_COLUMN,
        policy,
        cell_to_date,
        |date, energy_kwh| DailyRecord { date, energy_kwh },
    )
}

/// Extract the hourly series from `Date/Time` / `Hourly generated electricity [kWh]`.
///
/// Same contract as [`extract_daily`], keeping the time of day.
pub fn extract_hourly(sheet: &RawSheet, policy: SignPolicy) -> Result<Vec<HourlyRecord>> {
    extract_pairs(
        sheet,
        HOURLY_TIMESTAMP_COLUMN,
        HOURLY_ENERGY_COLUMN,
        policy,
        cell_to_datetime,
        |timestamp, energy_kwh| HourlyRecord {
            timestamp,
            energy_kwh,
        },
    )
}

fn extract_pairs<K, T>(
    sheet: &RawSheet,
    key_column: &str,
    energy_column: &str,
    policy: SignPolicy,
    parse_key: impl Fn(&Cell) -> Option<K>,
    build: impl Fn(K, f64) -> T,
) -> Result<Vec<T>> {
    let key_idx = sheet
        .column_index(key_column)
        .ok_or_else(|| DashboardError::MissingColumn(key_column.to_string()))?;
    let energy_idx = sheet
        .column_index(energy_column)
        .ok_or_else(|| DashboardError::MissingColumn(energy_column.to_string()))?;

    let mut records = Vec::with_capacity(sheet.row_count());
    let mut dropped = 0usize;

    for row in 0..sheet.row_count() {
        let key_cell = sheet.cell(row, key_idx);
        let energy_cell = sheet.cell(row, energy_idx);
        if key_cell.is_missing() || energy_cell.is_missing() {
            dropped += 1;
            continue;
        }

        let sheet_row = sheet.sheet_row(row);
        let key = parse_key(key_cell).ok_or_else(|| DashboardError::MalformedDate {
            column: key_column.to_string(),
            row: sheet_row,
            value: key_cell.display_value(),
        })?;
        let energy = parse_energy(energy_cell, energy_column, sheet_row)?;

        records.push(build(key, policy.apply(energy)));
    }

    debug!(
        "Extracted {} records from '{}' ({} incomplete rows dropped)",
        records.len(),
        key_column,
        dropped
    );
    Ok(records)
}

fn parse_energy(cell: &Cell, column: &str, sheet_row: usize) -> Result<f64> {
    let parsed = match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| DashboardError::MalformedNumber {
            column: column.to_string(),
            row: sheet_row,
            value: cell.display_value(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn daily_sheet(rows: Vec<Vec<Cell>>) -> RawSheet {
        RawSheet::new(
            "PV",
            vec![
                "Date ".to_string(),
                " Daily generated electricity [kWh]".to_string(),
            ],
            rows,
        )
    }

    fn hourly_sheet(rows: Vec<Vec<Cell>>) -> RawSheet {
        RawSheet::new(
            "PV",
            vec![
                "Date/Time".to_string(),
                "Hourly generated electricity [kWh]".to_string(),
            ],
            rows,
        )
    }

    #[test]
    fn test_extract_daily_drops_missing_and_absolutizes() {
        let sheet = daily_sheet(vec![
            vec![text("2024-01-01"), Cell::Number(5.0)],
            vec![text("2024-01-02"), Cell::Number(-3.0)],
            vec![text("2024-01-03"), Cell::Empty],
        ]);

        let records = extract_daily(&sheet, SignPolicy::Absolutize).unwrap();
        assert_eq!(
            records,
            vec![
                DailyRecord {
                    date: d("2024-01-01"),
                    energy_kwh: 5.0
                },
                DailyRecord {
                    date: d("2024-01-02"),
                    energy_kwh: 3.0
                },
            ]
        );
    }

    #[test]
    fn test_extract_daily_preserve_policy_keeps_sign() {
        let sheet = daily_sheet(vec![vec![text("2024-01-02"), Cell::Number(-3.0)]]);
        let records = extract_daily(&sheet, SignPolicy::Preserve).unwrap();
        assert_eq!(records[0].energy_kwh, -3.0);
    }

    #[test]
    fn test_extract_daily_missing_date_dropped() {
        let sheet = daily_sheet(vec![
            vec![Cell::Empty, Cell::Number(1.0)],
            vec![Cell::Error("#N/A".to_string()), Cell::Number(2.0)],
            vec![text("   "), Cell::Number(3.0)],
            vec![text("2024-01-04"), Cell::Number(4.0)],
        ]);
        let records = extract_daily(&sheet, SignPolicy::Absolutize).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, d("2024-01-04"));
    }

    #[test]
    fn test_extract_daily_short_rows_count_as_missing() {
        let sheet = daily_sheet(vec![vec![text("2024-01-01")]]);
        assert!(extract_daily(&sheet, SignPolicy::Absolutize)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_extract_daily_preserves_row_order() {
        let sheet = daily_sheet(vec![
            vec![text("2024-01-03"), Cell::Number(1.0)],
            vec![text("2024-01-01"), Cell::Number(2.0)],
            vec![text("2024-01-02"), Cell::Number(3.0)],
        ]);
        let dates: Vec<NaiveDate> = extract_daily(&sheet, SignPolicy::Absolutize)
            .unwrap()
            .into_iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(dates, vec![d("2024-01-03"), d("2024-01-01"), d("2024-01-02")]);
    }

    #[test]
    fn test_extract_daily_malformed_date_reports_row() {
        let sheet = daily_sheet(vec![
            vec![text("2024-01-01"), Cell::Number(1.0)],
            vec![text("soon"), Cell::Number(2.0)],
        ]);
        match extract_daily(&sheet, SignPolicy::Absolutize).unwrap_err() {
            DashboardError::MalformedDate { column, row, value } => {
                assert_eq!(column, "Date");
                assert_eq!(row, 3);
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_daily_malformed_number() {
        let sheet = daily_sheet(vec![vec![text("2024-01-01"), text("lots")]]);
        let err = extract_daily(&sheet, SignPolicy::Absolutize).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedNumber { row: 2, .. }));
    }

    #[test]
    fn test_extract_daily_error_row_counts_leading_blank_rows() {
        let sheet = daily_sheet(vec![
            vec![text("2024-01-01"), Cell::Number(1.0)],
            vec![text("2024-01-02"), text("lots")],
        ])
        .with_header_row(3);
        let err = extract_daily(&sheet, SignPolicy::Absolutize).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedNumber { row: 5, .. }));
    }

    #[test]
    fn test_extract_daily_numeric_text_energy() {
        let sheet = daily_sheet(vec![vec![text("2024-01-01"), text(" -2.5 ")]]);
        let records = extract_daily(&sheet, SignPolicy::Absolutize).unwrap();
        assert_eq!(records[0].energy_kwh, 2.5);
    }

    #[test]
    fn test_extract_daily_missing_column() {
        let sheet = hourly_sheet(vec![]);
        let err = extract_daily(&sheet, SignPolicy::Absolutize).unwrap_err();
        match err {
            DashboardError::MissingColumn(name) => assert_eq!(name, "Date"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_hourly_combines_date_and_time() {
        let ts = NaiveDateTime::parse_from_str("2024-01-01 14:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let sheet = hourly_sheet(vec![
            vec![Cell::DateTime(ts), Cell::Number(-0.8)],
            vec![text("2024-01-01 15:00"), Cell::Number(1.2)],
            vec![Cell::Number(45292.75), Cell::Number(0.4)],
            vec![text("2024-01-01 17:00"), Cell::Empty],
        ]);

        let records = extract_hourly(&sheet, SignPolicy::Absolutize).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].timestamp, ts);
        assert_eq!(records[0].energy_kwh, 0.8);
        assert_eq!(records[1].hour_of_day(), 15);
        assert_eq!(records[2].hour_of_day(), 18);
    }

    #[test]
    fn test_extract_hourly_malformed_timestamp() {
        let sheet = hourly_sheet(vec![vec![Cell::Bool(true), Cell::Number(1.0)]]);
        let err = extract_hourly(&sheet, SignPolicy::Absolutize).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedDate { .. }));
    }

    #[test]
    fn test_extracted_energy_is_never_negative_under_absolutize() {
        let rows = (0..24)
            .map(|h| {
                vec![
                    text(&format!("2024-02-01 {:02}:00", h)),
                    Cell::Number(if h % 2 == 0 { -(h as f64) } else { h as f64 }),
                ]
            })
            .collect();
        let records = extract_hourly(&hourly_sheet(rows), SignPolicy::Absolutize).unwrap();
        assert_eq!(records.len(), 24);
        assert!(records.iter().all(|r| r.energy_kwh >= 0.0));
    }
}
