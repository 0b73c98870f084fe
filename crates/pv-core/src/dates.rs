//! Date and date/time coercion for worksheet cells.
//!
//! Workbooks store dates three ways: as typed date cells, as bare Excel
//! serial numbers, or as text.  [`cell_to_datetime`] accepts all three.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::Cell;

/// Text layouts accepted for date/time values, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Text layouts accepted for date-only values.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Largest serial Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Convert an Excel serial day number into a date/time.
///
/// Uses the 1900 date system with the customary 1899-12-30 epoch, which
/// absorbs Excel's phantom 1900-02-29 for every serial after February 1900.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let days = serial.trunc() as i64;
    let millis = ((serial - serial.trunc()) * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::milliseconds(millis))
}

/// Parse a text value as a date/time, accepting date-only text as midnight.
pub fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    parse_date_str(s).map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a text value as a calendar date, accepting date/time text too.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Coerce a worksheet cell into a date/time.
///
/// Returns `None` for cells that cannot represent a point in time.
pub fn cell_to_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Number(n) => excel_serial_to_datetime(*n),
        Cell::Text(s) => parse_datetime_str(s),
        Cell::Empty | Cell::Bool(_) | Cell::Error(_) => None,
    }
}

/// Coerce a worksheet cell into a calendar date, discarding any time part.
pub fn cell_to_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Text(s) => parse_date_str(s),
        other => cell_to_datetime(other).map(|dt| dt.date()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_excel_serial_whole_day() {
        // 45292 is 2024-01-01 in the 1900 date system.
        assert_eq!(
            excel_serial_to_datetime(45292.0),
            Some(dt("2024-01-01 00:00:00"))
        );
    }

    #[test]
    fn test_excel_serial_with_time_fraction() {
        assert_eq!(
            excel_serial_to_datetime(45292.625),
            Some(dt("2024-01-01 15:00:00"))
        );
    }

    #[test]
    fn test_excel_serial_out_of_range() {
        assert!(excel_serial_to_datetime(-1.0).is_none());
        assert!(excel_serial_to_datetime(f64::INFINITY).is_none());
        assert!(excel_serial_to_datetime(1e9).is_none());
    }

    #[test]
    fn test_parse_datetime_str_variants() {
        let expected = dt("2024-06-01 13:00:00");
        assert_eq!(parse_datetime_str("2024-06-01 13:00:00"), Some(expected));
        assert_eq!(parse_datetime_str("2024-06-01T13:00:00"), Some(expected));
        assert_eq!(parse_datetime_str("2024-06-01 13:00"), Some(expected));
        assert_eq!(parse_datetime_str("06/01/2024 13:00"), Some(expected));
        assert_eq!(parse_datetime_str("01.06.2024 13:00"), Some(expected));
    }

    #[test]
    fn test_parse_datetime_str_date_only_is_midnight() {
        assert_eq!(
            parse_datetime_str("2024-06-01"),
            Some(dt("2024-06-01 00:00:00"))
        );
    }

    #[test]
    fn test_parse_date_str_accepts_datetime_text() {
        assert_eq!(
            parse_date_str("2024-06-01 13:00:00"),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_datetime_str("not a date").is_none());
        assert!(parse_date_str("2024-13-45").is_none());
        assert!(parse_datetime_str("").is_none());
    }

    #[test]
    fn test_cell_to_date_variants() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(cell_to_date(&Cell::Number(45292.0)), day);
        assert_eq!(cell_to_date(&Cell::Text("2024-01-01".to_string())), day);
        assert_eq!(
            cell_to_date(&Cell::DateTime(dt("2024-01-01 08:30:00"))),
            day
        );
        assert_eq!(cell_to_date(&Cell::Bool(true)), None);
    }
}
