//! Workbook loading for the PV dashboard.
//!
//! Opens an `.xlsx`/`.xls`/`.ods` workbook from disk or from an in-memory
//! upload, picks one worksheet by position and converts it into a
//! format-independent [`RawSheet`].

use std::io::{Cursor, Read, Seek};
use std::path::PathBuf;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use pv_core::dates::parse_datetime_str;
use pv_core::error::{DashboardError, Result};
use pv_core::models::{Cell, RawSheet};
use tracing::{debug, info};

// ── WorkbookSource ────────────────────────────────────────────────────────────

/// Where the workbook comes from.
#[derive(Debug, Clone)]
pub enum WorkbookSource {
    /// A workbook file on the local filesystem.
    Path(PathBuf),
    /// Workbook bytes supplied directly, e.g. piped on stdin.
    Bytes { name: String, data: Vec<u8> },
}

impl WorkbookSource {
    /// Name shown to the user when reporting success or failure.
    pub fn display_name(&self) -> String {
        match self {
            WorkbookSource::Path(p) => p.display().to_string(),
            WorkbookSource::Bytes { name, .. } => name.clone(),
        }
    }

    /// Read an uploaded workbook from any reader (typically stdin).
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(WorkbookSource::Bytes {
            name: name.into(),
            data,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load worksheet number `sheet_index` (zero-based) from `source`.
///
/// * [`DashboardError::SourceNotFound`] – the path does not exist.
/// * [`DashboardError::SourceUnreadable`] – the bytes are not a workbook.
/// * [`DashboardError::SheetMissing`] – the workbook has too few sheets.
pub fn load(source: &WorkbookSource, sheet_index: usize) -> Result<RawSheet> {
    let source_name = source.display_name();
    let sheet = match source {
        WorkbookSource::Path(path) => {
            if !path.exists() {
                return Err(DashboardError::SourceNotFound(path.clone()));
            }
            let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(&source_name, e))?;
            read_sheet(&mut workbook, sheet_index, &source_name)?
        }
        WorkbookSource::Bytes { data, .. } => {
            let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.clone()))
                .map_err(|e| unreadable(&source_name, e))?;
            read_sheet(&mut workbook, sheet_index, &source_name)?
        }
    };

    info!(
        "Loaded sheet '{}' (index {}) from {}: {} columns, {} rows",
        sheet.name,
        sheet_index,
        source_name,
        sheet.columns().len(),
        sheet.row_count()
    );
    Ok(sheet)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn unreadable(source_name: &str, err: impl std::fmt::Display) -> DashboardError {
    DashboardError::SourceUnreadable {
        source_name: source_name.to_string(),
        reason: err.to_string(),
    }
}

/// Pull one worksheet out of an opened workbook.
fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet_index: usize,
    source_name: &str,
) -> Result<RawSheet> {
    let names = workbook.sheet_names();
    let range = match workbook.worksheet_range_at(sheet_index) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(unreadable(source_name, e)),
        None => {
            return Err(DashboardError::SheetMissing {
                index: sheet_index,
                available: names.len(),
            })
        }
    };
    let name = names.get(sheet_index).cloned().unwrap_or_default();
    // The range begins at the first used cell, not at A1.
    let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(header_name).collect())
        .unwrap_or_default();
    let data: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    debug!("Sheet '{}' header on row {}: {:?}", name, header_row, columns);
    Ok(RawSheet::new(name, columns, data).with_header_row(header_row))
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Map a calamine cell onto the workbook-independent [`Cell`].
fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_datetime_str(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_xlsxwriter::{Format, Workbook};
    use std::path::Path;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Three-sheet workbook whose third sheet carries the generation data.
    fn build_pv_workbook() -> Workbook {
        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .set_name("Summary")
            .unwrap()
            .write_string(0, 0, "PV plant")
            .unwrap();
        workbook
            .add_worksheet()
            .set_name("Notes")
            .unwrap()
            .write_string(0, 0, "n/a")
            .unwrap();

        let date_fmt = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        sheet.set_name("Generation").unwrap();
        sheet.write_string(0, 0, " Date ").unwrap();
        sheet
            .write_string(0, 1, "Daily generated electricity [kWh] ")
            .unwrap();
        sheet.write_string(0, 2, "Date/Time").unwrap();
        sheet
            .write_string(0, 3, "  Hourly generated electricity [kWh]")
            .unwrap();

        // 45292 = 2024-01-01
        sheet
            .write_number_with_format(1, 0, 45292.0, &date_fmt)
            .unwrap();
        sheet.write_number(1, 1, 5.0).unwrap();
        sheet.write_string(1, 2, "2024-01-01 10:00:00").unwrap();
        sheet.write_number(1, 3, -1.5).unwrap();

        sheet.write_string(2, 0, "2024-01-02").unwrap();
        sheet.write_number(2, 1, -3.0).unwrap();
        sheet.write_string(2, 2, "2024-01-01 11:00:00").unwrap();
        sheet.write_number(2, 3, 2.0).unwrap();
        workbook
    }

    fn save_workbook(dir: &Path, name: &str, mut workbook: Workbook) -> PathBuf {
        let path = dir.join(name);
        workbook.save(&path).unwrap();
        path
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_third_sheet_from_path() {
        let dir = TempDir::new().unwrap();
        let path = save_workbook(dir.path(), "pv.xlsx", build_pv_workbook());

        let sheet = load(&WorkbookSource::Path(path), 2).unwrap();
        assert_eq!(sheet.name, "Generation");
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(
            sheet.columns(),
            &[
                "Date",
                "Daily generated electricity [kWh]",
                "Date/Time",
                "Hourly generated electricity [kWh]",
            ]
        );
    }

    #[test]
    fn test_load_converts_typed_date_cells() {
        let dir = TempDir::new().unwrap();
        let path = save_workbook(dir.path(), "pv.xlsx", build_pv_workbook());

        let sheet = load(&WorkbookSource::Path(path), 2).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(sheet.cell(0, 0), &Cell::DateTime(expected));
        assert_eq!(sheet.cell(0, 1), &Cell::Number(5.0));
        assert_eq!(sheet.cell(1, 0), &Cell::Text("2024-01-02".to_string()));
    }

    #[test]
    fn test_load_from_uploaded_bytes() {
        let mut workbook = build_pv_workbook();
        let data = workbook.save_to_buffer().unwrap();
        let source = WorkbookSource::from_reader("upload.xlsx", data.as_slice()).unwrap();

        let sheet = load(&source, 2).unwrap();
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(source.display_name(), "upload.xlsx");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.xlsx");
        let err = load(&WorkbookSource::Path(path.clone()), 2).unwrap_err();
        match err {
            DashboardError::SourceNotFound(p) => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_rejects_non_workbook_bytes() {
        let source = WorkbookSource::Bytes {
            name: "notes.txt".to_string(),
            data: b"just some text".to_vec(),
        };
        let err = load(&source, 2).unwrap_err();
        assert!(matches!(err, DashboardError::SourceUnreadable { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_load_sheet_missing() {
        let dir = TempDir::new().unwrap();
        let mut workbook = Workbook::new();
        workbook.add_worksheet().write_string(0, 0, "only").unwrap();
        let path = save_workbook(dir.path(), "single.xlsx", workbook);

        let err = load(&WorkbookSource::Path(path), 2).unwrap_err();
        match err {
            DashboardError::SheetMissing { index, available } => {
                assert_eq!(index, 2);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_empty_worksheet_has_no_columns() {
        let dir = TempDir::new().unwrap();
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        let path = save_workbook(dir.path(), "blank.xlsx", workbook);

        let sheet = load(&WorkbookSource::Path(path), 0).unwrap();
        assert!(sheet.columns().is_empty());
        assert_eq!(sheet.row_count(), 0);
    }

    #[test]
    fn test_load_header_below_blank_rows() {
        let dir = TempDir::new().unwrap();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 0, "Date").unwrap();
        sheet
            .write_string(2, 1, "Daily generated electricity [kWh]")
            .unwrap();
        sheet.write_string(3, 0, "2024-01-01").unwrap();
        sheet.write_number(3, 1, 4.0).unwrap();
        sheet.write_string(4, 0, "not a date").unwrap();
        sheet.write_number(4, 1, 2.0).unwrap();
        let path = save_workbook(dir.path(), "offset.xlsx", workbook);

        let sheet = load(&WorkbookSource::Path(path), 0).unwrap();
        assert_eq!(sheet.header_row(), 3);
        assert_eq!(sheet.row_count(), 2);

        let err = crate::extract::extract_daily(&sheet, pv_core::models::SignPolicy::Absolutize)
            .unwrap_err();
        match err {
            DashboardError::MalformedDate { row, value, .. } => {
                assert_eq!(row, 5);
                assert_eq!(value, "not a date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ── convert_cell ──────────────────────────────────────────────────────────

    #[test]
    fn test_convert_cell_scalars() {
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(convert_cell(&Data::Int(4)), Cell::Number(4.0));
        assert_eq!(convert_cell(&Data::Float(2.5)), Cell::Number(2.5));
        assert_eq!(convert_cell(&Data::Bool(true)), Cell::Bool(true));
        assert_eq!(
            convert_cell(&Data::String("x".to_string())),
            Cell::Text("x".to_string())
        );
    }

    #[test]
    fn test_convert_cell_iso_datetime() {
        let cell = convert_cell(&Data::DateTimeIso("2024-01-01T06:00:00".to_string()));
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert_eq!(cell, Cell::DateTime(expected));
    }

    #[test]
    fn test_convert_cell_error_is_missing() {
        let cell = convert_cell(&Data::Error(calamine::CellErrorType::NA));
        assert!(cell.is_missing());
    }
}
