use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the PV dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The workbook path does not exist.
    #[error("Workbook not found: {0}")]
    SourceNotFound(PathBuf),

    /// The workbook exists (or was supplied as bytes) but could not be decoded.
    #[error("Failed to read workbook {source_name}: {reason}")]
    SourceUnreadable { source_name: String, reason: String },

    /// The requested worksheet position is beyond the workbook's sheets.
    #[error("Worksheet index {index} not found (workbook has {available} sheets)")]
    SheetMissing { index: usize, available: usize },

    /// A required column header is absent after whitespace trimming.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A date or date/time cell could not be parsed.
    #[error("Malformed date in column '{column}' at row {row}: {value}")]
    MalformedDate {
        column: String,
        row: usize,
        value: String,
    },

    /// An energy cell held text that is not a number.
    #[error("Malformed number in column '{column}' at row {row}: {value}")]
    MalformedNumber {
        column: String,
        row: usize,
        value: String,
    },

    /// A date range whose start lies after its end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: String, end: String },

    /// The daily series is empty, so no default date range exists.
    #[error("No daily generation records found")]
    EmptyDataset,

    /// A JSON document could not be produced or parsed.
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DashboardError {
    /// `true` for failures the user fixes by supplying a different workbook.
    ///
    /// These are reported as a warning rather than a hard failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DashboardError::SourceNotFound(_)
                | DashboardError::SourceUnreadable { .. }
                | DashboardError::SheetMissing { .. }
        )
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
