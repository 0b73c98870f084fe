//! Raw data tables for the filtered daily and hourly series.
//!
//! Renders bordered [`ratatui::widgets::Table`]s with one row per record,
//! scrolled by a shared row offset, plus the placeholder shown when the
//! active range matched nothing.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use pv_core::formatting;
use pv_core::models::{DailyRecord, HourlyRecord};

use crate::themes::Theme;

/// Borders plus the header row.
const TABLE_CHROME_ROWS: u16 = 3;

/// Data rows that fit in a table drawn into `area_height` rows.
pub fn visible_rows(area_height: u16) -> usize {
    usize::from(area_height.saturating_sub(TABLE_CHROME_ROWS))
}

/// First row to draw so that scrolling stops once the last row is on screen.
pub fn clamp_offset(offset: usize, len: usize, visible: usize) -> usize {
    offset.min(len.saturating_sub(visible))
}

/// Render the daily records as a two-column table, starting at row `offset`.
pub fn render_daily_table(
    frame: &mut Frame,
    area: Rect,
    records: &[DailyRecord],
    offset: usize,
    theme: &Theme,
) {
    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Row::new(vec![
                Cell::from(r.date.format("%Y-%m-%d").to_string()),
                Cell::from(formatting::format_number(r.energy_kwh, 2)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    render_records_table(
        frame,
        area,
        "Daily Data",
        ["Date", "Daily generated electricity [kWh]"],
        rows,
        offset,
        theme,
    );
}

/// Render the hourly records as a two-column table, starting at row `offset`.
pub fn render_hourly_table(
    frame: &mut Frame,
    area: Rect,
    records: &[HourlyRecord],
    offset: usize,
    theme: &Theme,
) {
    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Row::new(vec![
                Cell::from(r.timestamp.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(formatting::format_number(r.energy_kwh, 2)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    render_records_table(
        frame,
        area,
        "Hourly Data",
        ["Date/Time", "Hourly generated electricity [kWh]"],
        rows,
        offset,
        theme,
    );
}

fn render_records_table(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    headers: [&str; 2],
    rows: Vec<Row>,
    offset: usize,
    theme: &Theme,
) {
    let len = rows.len();
    let visible = visible_rows(area.height);
    let first = clamp_offset(offset, len, visible);
    let title = if len > visible {
        format!(
            " {label} (rows {}-{} of {len}) ",
            first + 1,
            (first + visible).min(len)
        )
    } else {
        format!(" {label} ({len} rows) ")
    };

    let header = Row::new(headers.iter().map(|h| Cell::from(*h).style(theme.table_header))).height(1);
    let widths = [Constraint::Length(18), Constraint::Min(12)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text);

    let mut state = TableState::default().with_offset(first);
    frame.render_stateful_widget(table, area, &mut state);
}

/// Render a "no data" placeholder when the active range matched no records.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data for the selected range", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Widen the range with '[' / '}' or press 'r' to reset it.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" PV Dashboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_daily() -> Vec<DailyRecord> {
        vec![
            DailyRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                energy_kwh: 1234.5,
            },
            DailyRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                energy_kwh: 3.0,
            },
        ]
    }

    fn make_hourly() -> Vec<HourlyRecord> {
        (6..10)
            .map(|h| HourlyRecord {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(h, 0, 0)
                    .unwrap(),
                energy_kwh: h as f64 * 0.5,
            })
            .collect()
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_render_daily_table_shows_rows() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_daily_table(frame, frame.area(), &make_daily(), 0, &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Daily Data (2 rows)"));
        assert!(text.contains("2024-01-01"));
        assert!(text.contains("1,234.50"));
    }

    #[test]
    fn test_render_hourly_table_shows_time() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let theme = Theme::light();
        terminal
            .draw(|frame| render_hourly_table(frame, frame.area(), &make_hourly(), 0, &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("2024-01-01 06:00"));
        assert!(text.contains("4.50"));
    }

    fn two_days_hourly() -> Vec<HourlyRecord> {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..48)
            .map(|h| HourlyRecord {
                timestamp: first + chrono::Duration::hours(h),
                energy_kwh: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_visible_rows_and_clamp_offset() {
        assert_eq!(visible_rows(20), 17);
        assert_eq!(visible_rows(2), 0);
        assert_eq!(clamp_offset(0, 48, 17), 0);
        assert_eq!(clamp_offset(10, 48, 17), 10);
        assert_eq!(clamp_offset(usize::MAX, 48, 17), 31);
        assert_eq!(clamp_offset(5, 3, 17), 0);
    }

    #[test]
    fn test_render_hourly_table_scrolls_to_tail() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let theme = Theme::dark();
        let records = two_days_hourly();

        terminal
            .draw(|frame| render_hourly_table(frame, frame.area(), &records, 0, &theme))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("rows 1-17 of 48"));
        assert!(!text.contains("2024-01-02 23:00"));

        terminal
            .draw(|frame| render_hourly_table(frame, frame.area(), &records, 47, &theme))
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("rows 32-48 of 48"));
        assert!(text.contains("2024-01-02 23:00"));
        assert!(!text.contains("2024-01-01 00:00"));
    }

    #[test]
    fn test_render_tables_empty_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_daily_table(frame, area, &[], 3, &theme);
                render_hourly_table(frame, area, &[], 3, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_no_data(frame, frame.area(), &theme))
            .unwrap();
        assert!(buffer_text(&terminal).contains("No data for the selected range"));
    }
}
