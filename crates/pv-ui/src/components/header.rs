use crate::themes::Theme;
use pv_core::models::DateRange;
use ratatui::text::{Line, Span};

/// Decorative marker placed either side of the application title.
pub const SUN: &str = "☀";

/// Dashboard header rendering four lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. `[ source | sheet | start → end (N days) ]`.
/// 4. An empty line.
pub struct Header<'a> {
    /// Workbook name shown to the user.
    pub source: &'a str,
    /// Worksheet the records were read from.
    pub sheet: &'a str,
    /// Active date range.
    pub range: DateRange,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: &'a str, sheet: &'a str, range: DateRange, theme: &'a Theme) -> Self {
        Self {
            source,
            sheet,
            range,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let days = self.range.days();
        let span_label = format!(
            "{} ({} day{})",
            self.range.label(),
            days,
            if days == 1 { "" } else { "s" }
        );

        vec![
            Line::from(vec![
                Span::styled(SUN, self.theme.header_accent),
                Span::styled(" SOLAR PV GENERATION DASHBOARD ", self.theme.header),
                Span::styled(SUN, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.source.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.sheet.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(span_label, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
