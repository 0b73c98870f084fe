use pv_core::formatting::{format_optional, NO_DATA};
use pv_core::models::KpiSet;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

/// One boxed headline figure.
pub struct KpiCard<'a> {
    pub title: &'a str,
    pub value: Option<f64>,
    pub unit: &'a str,
    pub theme: &'a Theme,
}

impl<'a> KpiCard<'a> {
    pub fn new(title: &'a str, value: Option<f64>, unit: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            value,
            unit,
            theme,
        }
    }

    /// `"1,234.56 kWh"`, or [`NO_DATA`] without a unit.
    pub fn value_text(&self) -> String {
        match self.value {
            Some(_) => format!("{} {}", format_optional(self.value), self.unit),
            None => NO_DATA.to_string(),
        }
    }

    /// Title and value lines, each fitted to `width` display columns.
    pub fn to_lines(&self, width: usize) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled(fit(self.title, width), self.theme.kpi_title)),
            Line::from(Span::styled(
                fit(&self.value_text(), width),
                self.theme.kpi_style(self.value),
            )),
        ]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.kpi_border);
        let inner_width = area.width.saturating_sub(2) as usize;
        let paragraph = Paragraph::new(self.to_lines(inner_width))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
    }
}

/// Truncate `text` to `width` display columns, marking the cut with `…`.
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.to_string().width();
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Draw the four KPI cards side by side.
pub fn render_kpi_row(frame: &mut Frame, area: Rect, kpis: &KpiSet, theme: &Theme) {
    let cards = [
        KpiCard::new("Total Energy Generated", Some(kpis.total_energy), "kWh", theme),
        KpiCard::new("Average Daily Energy", kpis.average_daily_energy, "kWh", theme),
        KpiCard::new("Peak Daily Energy", kpis.peak_daily_energy, "kWh", theme),
        KpiCard::new("Peak Hourly Energy", kpis.peak_hourly_energy, "kWh", theme),
    ];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        card.render(frame, *column);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
