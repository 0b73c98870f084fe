//! Daily bar chart and hour-of-day line chart.

use pv_core::formatting::format_number;
use pv_core::models::{DailyRecord, DateRange, HourlyProfile};
use ratatui::{
    layout::Rect,
    style::Modifier,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::themes::Theme;

/// Bars carry hundredths of a kWh so two decimals survive the `u64` scale.
const BAR_SCALE: f64 = 100.0;

/// Narrowest bar that still fits a value label underneath.
const LABELLED_BAR_WIDTH: u16 = 5;

/// Last hour on the fixed x-axis of the hourly chart.
pub const LAST_HOUR: f64 = 23.0;

// ── Daily bars ────────────────────────────────────────────────────────────────

/// One bar of the daily chart.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub label: String,
    pub value: u64,
    pub text: String,
}

/// Consecutive days summed into one bar so `count` days fit in `max_bars`.
pub fn days_per_bar(count: usize, max_bars: usize) -> usize {
    if max_bars == 0 {
        return count.max(1);
    }
    count.div_ceil(max_bars).max(1)
}

/// Convert daily records into at most `max_bars` chart bars.
///
/// Longer ranges are folded into buckets of [`days_per_bar`] days, each
/// labelled with its first date and carrying the bucket total.  Dates are
/// shortened to `MM-DD` when the whole range sits in one year.  Negative
/// totals (possible with the `preserve` sign policy) draw as empty bars but
/// keep their value text.
pub fn daily_bars(daily: &[DailyRecord], range: &DateRange, max_bars: usize) -> Vec<DailyBar> {
    let date_format = if range.within_single_year() {
        "%m-%d"
    } else {
        "%Y-%m-%d"
    };
    daily
        .chunks(days_per_bar(daily.len(), max_bars))
        .filter_map(|bucket| {
            let first = bucket.first()?;
            let total: f64 = bucket.iter().map(|r| r.energy_kwh).sum();
            Some(DailyBar {
                label: first.date.format(date_format).to_string(),
                value: (total.max(0.0) * BAR_SCALE).round() as u64,
                text: format_number(total, 1),
            })
        })
        .collect()
}

/// Bar width and gap that fit `count` bars into `width` columns.
pub fn bar_layout(count: usize, width: u16) -> (u16, u16) {
    if count == 0 {
        return (1, 0);
    }
    let per_bar = (width as usize / count).min(u16::MAX as usize) as u16;
    match per_bar {
        0 | 1 => (1, 0),
        n => ((n - 1).min(9), 1),
    }
}

pub fn render_daily_chart(
    frame: &mut Frame,
    area: Rect,
    daily: &[DailyRecord],
    range: &DateRange,
    theme: &Theme,
) {
    let inner_width = area.width.saturating_sub(2);
    let per_bar = days_per_bar(daily.len(), usize::from(inner_width));
    let title = if per_bar > 1 {
        format!(" Daily Generation (kWh, {per_bar}-day totals) ")
    } else {
        " Daily Generation (kWh) ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.separator)
        .title(Span::styled(title, theme.header));

    if daily.is_empty() {
        render_empty_chart(frame, area, block, theme);
        return;
    }

    let bars_data = daily_bars(daily, range, usize::from(inner_width));
    let (bar_width, bar_gap) = bar_layout(bars_data.len(), inner_width);
    let labelled = bar_width >= LABELLED_BAR_WIDTH;

    let bars: Vec<Bar> = bars_data
        .iter()
        .map(|b| {
            let bar = Bar::default()
                .value(b.value)
                .style(theme.chart_daily)
                .value_style(theme.chart_daily.add_modifier(Modifier::REVERSED));
            if labelled {
                bar.label(b.label.clone()).text_value(b.text.clone())
            } else {
                bar.text_value(String::new())
            }
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .label_style(theme.chart_axis)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

// ── Hourly line ───────────────────────────────────────────────────────────────

/// `(hour, mean kWh)` points in ascending hour order.
pub fn hourly_points(profile: &HourlyProfile) -> Vec<(f64, f64)> {
    profile.iter().map(|(h, v)| (f64::from(h), v)).collect()
}

/// Upper y bound with a little headroom; never zero.
pub fn y_upper_bound(points: &[(f64, f64)]) -> f64 {
    let max = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Line chart of the hourly profile with the x-axis fixed to hours 0..=23.
pub fn render_hourly_chart(frame: &mut Frame, area: Rect, profile: &HourlyProfile, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.separator)
        .title(Span::styled(" Average Hourly Generation (kWh) ", theme.header));

    if profile.is_empty() {
        render_empty_chart(frame, area, block, theme);
        return;
    }

    let points = hourly_points(profile);
    let y_max = y_upper_bound(&points);
    let y_min = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::min);

    let dataset = Dataset::default()
        .name("avg kWh")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.chart_hourly)
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("Hour")
                .style(theme.chart_axis)
                .bounds([0.0, LAST_HOUR])
                .labels(["0", "6", "12", "18", "23"]),
        )
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([y_min, y_max])
                .labels([format_number(y_min, 1), format_number(y_max, 1)]),
        );

    frame.render_widget(chart, area);
}

fn render_empty_chart(frame: &mut Frame, area: Rect, block: Block, theme: &Theme) {
    let paragraph =
        Paragraph::new(Span::styled("No data for the selected range", theme.dim)).block(block);
    frame.render_widget(paragraph, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
