//! Colour themes for the dashboard.
//!
//! Every theme is built from a small [`Palette`]; the classic theme also
//! drops bold and italic modifiers for minimal terminals.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Parse a `COLORFGBG` value (`"fg;bg"` or `"fg;default;bg"`).
///
/// Background colours 0–6 are dark, anything else numeric is light.
pub fn background_from_colorfgbg(value: &str) -> Option<BackgroundType> {
    let bg = value.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    Some(if bg <= 6 {
        BackgroundType::Dark
    } else {
        BackgroundType::Light
    })
}

/// Terminal background from the environment, assuming dark when unknown.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| background_from_colorfgbg(&v))
        .unwrap_or(BackgroundType::Dark)
}

// ── Palette ───────────────────────────────────────────────────────────────────

/// Base colours a theme is derived from.
#[derive(Debug, Clone, Copy)]
struct Palette {
    sun: Color,
    sky: Color,
    foreground: Color,
    muted: Color,
    faint: Color,
    good: Color,
    caution: Color,
    emphasis: bool,
}

const DARK: Palette = Palette {
    sun: Color::Yellow,
    sky: Color::Cyan,
    foreground: Color::White,
    muted: Color::Gray,
    faint: Color::DarkGray,
    good: Color::LightGreen,
    caution: Color::LightRed,
    emphasis: true,
};

const LIGHT: Palette = Palette {
    sun: Color::Rgb(200, 110, 0),
    sky: Color::Blue,
    foreground: Color::Black,
    muted: Color::DarkGray,
    faint: Color::Gray,
    good: Color::Green,
    caution: Color::Red,
    emphasis: true,
};

const CLASSIC: Palette = Palette {
    sun: Color::Yellow,
    sky: Color::Cyan,
    foreground: Color::White,
    muted: Color::Gray,
    faint: Color::DarkGray,
    good: Color::Green,
    caution: Color::Red,
    emphasis: false,
};

// ── Theme ─────────────────────────────────────────────────────────────────────

/// Styles consumed by the dashboard components.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    pub success: Style,
    pub warning: Style,

    pub kpi_border: Style,
    pub kpi_title: Style,
    pub kpi_value: Style,
    /// Value style when the aggregate has no data behind it.
    pub kpi_empty: Style,

    pub chart_daily: Style,
    pub chart_hourly: Style,
    pub chart_axis: Style,

    pub tab_active: Style,
    pub tab_inactive: Style,

    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
}

impl Theme {
    fn from_palette(p: Palette) -> Self {
        let fg = |c: Color| Style::default().fg(c);
        let strong = |c: Color| {
            if p.emphasis {
                fg(c).add_modifier(Modifier::BOLD)
            } else {
                fg(c)
            }
        };
        let kpi_empty = if p.emphasis {
            fg(p.faint).add_modifier(Modifier::ITALIC)
        } else {
            fg(p.faint)
        };

        Self {
            header: strong(p.sun),
            header_accent: fg(p.sky),
            separator: fg(p.faint),

            text: fg(p.foreground),
            dim: fg(p.faint),
            label: fg(p.muted),
            value: strong(p.foreground),

            success: fg(p.good),
            warning: fg(p.caution),

            kpi_border: fg(p.faint),
            kpi_title: fg(p.muted),
            kpi_value: strong(p.good),
            kpi_empty,

            chart_daily: fg(p.sun),
            chart_hourly: fg(p.sky),
            chart_axis: fg(p.muted),

            tab_active: strong(p.sun),
            tab_inactive: fg(p.muted),

            table_header: strong(p.sky),
            table_border: fg(p.faint),
            table_row: fg(p.foreground),
            table_row_alt: fg(p.muted),
        }
    }

    pub fn dark() -> Self {
        Self::from_palette(DARK)
    }

    pub fn light() -> Self {
        Self::from_palette(LIGHT)
    }

    /// Basic ANSI colours without bold or italic.
    pub fn classic() -> Self {
        Self::from_palette(CLASSIC)
    }

    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Theme for a `--theme` value; unknown names auto-detect.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    /// Style for a KPI value, dimmed when there is no data.
    pub fn kpi_style(&self, value: Option<f64>) -> Style {
        match value {
            Some(_) => self.kpi_value,
            None => self.kpi_empty,
        }
    }

    /// Alternating row style for table row `index`.
    pub fn row_style(&self, index: usize) -> Style {
        if index % 2 == 0 {
            self.table_row
        } else {
            self.table_row_alt
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
