//! Interactive terminal dashboard.
//!
//! [`App`] owns the theme and the selected tab.  Its event loop keeps the
//! latest snapshot of a [`DashboardSession`]; range keys edit the session and
//! trigger a full recompute before the next frame is drawn.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::{debug, info};

use pv_data::session::{DashboardSession, DashboardSnapshot};

use crate::charts;
use crate::components::header::Header;
use crate::components::kpi_card;
use crate::presenter::Presenter;
use crate::table_view;
use crate::themes::Theme;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which body the dashboard is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Daily bar chart and hourly profile line chart.
    Overview,
    /// Filtered daily and hourly records as tables.
    RawData,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Overview, Tab::RawData];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::RawData => "Raw Data",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Overview => 0,
            Tab::RawData => 1,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Overview => Tab::RawData,
            Tab::RawData => Tab::Overview,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the interactive dashboard.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Workbook name shown in the header.
    pub source_name: String,
    pub tab: Tab,
    /// First row drawn in the Raw Data tables.
    pub scroll: usize,
    /// Rows in the longer of the two raw tables for the current snapshot.
    row_count: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

/// Rows moved by `PgUp` / `PgDn`.
const PAGE_ROWS: usize = 10;

impl App {
    pub fn new(theme_name: &str, source_name: impl Into<String>) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            source_name: source_name.into(),
            tab: Tab::Overview,
            scroll: 0,
            row_count: 0,
            should_quit: false,
        }
    }

    /// Record how many raw rows the current snapshot holds, keeping the
    /// scroll position inside them.
    pub fn set_row_count(&mut self, rows: usize) {
        self.row_count = rows;
        self.scroll = self.scroll.min(self.last_row());
    }

    fn last_row(&self) -> usize {
        self.row_count.saturating_sub(1)
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll = self
            .scroll
            .saturating_add_signed(delta)
            .min(self.last_row());
    }

    /// Apply one key press.  Returns `true` when the session's range changed
    /// and the snapshot must be recomputed.
    ///
    /// | Key            | Action                    |
    /// |----------------|---------------------------|
    /// | `q` / `Ctrl+C` | quit                      |
    /// | `Tab`          | switch tab                |
    /// | `[` / `]`      | move range start −1 / +1  |
    /// | `{` / `}`      | move range end −1 / +1    |
    /// | `r`            | reset to the full span    |
    /// | `j` / `k`, arrows, `PgDn` / `PgUp`, `Home` / `End` | scroll Raw Data |
    pub fn handle_key(&mut self, key: KeyEvent, session: &mut DashboardSession) -> bool {
        let before = session.range();
        let raw = self.tab == Tab::RawData;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.tab = self.tab.next(),
            KeyCode::Char('[') => session.shift_start(-1),
            KeyCode::Char(']') => session.shift_start(1),
            KeyCode::Char('{') => session.shift_end(-1),
            KeyCode::Char('}') => session.shift_end(1),
            KeyCode::Char('r') | KeyCode::Char('R') => session.reset_range(),
            KeyCode::Char('j') | KeyCode::Down if raw => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up if raw => self.scroll_by(-1),
            KeyCode::PageDown if raw => self.scroll_by(PAGE_ROWS as isize),
            KeyCode::PageUp if raw => self.scroll_by(-(PAGE_ROWS as isize)),
            KeyCode::Home if raw => self.scroll = 0,
            KeyCode::End if raw => self.scroll = self.last_row(),
            _ => {}
        }
        let changed = session.range() != before;
        if changed {
            self.scroll = 0;
        }
        changed
    }

    /// Render one frame for `snapshot`.
    pub fn render(&self, frame: &mut Frame, snapshot: &DashboardSnapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // header
                Constraint::Length(4), // KPI cards
                Constraint::Length(1), // tabs
                Constraint::Min(6),    // body
                Constraint::Length(1), // footer
            ])
            .split(frame.area());

        let header = Header::new(
            &self.source_name,
            &snapshot.sheet_name,
            snapshot.range,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(header.to_lines()), chunks[0]);
        kpi_card::render_kpi_row(frame, chunks[1], &snapshot.kpis, &self.theme);
        self.render_tabs(frame, chunks[2]);

        if snapshot.is_empty() {
            table_view::render_no_data(frame, chunks[3], &self.theme);
        } else {
            match self.tab {
                Tab::Overview => self.render_overview(frame, chunks[3], snapshot),
                Tab::RawData => self.render_raw_data(frame, chunks[3], snapshot),
            }
        }

        frame.render_widget(Paragraph::new(self.footer_line(snapshot)), chunks[4]);
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(Span::styled("|", self.theme.separator));
        frame.render_widget(tabs, area);
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        charts::render_daily_chart(frame, rows[0], &snapshot.daily, &snapshot.range, &self.theme);
        charts::render_hourly_chart(frame, rows[1], &snapshot.profile, &self.theme);
    }

    fn render_raw_data(&self, frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        table_view::render_daily_table(
            frame,
            columns[0],
            &snapshot.daily,
            self.scroll,
            &self.theme,
        );
        table_view::render_hourly_table(
            frame,
            columns[1],
            &snapshot.hourly,
            self.scroll,
            &self.theme,
        );
    }

    fn footer_line(&self, snapshot: &DashboardSnapshot) -> Line<'static> {
        let keys = match self.tab {
            Tab::Overview => "  q quit · Tab switch · [ ] start · { } end · r reset",
            Tab::RawData => "  q quit · Tab switch · [ ] { } range · j/k PgUp/PgDn scroll",
        };
        Line::from(vec![
            Span::styled(
                format!(
                    "✓ Loaded sheet '{}' from {}",
                    snapshot.sheet_name, self.source_name
                ),
                self.theme.success,
            ),
            Span::styled(keys, self.theme.dim),
        ])
    }

    fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        session: &mut DashboardSession,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);
        let mut snapshot = session.snapshot().map_err(io::Error::other)?;
        self.set_row_count(snapshot.daily.len().max(snapshot.hourly.len()));

        loop {
            terminal.draw(|frame| self.render(frame, &snapshot))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key, session) {
                        snapshot = session.snapshot().map_err(io::Error::other)?;
                        self.set_row_count(snapshot.daily.len().max(snapshot.hourly.len()));
                        debug!(
                            "Recomputed for {}: total {:.2} kWh",
                            snapshot.range.label(),
                            snapshot.kpis.total_energy
                        );
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }
}

impl Presenter for App {
    /// Run the dashboard until `q` / `Ctrl+C`.
    ///
    /// The terminal is restored even when a recompute fails.
    fn present(&mut self, mut session: DashboardSession) -> io::Result<()> {
        info!("Starting interactive dashboard for {}", self.source_name);
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run(&mut terminal, &mut session);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
