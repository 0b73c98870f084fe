mod bootstrap;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use pv_core::error::DashboardError;
use pv_core::models::DateRange;
use pv_core::settings::Settings;
use pv_data::reader::{self, WorkbookSource};
use pv_data::session::DashboardSession;
use pv_ui::app::App;
use pv_ui::presenter::Presenter;
use pv_ui::report::{ReportFormat, ReportPresenter};

const SOURCE_HINT: &str =
    "Supply a workbook with --file <path> or pipe one with --file - to begin.";

fn main() -> Result<ExitCode> {
    let settings = Settings::load_with_last_used();

    let app_dir = bootstrap::ensure_directories()?;
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| bootstrap::default_log_file(&settings.view, &app_dir));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("PV Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    for warning in &settings.warnings {
        tracing::warn!("{warning}");
    }
    tracing::info!(
        "View: {}, Format: {}, Sheet: {}, Sign policy: {}, Theme: {}",
        settings.view,
        settings.format,
        settings.sheet,
        settings.sign_policy,
        settings.theme
    );

    match run(&settings) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is_recoverable() => {
            tracing::warn!("{e}");
            eprintln!("⚠ {e}");
            eprintln!("ℹ {SOURCE_HINT}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn run(settings: &Settings) -> Result<(), DashboardError> {
    let source = resolve_source(settings)?;
    let source_name = source.display_name();

    let sheet = reader::load(&source, settings.sheet)?;
    let mut session = DashboardSession::new(sheet, settings.sign_policy())?;
    apply_initial_range(&mut session, settings.start, settings.end)?;

    tracing::info!(
        "Loaded sheet '{}' from {}, initial range {}, sign policy {}",
        session.sheet().name,
        source_name,
        session.range().label(),
        session.policy().as_str()
    );

    match settings.view.as_str() {
        "report" => {
            let format: ReportFormat = settings.format.parse()?;
            let mut presenter = ReportPresenter::new(io::stdout().lock(), format, source_name)
                .with_raw(settings.raw);
            presenter.present(session)?;
        }
        _ => {
            let mut app = App::new(&settings.theme, source_name);
            app.present(session)?;
        }
    }
    Ok(())
}

/// Stdin when `--file -` was given, otherwise the workbook path.
fn resolve_source(settings: &Settings) -> Result<WorkbookSource, DashboardError> {
    if settings.reads_stdin() {
        WorkbookSource::from_reader("stdin", io::stdin().lock())
    } else {
        Ok(WorkbookSource::Path(settings.workbook_path()))
    }
}

/// Narrow the session to `--start`/`--end`; a missing bound keeps the
/// dataset's own first or last day.
fn apply_initial_range(
    session: &mut DashboardSession,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), DashboardError> {
    if start.is_none() && end.is_none() {
        return Ok(());
    }
    let full = session.full_range();
    let range = DateRange::new(
        start.unwrap_or_else(|| full.start()),
        end.unwrap_or_else(|| full.end()),
    )?;
    session.set_range(range);
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
