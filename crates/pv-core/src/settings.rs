use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};

use crate::models::{SignPolicy, DEFAULT_SHEET_INDEX};

/// Workbook read when `--file` is not given.
pub const DEFAULT_WORKBOOK: &str = "pv_data.xlsx";

/// `--file` value meaning "read the workbook bytes from stdin".
pub const STDIN_SOURCE: &str = "-";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Solar PV generation dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pv-dashboard",
    about = "Solar PV generation dashboard for spreadsheet exports",
    version
)]
pub struct Settings {
    /// Workbook to load, or '-' to read it from stdin [default: pv_data.xlsx]
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Zero-based worksheet position holding the generation records
    #[arg(long, default_value_t = DEFAULT_SHEET_INDEX)]
    pub sheet: usize,

    /// Presentation adapter
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "report"])]
    pub view: String,

    /// Report output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// First day of the initial date range (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the initial date range (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Normalisation applied to negative energy readings
    #[arg(long, default_value = "absolutize", value_parser = ["absolutize", "preserve"])]
    pub sign_policy: String,

    /// Include the raw daily and hourly tables in the report
    #[arg(long)]
    pub raw: bool,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved preferences
    #[arg(long)]
    pub clear: bool,

    /// Problems met while merging saved preferences, logged once the
    /// subscriber is installed.
    #[arg(skip)]
    pub warnings: Vec<String>,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Presentation preferences saved to `~/.pv-dashboard/last_used.json`.
///
/// The date range and the workbook are never saved.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Default location of the preferences file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Preferences path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".pv-dashboard").join("last_used.json")
    }

    /// Load from `path`, returning defaults when absent or unparseable.
    pub fn load_from(path: &Path) -> Self {
        Self::read_from(path).unwrap_or_default()
    }

    /// Load from `path`; defaults when absent, `Err` with a message when the
    /// file exists but cannot be parsed.
    pub fn read_from(path: &Path) -> Result<Self, String> {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Ok(Self::default());
        };
        serde_json::from_str(&content).map_err(|e| {
            format!("ignoring unreadable preferences at {}: {}", path.display(), e)
        })
    }

    /// Write to `path` via a temp file and rename, creating parents.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the preferences file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments merged with saved preferences.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Parse `args`, fill unset presentation flags from the preferences at
    /// `config_path`, then persist the merged preferences.  CLI always wins.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                settings
                    .warnings
                    .push(format!("failed to clear preferences: {e}"));
            }
            return settings.with_debug_applied();
        }

        let last = LastUsedParams::read_from(config_path).unwrap_or_else(|msg| {
            settings.warnings.push(msg);
            LastUsedParams::default()
        });

        // clap stores arg ids by field name (underscores), not flag spelling.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            settings
                .warnings
                .push(format!("failed to save preferences: {e}"));
        }

        settings.with_debug_applied()
    }

    /// `--debug` overrides the log level.
    fn with_debug_applied(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// `true` when the workbook should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.file
            .as_deref()
            .is_some_and(|p| p.as_os_str() == STDIN_SOURCE)
    }

    /// Workbook path, falling back to [`DEFAULT_WORKBOOK`].
    pub fn workbook_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK))
    }

    /// Parsed sign policy; the value parser already restricts the spelling.
    pub fn sign_policy(&self) -> SignPolicy {
        SignPolicy::from_str(&self.sign_policy).unwrap_or_default()
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
