use chrono::{Datelike, NaiveDate};
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::calendar::{parse_date, parse_month_spec};
use crate::error::{AttendanceError, Result};
use crate::models::{DateRange, ReportFilters};
use crate::time_utils::{get_system_timezone, resolve_timezone_name, TimezoneHandler};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Tutor attendance reports from exported attendance data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tutor-attendance",
    about = "Tutor attendance reports from exported attendance data",
    version
)]
pub struct Settings {
    /// Attendance data file (.json / .jsonl) or directory
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// First month of the report (YYYY-MM, defaults to the current month)
    #[arg(long)]
    pub from: Option<String>,

    /// Last month of the report (YYYY-MM, defaults to --from)
    #[arg(long)]
    pub to: Option<String>,

    /// Override today's date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<String>,

    /// Timezone used to decide today's date (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Only include tutors whose name contains this text
    #[arg(long, default_value = "")]
    pub tutor: String,

    /// Only include centers whose name contains this text
    #[arg(long, default_value = "")]
    pub center: String,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "csv", "summary", "json"])]
    pub format: String,

    /// Write the report to this file (or directory) instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.tutor-attendance/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".tutor-attendance").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                debug!("Could not clear {}: {}", config_path.display(), e);
            }
            return Self::resolve_auto_values(settings, None);
        }

        let last = LastUsedParams::load_from(config_path);
        let stored_timezone = last.timezone.clone();

        // CLI always wins over persisted values.
        if settings.data.is_none() {
            settings.data = last.data;
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::resolve_auto_values(settings, stored_timezone);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            debug!("Could not persist {}: {}", config_path.display(), e);
        }

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    ///
    /// An unknown timezone is replaced by `stored_timezone` when that one is
    /// valid, else by the system zone, else by UTC.
    fn resolve_auto_values(mut settings: Settings, stored_timezone: Option<String>) -> Settings {
        let requested = resolve_timezone_name(&settings.timezone);
        settings.timezone = if TimezoneHandler::validate_timezone(&requested) {
            requested
        } else {
            let fallback = stored_timezone
                .map(|name| resolve_timezone_name(&name))
                .into_iter()
                .chain(std::iter::once(get_system_timezone()))
                .find(|name| TimezoneHandler::validate_timezone(name))
                .unwrap_or_else(|| "UTC".to_string());
            warn!(
                "Unrecognised timezone \"{}\", using {} instead",
                requested, fallback
            );
            fallback
        };

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The reference date for clamping: `--today` when given, otherwise the
    /// current date in the configured timezone.
    pub fn resolve_today(&self) -> Result<NaiveDate> {
        match self.today.as_deref() {
            Some(s) => parse_date(s),
            None => Ok(TimezoneHandler::new(&self.timezone).today()),
        }
    }

    /// The requested month range. `--from` defaults to `today`'s month and
    /// `--to` defaults to `--from`.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange> {
        let (from_year, from_month) = match self.from.as_deref() {
            Some(s) => parse_month_spec(s)?,
            None => (today.year(), today.month()),
        };
        let (to_year, to_month) = match self.to.as_deref() {
            Some(s) => parse_month_spec(s)?,
            None => (from_year, from_month),
        };
        Ok(DateRange::new(from_year, from_month, to_year, to_month))
    }

    pub fn filters(&self) -> ReportFilters {
        ReportFilters::new(self.tutor.clone(), self.center.clone())
    }

    /// The configured data path, or a configuration error when none was
    /// given now or on a previous run.
    pub fn data_path(&self) -> Result<&std::path::Path> {
        self.data.as_deref().ok_or_else(|| {
            AttendanceError::Config("no attendance data given; pass --data <PATH>".to_string())
        })
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data: s.data.clone(),
            timezone: Some(s.timezone.clone()),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            data: Some(PathBuf::from("/srv/attendance")),
            timezone: Some("Asia/Kolkata".to_string()),
            format: Some("csv".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.data, Some(PathBuf::from("/srv/attendance")));
        assert_eq!(loaded.timezone, Some("Asia/Kolkata".to_string()));
        assert_eq!(loaded.format, Some("csv".to_string()));
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.data.is_none());
        assert!(loaded.timezone.is_none());
        assert!(loaded.format.is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());
        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["tutor-attendance"]);
        assert!(settings.data.is_none());
        assert!(settings.from.is_none());
        assert!(settings.to.is_none());
        assert!(settings.today.is_none());
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.tutor, "");
        assert_eq!(settings.center, "");
        assert_eq!(settings.format, "table");
        assert!(settings.output.is_none());
        assert_eq!(settings.log_level, "WARNING");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_rejects_unknown_format() {
        let result = Settings::try_parse_from(["tutor-attendance", "--format", "xlsx"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_date_range_defaults_to_today_month() {
        let settings = Settings::parse_from(["tutor-attendance"]);
        let range = settings.date_range(date(2024, 6, 15)).unwrap();
        assert_eq!(range, DateRange::single_month(2024, 6));
    }

    #[test]
    fn test_date_range_to_defaults_to_from() {
        let settings = Settings::parse_from(["tutor-attendance", "--from", "2024-03"]);
        let range = settings.date_range(date(2024, 6, 15)).unwrap();
        assert_eq!(range, DateRange::single_month(2024, 3));
    }

    #[test]
    fn test_date_range_explicit_bounds() {
        let settings =
            Settings::parse_from(["tutor-attendance", "--from", "2023-11", "--to", "2024-02"]);
        let range = settings.date_range(date(2024, 6, 15)).unwrap();
        assert_eq!(range, DateRange::new(2023, 11, 2024, 2));
    }

    #[test]
    fn test_date_range_bad_month_spec() {
        let settings = Settings::parse_from(["tutor-attendance", "--from", "2024/06"]);
        assert!(matches!(
            settings.date_range(date(2024, 6, 15)),
            Err(AttendanceError::InvalidMonthSpec(_))
        ));
    }

    #[test]
    fn test_resolve_today_override() {
        let settings = Settings::parse_from(["tutor-attendance", "--today", "2024-06-15"]);
        assert_eq!(settings.resolve_today().unwrap(), date(2024, 6, 15));
    }

    #[test]
    fn test_data_path_missing_is_config_error() {
        let settings = Settings::parse_from(["tutor-attendance"]);
        assert!(matches!(
            settings.data_path(),
            Err(AttendanceError::Config(_))
        ));
    }

    #[test]
    fn test_filters_from_cli() {
        let settings =
            Settings::parse_from(["tutor-attendance", "--tutor", "ali", "--center", "north"]);
        assert_eq!(settings.filters(), ReportFilters::new("ali", "north"));
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_data_and_format() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            data: Some(PathBuf::from("/srv/attendance")),
            timezone: Some("UTC".to_string()),
            format: Some("csv".to_string()),
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["tutor-attendance".into()], &config_path);
        assert_eq!(settings.data, Some(PathBuf::from("/srv/attendance")));
        assert_eq!(settings.format, "csv");
        assert_eq!(settings.timezone, "UTC");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            format: Some("csv".to_string()),
            timezone: Some("UTC".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["tutor-attendance".into(), "--format".into(), "json".into()],
            &config_path,
        );
        assert_eq!(settings.format, "json");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default()
            .save_to(&config_path)
            .expect("save");

        Settings::load_with_last_used_impl(
            vec!["tutor-attendance".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["tutor-attendance".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        Settings::load_with_last_used_impl(
            vec![
                "tutor-attendance".into(),
                "--data".into(),
                "/srv/report.json".into(),
                "--timezone".into(),
                "Asia/Kolkata".into(),
            ],
            &config_path,
        );

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.data, Some(PathBuf::from("/srv/report.json")));
        assert_eq!(loaded.timezone, Some("Asia/Kolkata".to_string()));
        assert_eq!(loaded.format, Some("table".to_string()));
    }

    #[test]
    fn test_load_with_last_used_rejects_invalid_timezone() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            timezone: Some("Asia/Kolkata".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec![
                "tutor-attendance".into(),
                "--timezone".into(),
                "Mars/Olympus".into(),
            ],
            &config_path,
        );
        assert_eq!(settings.timezone, "Asia/Kolkata");

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.timezone, Some("Asia/Kolkata".to_string()));
    }

    #[test]
    fn test_load_with_last_used_invalid_timezone_without_stored_zone() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        let settings = Settings::load_with_last_used_impl(
            vec![
                "tutor-attendance".into(),
                "--timezone".into(),
                "Mars/Olympus".into(),
            ],
            &config_path,
        );
        assert_ne!(settings.timezone, "Mars/Olympus");
        assert!(TimezoneHandler::validate_timezone(&settings.timezone));

        let loaded = LastUsedParams::load_from(&config_path);
        assert_ne!(loaded.timezone, Some("Mars/Olympus".to_string()));
    }
}
