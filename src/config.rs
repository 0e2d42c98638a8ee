use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "SPENDBOARD";
const CONFIG_PATH_VAR: &str = "SPENDBOARD_CONFIG";
const DB_FILE: &str = "spendboard.db";
pub(crate) const LOG_FILE: &str = "spendboard.log";
const MAX_MONTHS_WINDOW: usize = 120;
const MAX_DAILY_WINDOW: usize = 366;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Defaults to `spendboard.db` in the platform data directory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Bars in the monthly chart.
    pub months_window: usize,
    /// Days in the sparkline and the daily-average KPI.
    pub daily_window: usize,
    /// How many rows "top expenses" returns when no count is given.
    pub top_n: usize,
    /// Adjustments made while loading; logged once logging is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: "warn".to_string(),
            months_window: 6,
            daily_window: 30,
            top_n: 5,
            warnings: Vec::new(),
        }
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "spendboard", "Spendboard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

impl Settings {
    /// Layered load: platform `config.toml`, then `$SPENDBOARD_CONFIG`,
    /// then `SPENDBOARD_*` environment variables. Missing files are skipped.
    pub(crate) fn load() -> Result<Self> {
        let mut files = Vec::new();
        if let Ok(dirs) = project_dirs() {
            files.push(dirs.config_dir().join("config.toml"));
        }
        if let Some(explicit) = std::env::var_os(CONFIG_PATH_VAR) {
            files.push(PathBuf::from(explicit));
        }
        Self::load_from(&files)
    }

    pub(crate) fn load_from(files: &[PathBuf]) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        for file in files {
            builder = builder.add_source(::config::File::from(file.as_path()).required(false));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let settings: Self = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.top_n == 0 {
            self.warnings
                .push("top_n must be at least 1, using default".to_string());
            self.top_n = Self::default().top_n;
        }
        if self.months_window > MAX_MONTHS_WINDOW {
            self.warnings.push(format!(
                "months_window {} is too large, using {MAX_MONTHS_WINDOW}",
                self.months_window
            ));
            self.months_window = MAX_MONTHS_WINDOW;
        }
        if self.daily_window > MAX_DAILY_WINDOW {
            self.warnings.push(format!(
                "daily_window {} is too large, using {MAX_DAILY_WINDOW}",
                self.daily_window
            ));
            self.daily_window = MAX_DAILY_WINDOW;
        }
        if self.log_level.trim().is_empty() {
            self.log_level = Self::default().log_level;
        }
        self
    }

    /// The configured database path, or the platform default. Creates the
    /// parent directory so the store can be opened right away.
    pub(crate) fn resolve_db_path(&self) -> Result<PathBuf> {
        let path = match &self.db_path {
            Some(p) => expand_home(p),
            None => project_dirs()?.data_dir().join(DB_FILE),
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        Ok(path)
    }
}

/// Log file location: beside the database.
pub(crate) fn log_path(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .map(|dir| dir.join(LOG_FILE))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(crate::run::shellexpand(s)),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let settings = Settings::load_from(&[missing]).unwrap();
        assert_eq!(settings.months_window, 6);
        assert_eq!(settings.daily_window, 30);
        assert_eq!(settings.top_n, 5);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "months_window = 12\ntop_n = 3\ndb_path = \"/tmp/sb/test.db\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&[path]).unwrap();
        assert_eq!(settings.months_window, 12);
        assert_eq!(settings.top_n, 3);
        assert_eq!(settings.daily_window, 30);
        assert_eq!(settings.db_path, Some(PathBuf::from("/tmp/sb/test.db")));
    }

    #[test]
    fn test_later_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.toml");
        let second = dir.path().join("b.toml");
        std::fs::write(&first, "daily_window = 7\ntop_n = 2\n").unwrap();
        std::fs::write(&second, "daily_window = 14\n").unwrap();

        let settings = Settings::load_from(&[first, second]).unwrap();
        assert_eq!(settings.daily_window, 14);
        assert_eq!(settings.top_n, 2);
    }

    #[test]
    fn test_zero_top_n_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "top_n = 0\n").unwrap();
        let settings = Settings::load_from(&[path]).unwrap();
        assert_eq!(settings.top_n, 5);
        assert_eq!(settings.warnings.len(), 1);
        assert!(settings.warnings[0].contains("top_n"));
    }

    #[test]
    fn test_oversized_windows_are_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "daily_window = 100000000\nmonths_window = 5000\n").unwrap();
        let settings = Settings::load_from(&[path]).unwrap();
        assert_eq!(settings.daily_window, MAX_DAILY_WINDOW);
        assert_eq!(settings.months_window, MAX_MONTHS_WINDOW);
        assert_eq!(settings.warnings.len(), 2);
    }

    #[test]
    fn test_valid_settings_carry_no_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "daily_window = 366\nmonths_window = 120\n").unwrap();
        assert!(Settings::load_from(&[path]).unwrap().warnings.is_empty());
    }

    #[test]
    fn test_invalid_value_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "months_window = \"lots\"\n").unwrap();
        assert!(Settings::load_from(&[path]).is_err());
    }

    #[test]
    fn test_resolve_db_path_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("data").join("x.db");
        let settings = Settings {
            db_path: Some(db.clone()),
            ..Settings::default()
        };
        assert_eq!(settings.resolve_db_path().unwrap(), db);
        assert!(dir.path().join("data").is_dir());
        assert_eq!(log_path(&db), dir.path().join("data").join(LOG_FILE));
    }
}
