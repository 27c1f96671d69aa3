use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Weekday};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Symbol printed in front of amounts in tables.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// First day of a weekly budget window.
    #[serde(default = "default_week_start")]
    pub week_start: WeekStart,

    /// Where `export` writes when `--dir` is not given.
    #[serde(default)]
    pub export_dir: Option<String>,
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_week_start() -> WeekStart {
    WeekStart::Sunday
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            week_start: default_week_start(),
            export_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("spendbook.sqlite3")
    }
}

pub fn app_paths(override_home: Option<PathBuf>) -> Result<AppPaths> {
    if let Some(home) = override_home {
        return Ok(AppPaths {
            config_dir: home.join("config"),
            data_dir: home.join("data"),
        });
    }

    let proj = ProjectDirs::from("com", "spendbook", "spendbook")
        .context("Failed to resolve platform directories")?;

    Ok(AppPaths {
        config_dir: proj.config_dir().to_path_buf(),
        data_dir: proj.data_dir().to_path_buf(),
    })
}

pub fn load_or_init_config(paths: &AppPaths) -> Result<(AppConfig, PathBuf)> {
    fs::create_dir_all(&paths.config_dir)
        .with_context(|| format!("Failed to create config dir {}", paths.config_dir.display()))?;

    let cfg_path = paths.config_dir.join("config.json");
    if !cfg_path.exists() {
        let cfg = AppConfig::default();
        write_config(&cfg_path, &cfg)?;
        tracing::debug!(path = %cfg_path.display(), "wrote default config");
        return Ok((cfg, cfg_path));
    }

    let raw = fs::read_to_string(&cfg_path)
        .with_context(|| format!("Failed to read {}", cfg_path.display()))?;
    let cfg: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", cfg_path.display()))?;

    Ok((cfg, cfg_path))
}

pub fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Today's calendar date, unless the caller pinned one.
pub fn today_or(pinned: Option<NaiveDate>) -> NaiveDate {
    pinned.unwrap_or_else(|| Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg.currency, "$");
        assert_eq!(cfg.week_start, WeekStart::Sunday);
        assert!(cfg.export_dir.is_none());
    }

    #[test]
    fn init_writes_config_under_home() {
        let home = tempfile::tempdir().expect("tempdir");
        let paths = app_paths(Some(home.path().to_path_buf())).expect("paths");
        let (cfg, path) = load_or_init_config(&paths).expect("init");
        assert!(path.exists());
        assert_eq!(cfg.week_start, WeekStart::Sunday);

        let (again, _) = load_or_init_config(&paths).expect("reload");
        assert_eq!(again.currency, cfg.currency);
    }
}
