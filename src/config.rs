use crate::age::{AgeLabels, Clock, FixedClock, SystemClock};
use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_FILE: &str = "form-assist.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed evaluation date (YYYY-MM-DD). Local date when unset.
    pub today: Option<String>,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
    pub age_suffix: String,
    pub unknown_age: String,
}

impl Default for Settings {
    fn default() -> Self {
        let labels = AgeLabels::default();
        Self {
            today: None,
            log_filter: "warn".into(),
            log_file: None,
            age_suffix: labels.suffix,
            unknown_age: labels.unknown,
        }
    }
}

impl Settings {
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override file values from `FORM_ASSIST_*` variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FORM_ASSIST_TODAY") {
            self.today = Some(v);
        }
        if let Some(v) = lookup("FORM_ASSIST_LOG") {
            self.log_filter = v;
        }
        if let Some(v) = lookup("FORM_ASSIST_LOG_FILE") {
            self.log_file = Some(PathBuf::from(v));
        }
    }

    pub fn today(&self) -> Result<Option<NaiveDate>, ConfigError> {
        match &self.today {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| ConfigError::InvalidToday(raw.clone())),
        }
    }

    pub fn clock(&self) -> Result<Box<dyn Clock>, ConfigError> {
        Ok(match self.today()? {
            Some(date) => Box::new(FixedClock(date)),
            None => Box::new(SystemClock),
        })
    }

    pub fn age_labels(&self) -> AgeLabels {
        AgeLabels {
            suffix: self.age_suffix.clone(),
            unknown: self.unknown_age.clone(),
        }
    }
}

/// Load settings from `path` (or `form-assist.toml` if present), then the environment.
///
/// An explicit path must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let mut settings = match fs::read_to_string(&path) {
        Ok(raw) => Settings::from_toml(&raw, &path)?,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => Settings::default(),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}
