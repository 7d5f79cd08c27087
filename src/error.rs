// Error types for the parts of FormAssist that can actually fail.
// Field handlers never return errors: bad input degrades to a safe display state.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("field `{field}` declares min {min} greater than max {max}")]
    InvalidBounds { field: String, min: f64, max: f64 },

    #[error("unknown field id `{0}`")]
    UnknownField(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid date `{0}` for `today` (expected YYYY-MM-DD)")]
    InvalidToday(String),
}
