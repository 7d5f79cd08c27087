// Numeric bound clamping for inputs with declared min/max.

use crate::error::FieldError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(field: &str, min: Option<f64>, max: Option<f64>) -> Result<Self, FieldError> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(FieldError::InvalidBounds {
                    field: field.to_string(),
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(Bounds { min, max })
    }

    pub fn range(field: &str, min: f64, max: f64) -> Result<Self, FieldError> {
        Self::new(field, Some(min), Some(max))
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |lo| value >= lo) && self.max.map_or(true, |hi| value <= hi)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClampOutcome {
    /// In range, or not a number: the field keeps its text.
    Unchanged,
    RaisedToMin(String),
    LoweredToMax(String),
}

impl ClampOutcome {
    /// Text the field should show after clamping `original`.
    pub fn apply(self, original: &str) -> String {
        match self {
            ClampOutcome::Unchanged => original.to_string(),
            ClampOutcome::RaisedToMin(v) | ClampOutcome::LoweredToMax(v) => v,
        }
    }
}

/// Clamp the live text of a numeric field.
///
/// Text that does not parse as a number (empty, a lone `-`, letters) is left
/// alone so the user can keep typing.
pub fn clamp(raw: &str, bounds: &Bounds) -> ClampOutcome {
    let value: f64 = match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => return ClampOutcome::Unchanged,
    };
    if value.is_nan() || bounds.contains(value) {
        return ClampOutcome::Unchanged;
    }

    if let Some(lo) = bounds.min {
        if value < lo {
            return ClampOutcome::RaisedToMin(format_number(lo));
        }
    }
    if let Some(hi) = bounds.max {
        if value > hi {
            return ClampOutcome::LoweredToMax(format_number(hi));
        }
    }
    ClampOutcome::Unchanged
}

/// Render a bound the way an input shows it: `100`, not `100.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
