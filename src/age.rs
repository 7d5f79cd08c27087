// 🎂 Age Calculator
// Derives a whole-year age badge from a YYYY-MM-DD birthdate field.
//
// The date string is split by hand instead of going through a timestamp parser,
// so a birthdate never shifts by a day near a timezone boundary.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// CLOCK
// ============================================================================

/// Source of "today" for age evaluation.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date. Used for tests and the `today` setting.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ============================================================================
// PARSING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgeError {
    #[error("birthdate is empty")]
    Empty,

    #[error("birthdate `{0}` is not in YYYY-MM-DD form")]
    Malformed(String),

    #[error("birthdate `{0}` is not a calendar date")]
    InvalidDate(String),

    #[error("birthdate {birth} is after {today}")]
    Future { birth: NaiveDate, today: NaiveDate },
}

/// Parse a `YYYY-MM-DD` field value into a calendar date.
pub fn parse_birth_date(raw: &str) -> Result<NaiveDate, AgeError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AgeError::Empty);
    }

    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != 3 {
        return Err(AgeError::Malformed(value.to_string()));
    }

    let year: i32 = parts[0]
        .parse()
        .map_err(|_| AgeError::Malformed(value.to_string()))?;
    let month: u32 = parts[1]
        .parse()
        .map_err(|_| AgeError::Malformed(value.to_string()))?;
    let day: u32 = parts[2]
        .parse()
        .map_err(|_| AgeError::Malformed(value.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| AgeError::InvalidDate(value.to_string()))
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Result<u32, AgeError> {
    let mut years = today.year() - birth.year();

    // Birthday not reached yet this year
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }

    u32::try_from(years).map_err(|_| AgeError::Future { birth, today })
}

// ============================================================================
// AGE BADGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeStyle {
    Success,
    Info,
}

impl BadgeStyle {
    pub fn css_class(&self) -> &'static str {
        match self {
            BadgeStyle::Success => "badge bg-success",
            BadgeStyle::Info => "badge bg-info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBadge {
    Computed(u32),
    Unknown,
}

impl AgeBadge {
    pub fn years(&self) -> Option<u32> {
        match self {
            AgeBadge::Computed(years) => Some(*years),
            AgeBadge::Unknown => None,
        }
    }

    pub fn style(&self) -> BadgeStyle {
        match self {
            AgeBadge::Computed(_) => BadgeStyle::Success,
            AgeBadge::Unknown => BadgeStyle::Info,
        }
    }

    pub fn text(&self, labels: &AgeLabels) -> String {
        match self {
            AgeBadge::Computed(years) => format!("{} {}", years, labels.suffix),
            AgeBadge::Unknown => labels.unknown.clone(),
        }
    }
}

/// Display strings for the age badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeLabels {
    pub suffix: String,
    pub unknown: String,
}

impl Default for AgeLabels {
    fn default() -> Self {
        AgeLabels {
            suffix: "anos".to_string(),
            unknown: "--".to_string(),
        }
    }
}

/// Compute the age badge for a raw field value evaluated on `today`.
pub fn calc_age(raw: &str, today: NaiveDate) -> AgeBadge {
    match parse_birth_date(raw).and_then(|birth| age_on(birth, today)) {
        Ok(years) => AgeBadge::Computed(years),
        Err(err) => {
            tracing::debug!(input = raw, %err, "age unknown");
            AgeBadge::Unknown
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
