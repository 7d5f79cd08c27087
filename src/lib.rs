// FormAssist - Core Library
// Field behavior for the student registration form, independent of any UI toolkit.

pub mod age;
pub mod bounds;
pub mod config;
pub mod employment;
pub mod error;
pub mod fields;
pub mod form;
pub mod income;
pub mod photo;

// Only compile the terminal adapter when the TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use age::{
    age_on, calc_age, parse_birth_date,
    AgeBadge, AgeError, AgeLabels, BadgeStyle, Clock, FixedClock, SystemClock,
};
pub use bounds::{clamp, Bounds, ClampOutcome};
pub use config::{load_settings, Settings};
pub use employment::{dependent_field_state, DependentFieldState, EmploymentDisclosure};
pub use error::{ConfigError, FieldError};
pub use fields::{FieldDefinition, FieldId, FieldKind, FieldRegistry};
pub use form::{FieldEvent, FieldState, FormAssist, FormView, StudentForm};
pub use income::{filter_income_input, format_brl, normalize_income, parse_amount};
pub use photo::{PhotoPreview, PhotoSelection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
