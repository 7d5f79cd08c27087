// Employment disclosure: the "works" checkbox gates the profession text field.

use serde::{Deserialize, Serialize};

/// Derived state of the dependent profession field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentFieldState {
    pub enabled: bool,
    pub value: String,
}

/// Checkbox plus the free-text profession it controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentDisclosure {
    pub employed: bool,
    pub profession: String,
}

impl EmploymentDisclosure {
    pub fn new(employed: bool, profession: impl Into<String>) -> Self {
        let mut disclosure = EmploymentDisclosure {
            employed,
            profession: profession.into(),
        };
        disclosure.apply();
        disclosure
    }

    /// Flip the checkbox and re-derive the profession field.
    pub fn set_employed(&mut self, employed: bool) -> DependentFieldState {
        self.employed = employed;
        self.apply()
    }

    /// Accept typed text only while the field is enabled.
    pub fn set_profession(&mut self, text: impl Into<String>) -> bool {
        if !self.employed {
            return false;
        }
        self.profession = text.into();
        true
    }

    fn apply(&mut self) -> DependentFieldState {
        let state = dependent_field_state(self.employed, &self.profession);
        self.profession = state.value.clone();
        state
    }
}

/// Pure rule: checked keeps whatever is typed, unchecked disables and empties.
pub fn dependent_field_state(employed: bool, current: &str) -> DependentFieldState {
    if employed {
        DependentFieldState {
            enabled: true,
            value: current.to_string(),
        }
    } else {
        DependentFieldState {
            enabled: false,
            value: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncheck_clears_and_disables() {
        let mut disclosure = EmploymentDisclosure::new(true, "Padeiro");
        assert_eq!(disclosure.profession, "Padeiro");

        let state = disclosure.set_employed(false);

        assert!(!state.enabled);
        assert_eq!(state.value, "");
        assert_eq!(disclosure.profession, "");
    }

    #[test]
    fn test_check_enables_without_injecting_text() {
        let mut disclosure = EmploymentDisclosure::new(false, "");
        let state = disclosure.set_employed(true);

        assert!(state.enabled);
        assert_eq!(state.value, "");
    }

    #[test]
    fn test_text_does_not_survive_false_state() {
        let mut disclosure = EmploymentDisclosure::new(true, "");
        assert!(disclosure.set_profession("Mecânico"));

        disclosure.set_employed(false);
        let state = disclosure.set_employed(true);

        assert_eq!(state.value, "");
    }

    #[test]
    fn test_disabled_field_rejects_typing() {
        let mut disclosure = EmploymentDisclosure::new(false, "");
        assert!(!disclosure.set_profession("Vendedor"));
        assert_eq!(disclosure.profession, "");
    }

    #[test]
    fn test_initial_state_is_normalized() {
        // Stale text loaded alongside an unchecked box is discarded
        let disclosure = EmploymentDisclosure::new(false, "Antigo emprego");
        assert_eq!(disclosure.profession, "");
    }
}
