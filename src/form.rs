// 🧩 FormAssist binder
// Wires the pure field rules (age, employment, clamping, income, photo) to any
// UI through the FormView trait. `bind` runs once after the view is built;
// `dispatch` handles one event to completion.

use crate::age::{calc_age, AgeLabels, BadgeStyle, Clock};
use crate::bounds::clamp;
use crate::employment::EmploymentDisclosure;
use crate::fields::{FieldId, FieldKind, FieldRegistry};
use crate::income::{filter_income_input, normalize_income};
use crate::photo::{PhotoPreview, PhotoSelection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;

// ============================================================================
// UI BINDING LAYER
// ============================================================================

/// Read/write access to the live form, implemented by each UI adapter.
pub trait FormView {
    fn value(&self, field: FieldId) -> String;
    fn set_value(&mut self, field: FieldId, value: String);

    fn is_checked(&self, field: FieldId) -> bool;
    fn set_checked(&mut self, field: FieldId, checked: bool);

    fn is_enabled(&self, field: FieldId) -> bool;
    fn set_enabled(&mut self, field: FieldId, enabled: bool);

    fn is_visible(&self, field: FieldId) -> bool;
    fn set_visible(&mut self, field: FieldId, visible: bool);

    fn set_badge(&mut self, field: FieldId, text: String, style: BadgeStyle);
}

/// One user interaction with one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldEvent {
    /// Every keystroke.
    Input { field: FieldId, value: String },
    /// Committed edit (e.g. a date picker closing).
    Change { field: FieldId, value: String },
    /// Focus left the field.
    Blur { field: FieldId },
    Toggle { field: FieldId, checked: bool },
    FileSelected { field: FieldId, path: String },
}

// ============================================================================
// BINDER
// ============================================================================

pub struct FormAssist {
    registry: FieldRegistry,
    clock: Box<dyn Clock>,
    labels: AgeLabels,
}

impl FormAssist {
    pub fn new(registry: FieldRegistry, clock: Box<dyn Clock>, labels: AgeLabels) -> Self {
        FormAssist {
            registry,
            clock,
            labels,
        }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Establish initial derived state. Call once after the view is constructed.
    pub fn bind<V: FormView>(&self, view: &mut V) {
        self.refresh_age(view);

        let employed = view.is_checked(FieldId::Employed);
        let disclosure = EmploymentDisclosure::new(employed, view.value(FieldId::Profession));
        view.set_enabled(FieldId::Profession, disclosure.employed);
        view.set_value(FieldId::Profession, disclosure.profession);

        let existing = view.value(FieldId::Photo);
        let photo = PhotoPreview::new((!existing.trim().is_empty()).then(|| PathBuf::from(existing)));
        write_photo(view, &photo);

        for field in self.registry.bounded_fields() {
            let current = view.value(field);
            self.write_clamped(view, field, current);
        }

        tracing::debug!(fields = self.registry.count(), "form bound");
    }

    pub fn dispatch<V: FormView>(&self, view: &mut V, event: FieldEvent) {
        match event {
            FieldEvent::Input { field, value } | FieldEvent::Change { field, value } => {
                self.on_edit(view, field, value)
            }
            FieldEvent::Blur { field } => self.on_blur(view, field),
            FieldEvent::Toggle { field, checked } => self.on_toggle(view, field, checked),
            FieldEvent::FileSelected { field, path } => self.on_file_selected(view, field, &path),
        }
    }

    /// Type `raw` into the income field and leave it, returning what the field
    /// ends up holding. Used by one-shot callers that have no live form.
    pub fn enter_income(&self, raw: &str) -> String {
        let mut form = StudentForm::new();
        let field = FieldId::FamilyIncome;
        self.dispatch(&mut form, FieldEvent::Input { field, value: raw.to_string() });
        self.dispatch(&mut form, FieldEvent::Blur { field });
        form.value(field)
    }

    fn on_edit<V: FormView>(&self, view: &mut V, field: FieldId, value: String) {
        if !view.is_enabled(field) {
            tracing::debug!(field = field.html_id(), "edit ignored on disabled field");
            return;
        }

        match field {
            FieldId::BirthDate => {
                view.set_value(field, value);
                self.refresh_age(view);
            }
            FieldId::FamilyIncome => {
                let filtered = filter_income_input(&value);
                self.write_clamped(view, field, filtered);
            }
            FieldId::Profession => {
                let mut disclosure = EmploymentDisclosure {
                    employed: view.is_checked(FieldId::Employed),
                    profession: view.value(field),
                };
                if disclosure.set_profession(value) {
                    view.set_value(field, disclosure.profession);
                }
            }
            _ if self.registry.bounds(field).is_some() => self.write_clamped(view, field, value),
            _ => view.set_value(field, value),
        }
    }

    fn on_blur<V: FormView>(&self, view: &mut V, field: FieldId) {
        if field != FieldId::FamilyIncome {
            return;
        }

        let current = view.value(field);
        match normalize_income(&current) {
            Some(normalized) => {
                tracing::debug!(from = %current, to = %normalized, "income normalized");
                self.write_clamped(view, field, normalized);
            }
            None => tracing::debug!(value = %current, "income left unchanged"),
        }
    }

    fn on_toggle<V: FormView>(&self, view: &mut V, field: FieldId, checked: bool) {
        view.set_checked(field, checked);
        if field != FieldId::Employed {
            return;
        }

        let mut disclosure = EmploymentDisclosure {
            employed: checked,
            profession: view.value(FieldId::Profession),
        };
        let state = disclosure.set_employed(checked);
        view.set_enabled(FieldId::Profession, state.enabled);
        view.set_value(FieldId::Profession, state.value);
        tracing::debug!(employed = checked, "employment toggled");
    }

    fn on_file_selected<V: FormView>(&self, view: &mut V, field: FieldId, path: &str) {
        if field != FieldId::Photo {
            return;
        }

        let current = view.value(FieldId::Photo);
        let mut photo = PhotoPreview::new(
            (view.is_visible(FieldId::PhotoPreview) && !current.is_empty()).then(|| PathBuf::from(current)),
        );

        if let PhotoSelection::Shown(chosen) = photo.select(path) {
            tracing::debug!(file = ?photo.file_name(), "photo selected");
            view.set_value(FieldId::Photo, chosen.to_string_lossy().into_owned());
            write_photo(view, &photo);
        }
    }

    fn refresh_age<V: FormView>(&self, view: &mut V) {
        let badge = calc_age(&view.value(FieldId::BirthDate), self.clock.today());
        tracing::trace!(years = ?badge.years(), "age badge refreshed");
        view.set_badge(FieldId::AgeBadge, badge.text(&self.labels), badge.style());
    }

    fn write_clamped<V: FormView>(&self, view: &mut V, field: FieldId, value: String) {
        let clamped = match self.registry.bounds(field) {
            Some(bounds) => clamp(&value, bounds).apply(&value),
            None => value,
        };
        view.set_value(field, clamped);
    }
}

fn write_photo<V: FormView>(view: &mut V, photo: &PhotoPreview) {
    view.set_visible(FieldId::PhotoPreview, photo.preview_visible);
    view.set_visible(FieldId::PhotoPlaceholder, photo.placeholder_visible);
}

// ============================================================================
// IN-MEMORY VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldState {
    pub value: String,
    pub checked: bool,
    pub enabled: bool,
    pub visible: bool,
    pub badge: Option<(String, BadgeStyle)>,
}

impl Default for FieldState {
    fn default() -> Self {
        FieldState {
            value: String::new(),
            checked: false,
            enabled: true,
            visible: true,
            badge: None,
        }
    }
}

/// The registration form held in memory. Backs the terminal UI and tests.
#[derive(Debug, Clone, Default)]
pub struct StudentForm {
    fields: HashMap<FieldId, FieldState>,
}

impl StudentForm {
    pub fn new() -> Self {
        StudentForm::default()
    }

    /// Builder: pre-fill a value (edit mode).
    pub fn with_value(mut self, field: FieldId, value: impl Into<String>) -> Self {
        self.set_value(field, value.into());
        self
    }

    /// Builder: pre-check a checkbox (edit mode).
    pub fn with_checked(mut self, field: FieldId, checked: bool) -> Self {
        self.set_checked(field, checked);
        self
    }

    pub fn state(&self, field: FieldId) -> FieldState {
        self.fields.get(&field).cloned().unwrap_or_default()
    }

    pub fn badge(&self, field: FieldId) -> Option<(String, BadgeStyle)> {
        self.fields.get(&field).and_then(|s| s.badge.clone())
    }

    /// Field values keyed by html id, as the page would submit them.
    pub fn submission(&self, registry: &FieldRegistry) -> Value {
        let mut map = Map::new();
        for def in registry.list_all() {
            let state = self.state(def.id);
            let value = match def.kind {
                FieldKind::Display => continue,
                FieldKind::Checkbox => Value::Bool(state.checked),
                _ => Value::String(state.value),
            };
            map.insert(def.id.html_id().to_string(), value);
        }
        Value::Object(map)
    }

    fn entry(&mut self, field: FieldId) -> &mut FieldState {
        self.fields.entry(field).or_default()
    }
}

impl FormView for StudentForm {
    fn value(&self, field: FieldId) -> String {
        self.fields.get(&field).map(|s| s.value.clone()).unwrap_or_default()
    }

    fn set_value(&mut self, field: FieldId, value: String) {
        self.entry(field).value = value;
    }

    fn is_checked(&self, field: FieldId) -> bool {
        self.fields.get(&field).map_or(false, |s| s.checked)
    }

    fn set_checked(&mut self, field: FieldId, checked: bool) {
        self.entry(field).checked = checked;
    }

    fn is_enabled(&self, field: FieldId) -> bool {
        self.fields.get(&field).map_or(true, |s| s.enabled)
    }

    fn set_enabled(&mut self, field: FieldId, enabled: bool) {
        self.entry(field).enabled = enabled;
    }

    fn is_visible(&self, field: FieldId) -> bool {
        self.fields.get(&field).map_or(true, |s| s.visible)
    }

    fn set_visible(&mut self, field: FieldId, visible: bool) {
        self.entry(field).visible = visible;
    }

    fn set_badge(&mut self, field: FieldId, text: String, style: BadgeStyle) {
        self.entry(field).badge = Some((text, style));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::FixedClock;
    use crate::income::format_brl;
    use chrono::NaiveDate;

    fn create_assist() -> FormAssist {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        FormAssist::new(
            FieldRegistry::student_form().unwrap(),
            Box::new(FixedClock(today)),
            AgeLabels::default(),
        )
    }

    fn create_bound_form(assist: &FormAssist) -> StudentForm {
        let mut form = StudentForm::new();
        assist.bind(&mut form);
        form
    }

    fn input(field: FieldId, value: &str) -> FieldEvent {
        FieldEvent::Input {
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_bind_new_form() {
        let assist = create_assist();
        let form = create_bound_form(&assist);

        assert_eq!(form.badge(FieldId::AgeBadge), Some(("--".to_string(), BadgeStyle::Info)));
        assert!(!form.is_enabled(FieldId::Profession));
        assert!(form.is_visible(FieldId::PhotoPlaceholder));
        assert!(!form.is_visible(FieldId::PhotoPreview));
    }

    #[test]
    fn test_bind_edit_mode_computes_age() {
        let assist = create_assist();
        let mut form = StudentForm::new()
            .with_value(FieldId::BirthDate, "2000-01-01")
            .with_checked(FieldId::Employed, true)
            .with_value(FieldId::Profession, "Padeiro")
            .with_value(FieldId::Photo, "uploads/aluno.jpg");

        assist.bind(&mut form);

        assert_eq!(
            form.badge(FieldId::AgeBadge),
            Some(("24 anos".to_string(), BadgeStyle::Success))
        );
        assert!(form.is_enabled(FieldId::Profession));
        assert_eq!(form.value(FieldId::Profession), "Padeiro");
        assert!(form.is_visible(FieldId::PhotoPreview));
        assert!(!form.is_visible(FieldId::PhotoPlaceholder));
    }

    #[test]
    fn test_bind_clears_profession_when_unemployed() {
        let assist = create_assist();
        let mut form = StudentForm::new()
            .with_checked(FieldId::Employed, false)
            .with_value(FieldId::Profession, "Motorista");

        assist.bind(&mut form);

        assert!(!form.is_enabled(FieldId::Profession));
        assert_eq!(form.value(FieldId::Profession), "");
        assert_eq!(form.submission(assist.registry())["nome_trabalho_profissao"], "");
    }

    #[test]
    fn test_bind_clamps_loaded_values() {
        let assist = create_assist();
        let mut form = StudentForm::new().with_value(FieldId::Siblings, "70");
        assist.bind(&mut form);
        assert_eq!(form.value(FieldId::Siblings), "50");
    }

    #[test]
    fn test_age_recomputed_on_every_edit() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, input(FieldId::BirthDate, "2000-01-01"));
        assert_eq!(form.badge(FieldId::AgeBadge).unwrap().0, "24 anos");

        assist.dispatch(
            &mut form,
            FieldEvent::Change {
                field: FieldId::BirthDate,
                value: "2024-06-15".to_string(),
            },
        );
        assert_eq!(form.badge(FieldId::AgeBadge), Some(("--".to_string(), BadgeStyle::Info)));
    }

    #[test]
    fn test_clearing_birthdate_resets_badge() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, input(FieldId::BirthDate, "2010-05-05"));
        assist.dispatch(&mut form, input(FieldId::BirthDate, ""));

        assert_eq!(form.badge(FieldId::AgeBadge), Some(("--".to_string(), BadgeStyle::Info)));
    }

    #[test]
    fn test_employment_toggle_round_trip() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, FieldEvent::Toggle { field: FieldId::Employed, checked: true });
        assert!(form.is_enabled(FieldId::Profession));
        assert_eq!(form.value(FieldId::Profession), "");

        assist.dispatch(&mut form, input(FieldId::Profession, "Costureira"));
        assert_eq!(form.value(FieldId::Profession), "Costureira");

        assist.dispatch(&mut form, FieldEvent::Toggle { field: FieldId::Employed, checked: false });
        assert!(!form.is_enabled(FieldId::Profession));
        assert_eq!(form.value(FieldId::Profession), "");

        assist.dispatch(&mut form, FieldEvent::Toggle { field: FieldId::Employed, checked: true });
        assert_eq!(form.value(FieldId::Profession), "");
    }

    #[test]
    fn test_typing_into_disabled_profession_ignored() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, input(FieldId::Profession, "Pedreiro"));
        assert_eq!(form.value(FieldId::Profession), "");
    }

    #[test]
    fn test_bounded_fields_clamp_on_input() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, input(FieldId::Siblings, "150"));
        assert_eq!(form.value(FieldId::Siblings), "50");

        assist.dispatch(&mut form, input(FieldId::HouseholdSize, "0"));
        assert_eq!(form.value(FieldId::HouseholdSize), "1");

        assist.dispatch(&mut form, input(FieldId::Siblings, ""));
        assert_eq!(form.value(FieldId::Siblings), "");
    }

    #[test]
    fn test_income_filter_and_normalize() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, input(FieldId::FamilyIncome, "R$ 1234,5"));
        assert_eq!(form.value(FieldId::FamilyIncome), "1234.5");

        assist.dispatch(&mut form, FieldEvent::Blur { field: FieldId::FamilyIncome });
        assert_eq!(form.value(FieldId::FamilyIncome), "1234.50");
    }

    #[test]
    fn test_pasted_brl_amount_keeps_value() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, input(FieldId::FamilyIncome, &format_brl(1234.56)));
        assert_eq!(form.value(FieldId::FamilyIncome), "1234.56");

        assist.dispatch(&mut form, FieldEvent::Blur { field: FieldId::FamilyIncome });
        assert_eq!(form.value(FieldId::FamilyIncome), "1234.56");
    }

    #[test]
    fn test_enter_income_matches_live_form() {
        let assist = create_assist();
        assert_eq!(assist.enter_income("2500000"), "1000000.00");
        assert_eq!(assist.enter_income("R$ 1.234,56"), "1234.56");
        assert_eq!(assist.enter_income("850,5"), "850.50");
        assert_eq!(assist.enter_income("abc"), "");
    }

    #[test]
    fn test_income_clamped_to_declared_max() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, input(FieldId::FamilyIncome, "2500000"));
        assert_eq!(form.value(FieldId::FamilyIncome), "1000000");

        assist.dispatch(&mut form, FieldEvent::Blur { field: FieldId::FamilyIncome });
        assert_eq!(form.value(FieldId::FamilyIncome), "1000000.00");
    }

    #[test]
    fn test_unparseable_income_unchanged_on_blur() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);
        form.set_value(FieldId::FamilyIncome, ".".to_string());

        assist.dispatch(&mut form, FieldEvent::Blur { field: FieldId::FamilyIncome });
        assert_eq!(form.value(FieldId::FamilyIncome), ".");
    }

    #[test]
    fn test_photo_selection() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(
            &mut form,
            FieldEvent::FileSelected {
                field: FieldId::Photo,
                path: "relatorio.pdf".to_string(),
            },
        );
        assert!(form.is_visible(FieldId::PhotoPlaceholder));
        assert_eq!(form.value(FieldId::Photo), "");

        assist.dispatch(
            &mut form,
            FieldEvent::FileSelected {
                field: FieldId::Photo,
                path: "aluno.png".to_string(),
            },
        );
        assert_eq!(form.value(FieldId::Photo), "aluno.png");
        assert!(form.is_visible(FieldId::PhotoPreview));
        assert!(!form.is_visible(FieldId::PhotoPlaceholder));
    }

    #[test]
    fn test_plain_fields_pass_through() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);

        assist.dispatch(&mut form, input(FieldId::FullName, "Maria da Silva"));
        assert_eq!(form.value(FieldId::FullName), "Maria da Silva");
    }

    #[test]
    fn test_submission_keyed_by_html_id() {
        let assist = create_assist();
        let mut form = create_bound_form(&assist);
        assist.dispatch(&mut form, input(FieldId::FullName, "João"));
        assist.dispatch(&mut form, FieldEvent::Toggle { field: FieldId::FamilyAllowance, checked: true });

        let submission = form.submission(assist.registry());

        assert_eq!(submission["nome_completo"], "João");
        assert_eq!(submission["bolsa_familia"], true);
        assert_eq!(submission["trabalho_ficha_adulto"], false);
        assert!(submission.get("idade_preview").is_none());
        assert!(submission.get("fotoPreview").is_none());
    }
}
