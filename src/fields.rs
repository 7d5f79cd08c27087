// 🏷️ Field Registry
// The fixed contract between FormAssist and the page: field ids, kinds, declared bounds.

use crate::bounds::Bounds;
use crate::error::FieldError;
use serde::{Deserialize, Serialize};

// ============================================================================
// FIELD IDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldId {
    Photo,
    PhotoPreview,
    PhotoPlaceholder,
    FullName,
    BirthDate,
    AgeBadge,
    ParentNames,
    Course,
    Sector,
    Address,
    School,
    Employed,
    Profession,
    FamilyAllowance,
    Siblings,
    FamilyIncome,
    HouseholdSize,
    Notes,
}

impl FieldId {
    pub const ALL: [FieldId; 18] = [
        FieldId::Photo,
        FieldId::PhotoPreview,
        FieldId::PhotoPlaceholder,
        FieldId::FullName,
        FieldId::BirthDate,
        FieldId::AgeBadge,
        FieldId::ParentNames,
        FieldId::Course,
        FieldId::Sector,
        FieldId::Address,
        FieldId::School,
        FieldId::Employed,
        FieldId::Profession,
        FieldId::FamilyAllowance,
        FieldId::Siblings,
        FieldId::FamilyIncome,
        FieldId::HouseholdSize,
        FieldId::Notes,
    ];

    /// Element id / input name on the rendered page.
    pub fn html_id(&self) -> &'static str {
        match self {
            FieldId::Photo => "foto",
            FieldId::PhotoPreview => "fotoPreview",
            FieldId::PhotoPlaceholder => "semFoto",
            FieldId::FullName => "nome_completo",
            FieldId::BirthDate => "data_nascimento",
            FieldId::AgeBadge => "idade_preview",
            FieldId::ParentNames => "nome_pais",
            FieldId::Course => "curso",
            FieldId::Sector => "setor",
            FieldId::Address => "endereco",
            FieldId::School => "escola",
            FieldId::Employed => "trabalho_ficha_adulto",
            FieldId::Profession => "nome_trabalho_profissao",
            FieldId::FamilyAllowance => "bolsa_familia",
            FieldId::Siblings => "irmaos",
            FieldId::FamilyIncome => "renda_familiar",
            FieldId::HouseholdSize => "pessoas_residencia",
            FieldId::Notes => "observacao",
        }
    }

    pub fn from_html_id(id: &str) -> Result<FieldId, FieldError> {
        FieldId::ALL
            .iter()
            .copied()
            .find(|f| f.html_id() == id)
            .ok_or_else(|| FieldError::UnknownField(id.to_string()))
    }
}

// ============================================================================
// FIELD DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Date,
    Checkbox,
    Integer,
    Currency,
    Choice(Vec<String>),
    File,
    /// Display-only element written by handlers (badge, image, placeholder).
    Display,
}

impl FieldKind {
    /// Kinds a user types into.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Date | FieldKind::Integer | FieldKind::Currency | FieldKind::File
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub label: String,
    pub kind: FieldKind,
    pub bounds: Option<Bounds>,
    pub placeholder: String,
}

impl FieldDefinition {
    pub fn new(id: FieldId, label: impl Into<String>, kind: FieldKind) -> Self {
        FieldDefinition {
            id,
            label: label.into(),
            kind,
            bounds: None,
            placeholder: String::new(),
        }
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Result<Self, FieldError> {
        self.bounds = Some(Bounds::new(self.id.html_id(), min, max)?);
        Ok(self)
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}

// ============================================================================
// FIELD REGISTRY
// ============================================================================

/// Ordered catalog of the form's fields, in page order.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<FieldDefinition>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        FieldRegistry { fields: Vec::new() }
    }

    /// The student registration form.
    pub fn student_form() -> Result<Self, FieldError> {
        let mut registry = FieldRegistry::new();

        registry.register(FieldDefinition::new(FieldId::Photo, "Foto do Aluno", FieldKind::File));
        registry.register(FieldDefinition::new(FieldId::PhotoPreview, "Pré-visualização", FieldKind::Display));
        registry.register(FieldDefinition::new(FieldId::PhotoPlaceholder, "Sem foto", FieldKind::Display));
        registry.register(
            FieldDefinition::new(FieldId::FullName, "Nome Completo", FieldKind::Text)
                .with_placeholder("Digite o nome completo do aluno"),
        );
        registry.register(
            FieldDefinition::new(FieldId::BirthDate, "Data de Nascimento", FieldKind::Date)
                .with_placeholder("AAAA-MM-DD"),
        );
        registry.register(FieldDefinition::new(FieldId::AgeBadge, "Idade", FieldKind::Display));
        registry.register(
            FieldDefinition::new(FieldId::ParentNames, "Nome dos Pais/Responsáveis", FieldKind::Text)
                .with_placeholder("Digite o nome dos pais ou responsáveis"),
        );
        registry.register(
            FieldDefinition::new(FieldId::Course, "Curso", FieldKind::Text)
                .with_placeholder("Digite o curso do aluno"),
        );
        registry.register(FieldDefinition::new(
            FieldId::Sector,
            "Setor",
            FieldKind::Choice(vec!["CULTURAL".to_string(), "PROFISSIONALIZANTE".to_string()]),
        ));
        registry.register(
            FieldDefinition::new(FieldId::Address, "Endereço", FieldKind::Text)
                .with_placeholder("Digite o endereço completo"),
        );
        registry.register(
            FieldDefinition::new(FieldId::School, "Escola", FieldKind::Text)
                .with_placeholder("Digite o nome da escola"),
        );
        registry.register(FieldDefinition::new(
            FieldId::Employed,
            "Trabalho (Ficha de Adulto)",
            FieldKind::Checkbox,
        ));
        registry.register(
            FieldDefinition::new(FieldId::Profession, "Nome do Trabalho/Profissão", FieldKind::Text)
                .with_placeholder("Digite a profissão ou local de trabalho"),
        );
        registry.register(FieldDefinition::new(FieldId::FamilyAllowance, "Bolsa Família", FieldKind::Checkbox));
        registry.register(
            FieldDefinition::new(FieldId::Siblings, "Irmãos", FieldKind::Integer)
                .with_placeholder("Número de irmãos")
                .with_bounds(Some(0.0), Some(50.0))?,
        );
        registry.register(
            FieldDefinition::new(FieldId::FamilyIncome, "Renda Familiar (R$)", FieldKind::Currency)
                .with_placeholder("Digite a renda familiar")
                .with_bounds(Some(0.0), Some(1_000_000.0))?,
        );
        registry.register(
            FieldDefinition::new(FieldId::HouseholdSize, "Pessoas na Residência", FieldKind::Integer)
                .with_placeholder("Quantas pessoas moram na casa")
                .with_bounds(Some(1.0), Some(50.0))?,
        );
        registry.register(
            FieldDefinition::new(FieldId::Notes, "Observação", FieldKind::Text)
                .with_placeholder("Digite observações importantes"),
        );

        Ok(registry)
    }

    /// Register a field, replacing any previous definition with the same id.
    pub fn register(&mut self, field: FieldDefinition) {
        match self.fields.iter_mut().find(|f| f.id == field.id) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn get_by_html_id(&self, html_id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id.html_id() == html_id)
    }

    pub fn bounds(&self, id: FieldId) -> Option<&Bounds> {
        self.get(id).and_then(|f| f.bounds.as_ref())
    }

    /// Fields with declared min and/or max, in page order.
    pub fn bounded_fields(&self) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|f| f.bounds.is_some())
            .map(|f| f.id)
            .collect()
    }

    pub fn list_all(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn count(&self) -> usize {
        self.fields.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
