use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Category, DraftSubmission, Field};

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([0-9]{2}\)(?-u:\s)[0-9]{4,5}-[0-9]{4}$").expect("valid phone regex"));

static POSTAL_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}-?[0-9]{3}$").expect("valid postal code regex"));

pub const MIN_CONTENT_CHARS: usize = 10;

/// Field-keyed validation messages. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Returns true if an error was present.
    pub fn clear(&mut self, field: Field) -> bool {
        self.0.remove(&field).is_some()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Check every rule and report all failing fields.
pub fn validate(draft: &DraftSubmission) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.name.trim().is_empty() {
        errors.insert(Field::Name, "Nome é obrigatório");
    }

    let content = draft.content.trim();
    if content.is_empty() {
        errors.insert(Field::Content, "Descrição da situação é obrigatória");
    } else if content.chars().count() < MIN_CONTENT_CHARS {
        errors.insert(
            Field::Content,
            "Descrição deve ter pelo menos 10 caracteres",
        );
    }

    if draft.category.trim().is_empty() {
        errors.insert(Field::Category, "Categoria é obrigatória");
    } else if Category::from_tag(&draft.category).is_none() {
        errors.insert(Field::Category, "Categoria inválida");
    }

    if draft.phone.trim().is_empty() {
        errors.insert(Field::Phone, "Telefone é obrigatório");
    } else if !PHONE_PATTERN.is_match(&draft.phone) {
        errors.insert(
            Field::Phone,
            "Telefone deve estar no formato (11) 99999-9999",
        );
    }

    if draft.cep.trim().is_empty() {
        errors.insert(Field::PostalCode, "CEP é obrigatório");
    } else if !POSTAL_CODE_PATTERN.is_match(&draft.cep) {
        errors.insert(Field::PostalCode, "CEP deve estar no formato 00000-000");
    }

    if draft.address.trim().is_empty() {
        errors.insert(Field::Address, "Endereço é obrigatório");
    }

    if draft.number.trim().is_empty() {
        errors.insert(Field::Number, "Número é obrigatório");
    }

    errors
}
