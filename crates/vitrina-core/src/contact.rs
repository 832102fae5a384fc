//! # Contact Details
//!
//! The customer fields collected with an order and the form that defines them.

use crate::VitrinaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// CUSTOMER INFO
// =============================================================================

/// Values entered by the customer, keyed by field key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerInfo {
    fields: BTreeMap<String, String>,
}

impl CustomerInfo {
    /// Create an empty set of fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Raw value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Trimmed value, `None` when missing or whitespace only.
    #[must_use]
    pub fn filled(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomerInfo {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// True iff every key in `required` has a non-blank value in `info`.
#[must_use]
pub fn is_submittable<S: AsRef<str>>(info: &CustomerInfo, required: &[S]) -> bool {
    required.iter().all(|key| info.filled(key.as_ref()).is_some())
}

// =============================================================================
// CONTACT FORM
// =============================================================================

/// One field of the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactField {
    /// Key used in `CustomerInfo`.
    pub key: String,
    /// Label shown to the customer and written into the order message.
    pub label: String,
    #[serde(default)]
    pub required: bool,
}

impl ContactField {
    #[must_use]
    pub fn required(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            required: true,
        }
    }

    #[must_use]
    pub fn optional(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            required: false,
        }
    }
}

/// Ordered list of contact fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactForm {
    fields: Vec<ContactField>,
}

impl Default for ContactForm {
    /// Business customer form: company, tax id, contact name and email
    /// required; delivery address optional.
    fn default() -> Self {
        Self {
            fields: vec![
                ContactField::required("razon_social", "Razón Social"),
                ContactField::required("cuit", "CUIT"),
                ContactField::required("nombre", "Nombre"),
                ContactField::required("email", "Email"),
                ContactField::optional("direccion", "Dirección"),
            ],
        }
    }
}

impl ContactForm {
    /// Build a form, rejecting empty forms and duplicate keys.
    pub fn new(fields: Vec<ContactField>) -> Result<Self, VitrinaError> {
        let form = Self { fields };
        form.validate()?;
        Ok(form)
    }

    /// Check that the form has fields and no key appears twice.
    pub fn validate(&self) -> Result<(), VitrinaError> {
        if self.fields.is_empty() {
            return Err(VitrinaError::InvalidConfig(
                "contact form has no fields".to_string(),
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for field in &self.fields {
            if field.key.trim().is_empty() {
                return Err(VitrinaError::InvalidConfig(
                    "contact field with empty key".to_string(),
                ));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(VitrinaError::InvalidConfig(format!(
                    "duplicate contact field: {}",
                    field.key
                )));
            }
        }
        Ok(())
    }

    /// Fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[ContactField] {
        &self.fields
    }

    /// Keys of the required fields, in display order.
    #[must_use]
    pub fn required_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key.as_str())
            .collect()
    }

    /// Required fields that are blank in `info`.
    #[must_use]
    pub fn missing<'a>(&'a self, info: &CustomerInfo) -> Vec<&'a ContactField> {
        self.fields
            .iter()
            .filter(|f| f.required && info.filled(&f.key).is_none())
            .collect()
    }

    /// Whether `info` satisfies this form.
    #[must_use]
    pub fn is_submittable(&self, info: &CustomerInfo) -> bool {
        is_submittable(info, &self.required_keys())
    }
}

// =============================================================================
// TESTS
// =============================================================================
