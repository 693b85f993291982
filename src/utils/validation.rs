use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationErrors};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Blank values report only the required error for that field.
    pub fn require(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.fields.insert(field.to_string(), vec![REQUIRED.to_string()]);
            false
        } else {
            true
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, list) in errors.field_errors() {
            for err in list {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", err.code));
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

pub fn validate<T: Validate>(val: &T) -> FormErrors {
    match val.validate() {
        Ok(()) => FormErrors::default(),
        Err(errors) => errors.into(),
    }
}
