use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key under which errors not tied to a single field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_URL: &str = "Enter a valid URL.";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors with a single non-field message.
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_non_field(message);
        errors
    }

    /// Errors with a single message on `field`.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages attached to `field`; empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(value)` when no errors were collected.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_per_field() {
        let mut errors = FormErrors::new();
        assert!(errors.is_empty());
        errors.add("gender", REQUIRED);
        errors.add_non_field("closed");
        errors.add("gender", "again");

        assert_eq!(errors.get("gender"), [REQUIRED, "again"]);
        assert_eq!(errors.non_field_errors(), ["closed"]);
        assert!(errors.get("url").is_empty());
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["__all__", "gender"]);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let errors = FormErrors::field("action", REQUIRED);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"action": [REQUIRED]})
        );
        assert_eq!(errors.to_string(), "action: This field is required.");
    }
}
