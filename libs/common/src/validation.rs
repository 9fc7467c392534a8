//! Field-level validation errors
//!
//! Request validation collects every problem before answering, and the
//! services render the result as `{"field": ["message", ...]}` with a 400.

use serde::Serialize;
use std::collections::BTreeMap;

/// Message used when a required field is absent
pub const REQUIRED: &str = "This field is required.";
/// Message used when a string field is empty after trimming
pub const BLANK: &str = "This field may not be blank.";
/// Key for errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation failures keyed by field name
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error set holding a single message
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against `field`
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record the error of a validator, if any
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Check that a required string is present and not blank, returning it trimmed
pub fn required_text<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value.map(str::trim) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some("") => {
            errors.add(field, BLANK);
            None
        }
        Some(value) => Some(value),
    }
}

/// Check a string against a maximum length in characters
pub fn max_length(value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            max
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_blank_are_distinguished() {
        let mut errors = FieldErrors::new();

        assert_eq!(required_text(&mut errors, "name", None), None);
        assert_eq!(required_text(&mut errors, "title", Some("   ")), None);
        assert_eq!(
            required_text(&mut errors, "link", Some("  soup ")),
            Some("soup")
        );

        assert_eq!(errors.get("name"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("title"), Some(&[BLANK.to_string()][..]));
        assert_eq!(errors.get("link"), None);
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = FieldErrors::single("name", BLANK);
        errors.add("name", "second");

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"name": ["This field may not be blank.", "second"]})
        );
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("a", "b").into_result().is_err());
    }

    #[test]
    fn test_max_length_counts_characters() {
        assert!(max_length("crème", 5).is_ok());
        assert!(max_length("crèmes", 5).is_err());
    }
}
