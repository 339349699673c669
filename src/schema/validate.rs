//! Reusable field validators
//!
//! A validator receives the configured string value and returns a message
//! describing the problem. The field name is prefixed by the caller.

use super::Validator;
use std::sync::Arc;

/// Rejects the empty string
pub fn string_is_not_empty() -> Validator {
    Arc::new(|value: &str| {
        if value.is_empty() {
            Err("expected a non-empty string".to_string())
        } else {
            Ok(())
        }
    })
}

/// Accepts only one of `valid` (case-sensitive)
pub fn string_in_slice(valid: &'static [&'static str]) -> Validator {
    Arc::new(move |value: &str| {
        if valid.contains(&value) {
            Ok(())
        } else {
            Err(format!("expected one of {:?}, got {:?}", valid, value))
        }
    })
}

/// Resource group names: 1-90 characters of letters, digits, `-`, `_`,
/// `(`, `)` and `.`, not ending in a period
pub fn resource_group_name() -> Validator {
    Arc::new(|value: &str| {
        if value.is_empty() || value.len() > 90 {
            return Err("must be between 1 and 90 characters in length".to_string());
        }
        if value.ends_with('.') {
            return Err("cannot end with a period".to_string());
        }
        let valid = value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '(' | ')' | '.'));
        if !valid {
            return Err(
                "may only contain alphanumeric characters, dash, underscores, parentheses and periods"
                    .to_string(),
            );
        }
        Ok(())
    })
}

/// Azure location names, normalised or display form
pub fn location() -> Validator {
    Arc::new(|value: &str| {
        if value.trim().is_empty() {
            return Err("location must not be empty".to_string());
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
            return Err(format!("{:?} is not a valid Azure location", value));
        }
        Ok(())
    })
}

/// Normalise a location for comparison: `West Europe` -> `westeurope`
pub fn normalize_location(value: &str) -> String {
    value.replace(' ', "").to_lowercase()
}
