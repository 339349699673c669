//! Data Factory name and ID validators

use super::parse::DataFactoryId;
use crate::schema::Validator;
use std::sync::Arc;

/// Characters the service refuses in linked service and dataset names
const FORBIDDEN_NAME_CHARS: &[char] = &['.', '+', '?', '/', '<', '>', '*', '%', '&', ':', '\\'];

/// Linked service / dataset names: must start with a letter, digit or
/// underscore and must not contain any of `. + ? / < > * % & : \`
pub fn linked_service_dataset_name() -> Validator {
    Arc::new(|value: &str| {
        let Some(first) = value.chars().next() else {
            return Err("name must not be empty".to_string());
        };
        if !(first.is_alphanumeric() || first == '_') {
            return Err(format!(
                "{:?} must start with a letter, digit or underscore",
                value
            ));
        }
        if value.contains(FORBIDDEN_NAME_CHARS) {
            return Err(format!(
                "any of '.', '+', '?', '/', '<', '>', '*', '%', '&', ':', '\\' are not allowed in {:?}",
                value
            ));
        }
        Ok(())
    })
}

/// Data factory names: 3-63 characters, letters, digits and single
/// hyphens, starting and ending with a letter or digit
pub fn data_factory_name() -> Validator {
    Arc::new(|value: &str| {
        if value.len() < 3 || value.len() > 63 {
            return Err(format!(
                "{:?} must be between 3 and 63 characters in length",
                value
            ));
        }
        let valid = value
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
        if !valid {
            return Err(format!(
                "{:?} may only contain letters, numbers and non-consecutive hyphens, and must start and end with a letter or number",
                value
            ));
        }
        Ok(())
    })
}

/// A full data factory resource ID
pub fn data_factory_id() -> Validator {
    Arc::new(|value: &str| DataFactoryId::parse(value).map(|_| ()).map_err(|e| e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_names() {
        let v = linked_service_dataset_name();
        assert!(v("dataset_1").is_ok());
        assert!(v("_private").is_ok());
        assert!(v("with-dash").is_ok());
        assert!(v("").is_err());
        assert!(v("-leading").is_err());
        assert!(v("has.dot").is_err());
        assert!(v("a/b").is_err());
        assert!(v("a:b").is_err());
    }

    #[test]
    fn test_factory_names() {
        let v = data_factory_name();
        assert!(v("acctest-df-1").is_ok());
        assert!(v("df").is_err());
        assert!(v("-df1").is_err());
        assert!(v("df1-").is_err());
        assert!(v("df--1").is_err());
        assert!(v("df_1").is_err());
        assert!(v(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_factory_id() {
        let v = data_factory_id();
        assert!(v("/subscriptions/s/resourceGroups/rg/providers/Microsoft.DataFactory/factories/df1").is_ok());
        assert!(v("/subscriptions/s/resourceGroups/rg").is_err());
    }
}
