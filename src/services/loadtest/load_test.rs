//! `azurerm_load_test`

use super::models::{LoadTest, LoadTestProperties, API_VERSION, LOAD_TEST_TYPE};
use super::parse::LoadTestId;
use crate::azure::is_not_found;
use crate::error::ProviderError;
use crate::provider::ProviderContext;
use crate::resource::Resource;
use crate::schema::{validate, FieldSchema, Schema, Validator};
use crate::state::ResourceData;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "azurerm_load_test";

/// Load test names: 1-64 letters, digits, `-` or `_`, starting with a
/// letter or digit
fn load_test_name() -> Validator {
    Arc::new(|value: &str| {
        let Some(first) = value.chars().next() else {
            return Err("name must not be empty".to_string());
        };
        if value.len() > 64 {
            return Err(format!("{:?} must be at most 64 characters", value));
        }
        if !first.is_ascii_alphanumeric() {
            return Err(format!("{:?} must start with a letter or digit", value));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "{:?} may only contain letters, digits, hyphens and underscores",
                value
            ));
        }
        Ok(())
    })
}

pub struct LoadTestResource;

fn expand_load_test(data: &ResourceData) -> LoadTest {
    LoadTest {
        location: validate::normalize_location(data.get_str("location")),
        tags: data.get_string_map("tags").filter(|tags| !tags.is_empty()),
        properties: Some(LoadTestProperties {
            description: data.get_ok_str("description").map(str::to_string),
            ..LoadTestProperties::default()
        }),
        ..LoadTest::default()
    }
}

impl LoadTestResource {
    async fn put(&self, ctx: &ProviderContext, id: &LoadTestId, data: &ResourceData) -> Result<()> {
        let body = serde_json::to_value(expand_load_test(data))
            .context("Failed to encode load test")?;

        ctx.client
            .put_and_wait(&id.id(), API_VERSION, &body)
            .await
            .with_context(|| format!("creating/updating {}", id))
    }
}

#[async_trait]
impl Resource for LoadTestResource {
    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(
                "name",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .validate(load_test_name()),
            )
            .field(
                "resource_group_name",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .case_insensitive()
                    .validate(validate::resource_group_name()),
            )
            .field(
                "location",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .validate(validate::location())
                    .state_func(validate::normalize_location),
            )
            .field(
                "description",
                FieldSchema::string()
                    .optional()
                    .validate(validate::string_is_not_empty()),
            )
            .field("tags", FieldSchema::map().optional())
            .field("data_plane_uri", FieldSchema::string().computed())
    }

    fn validate_import_id(&self, id: &str) -> Result<(), ProviderError> {
        LoadTestId::parse(id).map(|_| ())
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = LoadTestId::new(
            ctx.subscription_id(),
            data.get_str("resource_group_name"),
            data.get_str("name"),
        );

        match ctx.client.get(&id.id(), API_VERSION).await {
            Ok(_) => {
                return Err(ProviderError::AlreadyExists {
                    resource_type: RESOURCE_TYPE.to_string(),
                    id: id.id(),
                }
                .into());
            },
            Err(e) if is_not_found(&e) => {},
            Err(e) => {
                return Err(e.context(format!("checking for presence of existing {}", id)));
            },
        }

        self.put(ctx, &id, data).await?;
        data.set_id(id.id());

        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = LoadTestId::parse(data.id())?;

        let response = match ctx.client.get(&id.id(), API_VERSION).await {
            Ok(response) => response,
            Err(e) if is_not_found(&e) => {
                tracing::info!("{} was not found - removing from state", id);
                data.clear();
                return Ok(());
            },
            Err(e) => return Err(e.context(format!("retrieving {}", id))),
        };

        let model: LoadTest = serde_json::from_value(response.body)
            .with_context(|| format!("decoding {}", id))?;

        if let Some(resource_type) = model.resource_type.as_deref() {
            if !resource_type.eq_ignore_ascii_case(LOAD_TEST_TYPE) {
                return Err(ProviderError::SchemaMismatch {
                    kind: "Load Test".to_string(),
                    id: id.to_string(),
                    expected: LOAD_TEST_TYPE.to_string(),
                    received: resource_type.to_string(),
                }
                .into());
            }
        }

        data.set("name", id.name.as_str());
        data.set("resource_group_name", id.resource_group.as_str());
        data.set("location", validate::normalize_location(&model.location));

        match model.tags.filter(|tags| !tags.is_empty()) {
            Some(tags) => data.set(
                "tags",
                Value::Object(tags.into_iter().map(|(k, v)| (k, Value::String(v))).collect()),
            ),
            None => {
                data.remove("tags");
            },
        }

        let properties = model.properties.unwrap_or_default();
        match properties.description {
            Some(description) => data.set("description", description),
            None => {
                data.remove("description");
            },
        }
        match properties.data_plane_uri {
            Some(uri) => data.set("data_plane_uri", uri),
            None => {
                data.remove("data_plane_uri");
            },
        }

        Ok(())
    }

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = LoadTestId::parse(data.id())?;
        self.put(ctx, &id, data).await?;

        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = LoadTestId::parse(data.id())?;

        match ctx.client.delete_and_wait(&id.id(), API_VERSION).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => {
                tracing::info!("{} was already deleted", id);
                Ok(())
            },
            Err(e) => Err(e.context(format!("deleting {}", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> ResourceData {
        match value {
            Value::Object(map) => ResourceData::from_values(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_name_validation() {
        let v = load_test_name();
        assert!(v("lt-1").is_ok());
        assert!(v("lt_1").is_ok());
        assert!(v("").is_err());
        assert!(v("-lt").is_err());
        assert!(v("lt.1").is_err());
        assert!(v(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_expand_load_test() {
        let data = config(json!({
            "name": "lt1",
            "resource_group_name": "rg1",
            "location": "West Europe",
            "description": "nightly",
            "tags": {"env": "test"}
        }));
        let body = serde_json::to_value(expand_load_test(&data)).unwrap();
        assert_eq!(
            body,
            json!({
                "location": "westeurope",
                "tags": {"env": "test"},
                "properties": {"description": "nightly"}
            })
        );
    }

    #[test]
    fn test_empty_tags_not_sent() {
        let data = config(json!({"location": "eastus", "tags": {}}));
        let body = serde_json::to_value(expand_load_test(&data)).unwrap();
        assert!(body.get("tags").is_none());
    }

    #[test]
    fn test_schema_rejects_computed_field() {
        let data = config(json!({
            "name": "lt1",
            "resource_group_name": "rg1",
            "location": "eastus",
            "data_plane_uri": "x"
        }));
        assert!(LoadTestResource.schema().validate_config(&data).is_err());
    }

    #[test]
    fn test_schema_normalizes_location() {
        let mut data = config(json!({"location": "West Europe"}));
        LoadTestResource.schema().normalize(&mut data);
        assert_eq!(data.get_str("location"), "westeurope");
    }
}
