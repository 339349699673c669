//! Provider driver
//!
//! [`Provider`] is what the host runtime talks to: it looks up the
//! resource by type name, checks the configuration against its schema and
//! runs the lifecycle handler under the resource's deadline.

use crate::azure::ArmClient;
use crate::error::ProviderError;
use crate::resource::{get_all_resource_keys, get_resource, timeouts, Operation, Resource};
use crate::schema::Schema;
use crate::state::ResourceData;
use anyhow::Result;
use std::sync::Arc;

/// Everything a lifecycle handler needs to reach the API
#[derive(Clone)]
pub struct ProviderContext {
    pub client: Arc<ArmClient>,
}

impl ProviderContext {
    pub fn new(client: ArmClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Subscription used when a configuration does not name one
    pub fn subscription_id(&self) -> &str {
        &self.client.subscription_id
    }
}

pub struct Provider {
    ctx: ProviderContext,
}

impl Provider {
    pub fn new(ctx: ProviderContext) -> Self {
        tracing::debug!(
            "Provider ready with {} resource types",
            get_all_resource_keys().len()
        );
        Self { ctx }
    }

    /// All registered resource type names, sorted
    pub fn resource_types(&self) -> Vec<&'static str> {
        get_all_resource_keys()
    }

    pub fn schema(&self, type_name: &str) -> Result<Schema, ProviderError> {
        Ok(lookup(type_name)?.schema())
    }

    /// Create the resource, or update it when `prior` carries an ID.
    /// Returns the refreshed state.
    pub async fn apply(
        &self,
        type_name: &str,
        prior: Option<&ResourceData>,
        planned: ResourceData,
    ) -> Result<ResourceData> {
        let resource = lookup(type_name)?;
        let schema = resource.schema();
        schema.validate_config(&planned)?;

        let mut data = planned;
        schema.normalize(&mut data);

        let operation = match prior.filter(|p| !p.id().is_empty()) {
            Some(prior) => {
                let replaced = replaced_fields(&schema, prior, &data);
                if !replaced.is_empty() {
                    return Err(ProviderError::config(format!(
                        "changing {} requires replacing {}",
                        replaced.join(", "),
                        prior.id()
                    ))
                    .into());
                }
                data.set_id(prior.id());
                data.mark_new_resource(false);
                Operation::Update
            },
            None => {
                data.mark_new_resource(true);
                Operation::Create
            },
        };

        tracing::info!("{} {}", operation, type_name);
        let limit = resource.timeouts().for_operation(operation);
        let label = format!("{} {}", operation, type_name);
        let result = match operation {
            Operation::Create => {
                timeouts::with_deadline(&label, limit, resource.create(&self.ctx, &mut data)).await
            },
            _ => timeouts::with_deadline(&label, limit, resource.update(&self.ctx, &mut data)).await,
        };
        data.mark_new_resource(false);
        result?;

        Ok(data)
    }

    /// Refresh state; the returned state is empty when the resource is gone
    pub async fn read(&self, type_name: &str, state: ResourceData) -> Result<ResourceData> {
        let resource = lookup(type_name)?;
        let mut data = state;

        tracing::info!("read {} {}", type_name, data.id());
        let limit = resource.timeouts().for_operation(Operation::Read);
        let label = format!("read {}", type_name);
        timeouts::with_deadline(&label, limit, resource.read(&self.ctx, &mut data)).await?;

        Ok(data)
    }

    /// Delete the resource; returns the cleared state
    pub async fn delete(&self, type_name: &str, state: ResourceData) -> Result<ResourceData> {
        let resource = lookup(type_name)?;
        let mut data = state;

        tracing::info!("delete {} {}", type_name, data.id());
        let limit = resource.timeouts().for_operation(Operation::Delete);
        let label = format!("delete {}", type_name);
        timeouts::with_deadline(&label, limit, resource.delete(&self.ctx, &mut data)).await?;

        data.clear();
        Ok(data)
    }

    /// Bring an existing resource under management by ID
    pub async fn import(&self, type_name: &str, id: &str) -> Result<ResourceData> {
        let resource = lookup(type_name)?;
        resource.validate_import_id(id)?;

        let mut data = ResourceData::new();
        data.set_id(id);
        let data = self.read(type_name, data).await?;

        if data.is_empty() {
            return Err(ProviderError::NotFound { id: id.to_string() }.into());
        }
        Ok(data)
    }
}

fn lookup(type_name: &str) -> Result<Arc<dyn Resource>, ProviderError> {
    get_resource(type_name).ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
}

/// Force-new fields whose planned value differs from the prior state.
/// An unset optional+computed field keeps its computed value.
fn replaced_fields(schema: &Schema, prior: &ResourceData, planned: &ResourceData) -> Vec<&'static str> {
    schema
        .fields()
        .filter(|(_, field)| field.force_new)
        .filter(|(name, field)| !(field.computed && planned.get(name).is_none()))
        .filter(|(name, _)| schema.values_differ(name, prior.get(name), planned.get(name)))
        .map(|(name, _)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::CredentialSource;
    use serde_json::{json, Value};

    fn provider() -> Provider {
        let client = ArmClient::new(
            "http://127.0.0.1:9",
            "sub",
            CredentialSource::AccessToken("t".into()),
        )
        .unwrap();
        Provider::new(ProviderContext::new(client))
    }

    fn state(value: Value) -> ResourceData {
        match value {
            Value::Object(map) => ResourceData::from_values(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_resource_types() {
        assert_eq!(
            provider().resource_types(),
            vec!["azurerm_data_factory_dataset_postgresql", "azurerm_load_test"]
        );
    }

    #[test]
    fn test_unknown_resource_schema() {
        assert!(matches!(
            provider().schema("azurerm_nope"),
            Err(ProviderError::UnknownResource(_))
        ));
    }

    #[test]
    fn test_replaced_fields_ignores_case_and_unset_computed() {
        let schema = get_resource("azurerm_data_factory_dataset_postgresql")
            .unwrap()
            .schema();
        let prior = state(json!({
            "id": "x",
            "name": "ds1",
            "resource_group_name": "rg1",
            "data_factory_name": "df1",
            "data_factory_id": "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.DataFactory/factories/df1"
        }));
        let planned = state(json!({"name": "ds1", "data_factory_name": "df1", "resource_group_name": "RG1"}));
        assert!(replaced_fields(&schema, &prior, &planned).is_empty());

        let renamed = state(json!({"name": "ds2", "data_factory_name": "df1", "resource_group_name": "rg1"}));
        assert_eq!(replaced_fields(&schema, &prior, &renamed), vec!["name"]);
    }

    #[tokio::test]
    async fn test_apply_rejects_force_new_change() {
        let prior = state(json!({
            "id": "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.LoadTestService/loadTests/lt1",
            "name": "lt1",
            "resource_group_name": "rg1",
            "location": "westeurope"
        }));
        let planned = state(json!({
            "name": "lt1",
            "resource_group_name": "rg1",
            "location": "East US"
        }));

        let err = provider()
            .apply("azurerm_load_test", Some(&prior), planned)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("location"), "{}", message);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_id() {
        let err = provider()
            .import("azurerm_load_test", "/subscriptions/sub")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::InvalidId(_))
        ));
    }
}
