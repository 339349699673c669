//! `azurerm_data_factory_dataset_postgresql`
//!
//! A PostgreSQL table dataset inside a Data Factory, bound to a linked
//! service. The factory is addressed either by `data_factory_id` or by the
//! deprecated `data_factory_name` + `resource_group_name` pair.

use super::helpers::{
    expand_parameters, expand_structure, flatten_additional_properties, flatten_annotations,
    flatten_parameters, flatten_structure_columns,
};
use super::models::{
    DatasetFolder, DatasetProperties, DatasetResource, LinkedServiceReference, TableDataset,
    TableTypeProperties, API_VERSION, POSTGRESQL_TABLE_TYPE,
};
use super::parse::{DataFactoryId, DataSetId};
use super::validate as df_validate;
use crate::azure::is_not_found;
use crate::error::ProviderError;
use crate::provider::ProviderContext;
use crate::resource::Resource;
use crate::schema::{validate, FieldSchema, Schema};
use crate::state::ResourceData;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

pub const RESOURCE_TYPE: &str = "azurerm_data_factory_dataset_postgresql";

/// Column types accepted in `schema_column.type`
const COLUMN_TYPES: &[&str] = &[
    "Byte",
    "Byte[]",
    "Boolean",
    "Date",
    "DateTime",
    "DateTimeOffset",
    "Decimal",
    "Double",
    "Guid",
    "Int16",
    "Int32",
    "Int64",
    "Single",
    "String",
    "TimeSpan",
];

/// How the configuration addresses the parent factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryRef {
    Id(DataFactoryId),
    /// Deprecated `data_factory_name` + `resource_group_name`
    Legacy {
        resource_group: String,
        factory_name: String,
    },
}

impl FactoryRef {
    /// Pick the factory reference out of the configuration.
    /// Exactly one of `data_factory_id` and `data_factory_name` must be set.
    pub fn resolve(data: &ResourceData) -> Result<Self, ProviderError> {
        let by_id = data.get_ok_str("data_factory_id");
        let by_name = data.get_ok_str("data_factory_name");
        let resource_group = data.get_ok_str("resource_group_name");

        match (by_id, by_name) {
            (Some(_), Some(_)) => Err(ProviderError::config(
                "only one of `data_factory_id,data_factory_name` can be specified",
            )),
            (None, None) => Err(ProviderError::config(
                "one of `data_factory_id,data_factory_name` must be specified",
            )),
            (Some(id), None) => {
                let id = DataFactoryId::parse(id)?;
                if let Some(rg) = resource_group {
                    if !rg.eq_ignore_ascii_case(&id.resource_group) {
                        return Err(ProviderError::config(format!(
                            "resource_group_name {:?} does not match the resource group of data_factory_id ({:?})",
                            rg, id.resource_group
                        )));
                    }
                }
                Ok(Self::Id(id))
            },
            (None, Some(name)) => {
                let Some(rg) = resource_group else {
                    return Err(ProviderError::config(
                        "resource_group_name: required when data_factory_name is set",
                    ));
                };
                Ok(Self::Legacy {
                    resource_group: rg.to_string(),
                    factory_name: name.to_string(),
                })
            },
        }
    }

    pub fn into_factory_id(self, subscription_id: &str) -> DataFactoryId {
        match self {
            Self::Id(id) => id,
            Self::Legacy {
                resource_group,
                factory_name,
            } => DataFactoryId::new(subscription_id, &resource_group, &factory_name),
        }
    }
}

pub struct DatasetPostgreSqlResource;

impl DatasetPostgreSqlResource {
    async fn create_update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let factory = FactoryRef::resolve(data)?.into_factory_id(ctx.subscription_id());
        let id = DataSetId::new(
            &factory.subscription_id,
            &factory.resource_group,
            &factory.factory_name,
            data.get_str("name"),
        );

        if data.is_new_resource() {
            match ctx.client.get(&id.id(), API_VERSION).await {
                Ok(existing) => {
                    if let Some(existing_id) = existing.body.get("id").and_then(|v| v.as_str()) {
                        if !existing_id.is_empty() {
                            return Err(ProviderError::AlreadyExists {
                                resource_type: RESOURCE_TYPE.to_string(),
                                id: existing_id.to_string(),
                            }
                            .into());
                        }
                    }
                },
                Err(e) if is_not_found(&e) => {},
                Err(e) => {
                    return Err(e.context(format!("checking for presence of existing {}", id)));
                },
            }
        }

        let dataset = DatasetResource {
            id: None,
            name: None,
            resource_type: None,
            etag: None,
            properties: DatasetProperties::PostgreSqlTable(expand_dataset(data)),
        };
        let body = serde_json::to_value(&dataset).context("Failed to encode dataset")?;

        ctx.client
            .put(&id.id(), API_VERSION, &body)
            .await
            .with_context(|| format!("creating/updating {}", id))?;

        data.set_id(id.id());

        self.read(ctx, data).await
    }
}

fn expand_dataset(data: &ResourceData) -> TableDataset {
    let mut table = TableDataset {
        linked_service_name: Some(LinkedServiceReference::new(
            data.get_str("linked_service_name"),
        )),
        description: data.get_ok_str("description").map(str::to_string),
        type_properties: data.get_ok_str("table_name").map(|name| TableTypeProperties {
            table_name: Some(Value::String(name.to_string())),
            ..TableTypeProperties::default()
        }),
        folder: data.get_ok_str("folder").map(|name| DatasetFolder {
            name: Some(name.to_string()),
        }),
        ..TableDataset::default()
    };

    if let Some(parameters) = data.get_string_map("parameters") {
        table.parameters = Some(expand_parameters(&parameters));
    }

    if let Some(annotations) = data.get_string_list("annotations") {
        table.annotations = Some(annotations.into_iter().map(Value::String).collect());
    }

    if let Some(additional) = data.get_string_map("additional_properties") {
        table.additional_properties = additional
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
    }

    if let Some(columns) = data.get_blocks("schema_column") {
        table.structure = Some(expand_structure(&columns));
    }

    table
}

/// Set the field when the API returned a value, unset it otherwise
fn set_or_remove(data: &mut ResourceData, key: &str, value: Option<Value>) {
    match value {
        Some(value) => data.set(key, value),
        None => {
            data.remove(key);
        },
    }
}

#[async_trait]
impl Resource for DatasetPostgreSqlResource {
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
                    .validate(df_validate::linked_service_dataset_name()),
            )
            .field(
                "data_factory_name",
                FieldSchema::string()
                    .optional()
                    .computed()
                    .force_new()
                    .validate(df_validate::data_factory_name())
                    .deprecated("`data_factory_name` is deprecated in favour of `data_factory_id` and will be removed in a future major version")
                    .exactly_one_of(&["data_factory_id"]),
            )
            .field(
                "data_factory_id",
                FieldSchema::string()
                    .optional()
                    .computed()
                    .force_new()
                    .validate(df_validate::data_factory_id())
                    .exactly_one_of(&["data_factory_name"]),
            )
            // the API returns this in lower-case
            .field(
                "resource_group_name",
                FieldSchema::string()
                    .optional()
                    .computed()
                    .force_new()
                    .case_insensitive()
                    .validate(validate::resource_group_name())
                    .description("Required together with data_factory_name"),
            )
            .field(
                "linked_service_name",
                FieldSchema::string()
                    .required()
                    .validate(validate::string_is_not_empty()),
            )
            .field(
                "table_name",
                FieldSchema::string()
                    .optional()
                    .validate(validate::string_is_not_empty()),
            )
            .field("parameters", FieldSchema::map().optional())
            .field(
                "description",
                FieldSchema::string()
                    .optional()
                    .validate(validate::string_is_not_empty()),
            )
            .field("annotations", FieldSchema::list().optional())
            .field(
                "folder",
                FieldSchema::string()
                    .optional()
                    .validate(validate::string_is_not_empty()),
            )
            .field("additional_properties", FieldSchema::map().optional())
            .field(
                "schema_column",
                FieldSchema::block(
                    Schema::new()
                        .field(
                            "name",
                            FieldSchema::string()
                                .required()
                                .validate(validate::string_is_not_empty()),
                        )
                        .field(
                            "type",
                            FieldSchema::string()
                                .optional()
                                .validate(validate::string_in_slice(COLUMN_TYPES)),
                        )
                        .field(
                            "description",
                            FieldSchema::string()
                                .optional()
                                .validate(validate::string_is_not_empty()),
                        ),
                )
                .optional(),
            )
    }

    fn validate_import_id(&self, id: &str) -> Result<(), ProviderError> {
        DataSetId::parse(id).map(|_| ())
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        self.create_update(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = DataSetId::parse(data.id())?;

        let response = match ctx.client.get(&id.id(), API_VERSION).await {
            Ok(response) => response,
            Err(e) if is_not_found(&e) => {
                tracing::info!("{} was not found - removing from state", id);
                data.clear();
                return Ok(());
            },
            Err(e) => return Err(e.context(format!("retrieving {}", id))),
        };

        let resource: DatasetResource = serde_json::from_value(response.body)
            .with_context(|| format!("decoding {}", id))?;

        let table = match resource.properties {
            DatasetProperties::PostgreSqlTable(table) => table,
            other => {
                return Err(ProviderError::SchemaMismatch {
                    kind: "Data Factory Dataset PostgreSQL".to_string(),
                    id: id.to_string(),
                    expected: POSTGRESQL_TABLE_TYPE.to_string(),
                    received: other.type_name().to_string(),
                }
                .into());
            },
        };

        data.set("name", id.name.as_str());
        data.set("resource_group_name", id.resource_group.as_str());
        data.set("data_factory_name", id.factory_name.as_str());
        data.set("data_factory_id", id.factory().id());

        set_or_remove(
            data,
            "additional_properties",
            flatten_additional_properties(&table.additional_properties).map(Value::Object),
        );
        set_or_remove(data, "description", table.description.map(Value::String));
        set_or_remove(
            data,
            "parameters",
            flatten_parameters(table.parameters.as_ref()).map(Value::Object),
        );
        set_or_remove(
            data,
            "annotations",
            flatten_annotations(table.annotations.as_ref()).map(Value::Array),
        );

        if let Some(name) = table.linked_service_name.map(|ls| ls.reference_name) {
            data.set("linked_service_name", name);
        }

        match table.type_properties.and_then(|p| p.table_name) {
            Some(Value::String(name)) => data.set("table_name", name),
            Some(_) => tracing::debug!("Skipping `table_name` since it's not a string"),
            None => {
                data.remove("table_name");
            },
        }

        set_or_remove(
            data,
            "folder",
            table.folder.and_then(|f| f.name).map(Value::String),
        );
        set_or_remove(
            data,
            "schema_column",
            flatten_structure_columns(table.structure.as_ref()).map(Value::Array),
        );

        Ok(())
    }

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        self.create_update(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = DataSetId::parse(data.id())?;

        match ctx.client.delete(&id.id(), API_VERSION).await {
            Ok(_) => Ok(()),
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

    const FACTORY_ID: &str =
        "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.DataFactory/factories/df1";

    #[test]
    fn test_factory_ref_by_id() {
        let data = config(json!({"data_factory_id": FACTORY_ID}));
        let factory = FactoryRef::resolve(&data).unwrap().into_factory_id("other-sub");
        assert_eq!(factory, DataFactoryId::new("sub", "rg1", "df1"));
    }

    #[test]
    fn test_factory_ref_legacy_uses_context_subscription() {
        let data = config(json!({"data_factory_name": "df1", "resource_group_name": "rg1"}));
        let factory = FactoryRef::resolve(&data).unwrap().into_factory_id("sub");
        assert_eq!(factory, DataFactoryId::new("sub", "rg1", "df1"));
    }

    #[test]
    fn test_factory_ref_rejects_both_and_neither() {
        let both = config(json!({"data_factory_id": FACTORY_ID, "data_factory_name": "df1"}));
        assert!(matches!(
            FactoryRef::resolve(&both),
            Err(ProviderError::InvalidConfig(_))
        ));

        let neither = config(json!({"name": "ds"}));
        assert!(matches!(
            FactoryRef::resolve(&neither),
            Err(ProviderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_factory_ref_legacy_needs_resource_group() {
        let data = config(json!({"data_factory_name": "df1"}));
        assert!(FactoryRef::resolve(&data).is_err());
    }

    #[test]
    fn test_factory_ref_mismatched_resource_group() {
        let data = config(json!({"data_factory_id": FACTORY_ID, "resource_group_name": "RG1"}));
        assert!(FactoryRef::resolve(&data).is_ok());

        let data = config(json!({"data_factory_id": FACTORY_ID, "resource_group_name": "rg2"}));
        assert!(FactoryRef::resolve(&data).is_err());
    }

    #[test]
    fn test_expand_dataset_skips_unset_fields() {
        let data = config(json!({
            "name": "ds1",
            "data_factory_id": FACTORY_ID,
            "linked_service_name": "ls1"
        }));
        let body = serde_json::to_value(DatasetProperties::PostgreSqlTable(expand_dataset(&data))).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "PostgreSqlTable",
                "linkedServiceName": {"type": "LinkedServiceReference", "referenceName": "ls1"}
            })
        );
    }

    #[test]
    fn test_expand_dataset_full() {
        let data = config(json!({
            "name": "ds1",
            "data_factory_id": FACTORY_ID,
            "linked_service_name": "ls1",
            "table_name": "public.orders",
            "description": "orders",
            "folder": "sales",
            "parameters": {"env": "prod"},
            "annotations": ["a", "b"],
            "additional_properties": {"foo": "bar"},
            "schema_column": [{"name": "id", "type": "Int64"}]
        }));
        let body = serde_json::to_value(DatasetProperties::PostgreSqlTable(expand_dataset(&data))).unwrap();

        assert_eq!(body["typeProperties"], json!({"tableName": "public.orders"}));
        assert_eq!(body["folder"], json!({"name": "sales"}));
        assert_eq!(body["parameters"]["env"], json!({"type": "String", "defaultValue": "prod"}));
        assert_eq!(body["annotations"], json!(["a", "b"]));
        assert_eq!(body["foo"], json!("bar"));
        assert_eq!(body["structure"], json!([{"name": "id", "type": "Int64"}]));
        assert_eq!(body["description"], json!("orders"));
    }

    #[test]
    fn test_schema_rejects_bad_column_type() {
        let data = config(json!({
            "name": "ds1",
            "data_factory_id": FACTORY_ID,
            "linked_service_name": "ls1",
            "schema_column": [{"name": "id", "type": "BigInt"}]
        }));
        assert!(DatasetPostgreSqlResource.schema().validate_config(&data).is_err());
    }

    #[test]
    fn test_import_id_validation() {
        let resource = DatasetPostgreSqlResource;
        assert!(resource
            .validate_import_id(&format!("{}/datasets/ds1", FACTORY_ID))
            .is_ok());
        assert!(resource.validate_import_id(FACTORY_ID).is_err());
    }
}
