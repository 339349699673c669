//! Data Factory API payloads (`2018-06-01`)

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const API_VERSION: &str = "2018-06-01";

/// Discriminator of a PostgreSQL table dataset
pub const POSTGRESQL_TABLE_TYPE: &str = "PostgreSqlTable";

/// ARM envelope around a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub properties: DatasetProperties,
}

/// Dataset properties, tagged by `properties.type`
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetProperties {
    PostgreSqlTable(TableDataset),
    RelationalTable(TableDataset),
    AzureSqlTable(TableDataset),
    /// A dataset type this provider does not model
    Other { type_name: String, raw: Map<String, Value> },
}

impl DatasetProperties {
    pub fn type_name(&self) -> &str {
        match self {
            Self::PostgreSqlTable(_) => POSTGRESQL_TABLE_TYPE,
            Self::RelationalTable(_) => "RelationalTable",
            Self::AzureSqlTable(_) => "AzureSqlTable",
            Self::Other { type_name, .. } => type_name,
        }
    }
}

impl Serialize for DatasetProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = match self {
            Self::PostgreSqlTable(table) | Self::RelationalTable(table) | Self::AzureSqlTable(table) => {
                match serde_json::to_value(table).map_err(<S::Error as serde::ser::Error>::custom)? {
                    Value::Object(map) => map,
                    _ => Map::new(),
                }
            },
            Self::Other { raw, .. } => raw.clone(),
        };
        map.insert("type".to_string(), Value::String(self.type_name().to_string()));
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DatasetProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        let type_name = match map.remove("type") {
            Some(Value::String(t)) => t,
            _ => return Err(D::Error::custom("dataset properties have no `type` discriminator")),
        };

        let table = |map: Map<String, Value>| {
            serde_json::from_value::<TableDataset>(Value::Object(map)).map_err(D::Error::custom)
        };

        match type_name.as_str() {
            POSTGRESQL_TABLE_TYPE => Ok(Self::PostgreSqlTable(table(map)?)),
            "RelationalTable" => Ok(Self::RelationalTable(table(map)?)),
            "AzureSqlTable" => Ok(Self::AzureSqlTable(table(map)?)),
            _ => Ok(Self::Other { type_name, raw: map }),
        }
    }
}

/// Shape shared by the table-backed dataset types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_service_name: Option<LinkedServiceReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Column list; may also be an expression object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, ParameterSpecification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<DatasetFolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_properties: Option<TableTypeProperties>,
    /// Unmodelled properties, kept verbatim
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableTypeProperties {
    /// A string or an expression object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedServiceReference {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub reference_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

impl LinkedServiceReference {
    pub fn new(name: &str) -> Self {
        Self {
            reference_type: "LinkedServiceReference".to_string(),
            reference_name: name.to_string(),
            parameters: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpecification {
    #[serde(rename = "type")]
    pub parameter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFolder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_postgresql_dataset_deserializes() {
        let body = json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.DataFactory/factories/f/datasets/d",
            "name": "d",
            "type": "Microsoft.DataFactory/factories/datasets",
            "properties": {
                "type": "PostgreSqlTable",
                "linkedServiceName": {"referenceName": "ls", "type": "LinkedServiceReference"},
                "typeProperties": {"tableName": "public.orders"},
                "annotations": ["a"],
                "customThing": 42
            }
        });

        let resource: DatasetResource = serde_json::from_value(body).unwrap();
        let DatasetProperties::PostgreSqlTable(table) = &resource.properties else {
            panic!("expected a PostgreSQL table");
        };
        assert_eq!(table.linked_service_name.as_ref().unwrap().reference_name, "ls");
        assert_eq!(
            table.type_properties.as_ref().unwrap().table_name,
            Some(json!("public.orders"))
        );
        assert_eq!(table.additional_properties.get("customThing"), Some(&json!(42)));
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let props: DatasetProperties = serde_json::from_value(json!({
            "type": "AzureBlob",
            "typeProperties": {"folderPath": "x"}
        }))
        .unwrap();
        assert_eq!(props.type_name(), "AzureBlob");
        assert!(matches!(props, DatasetProperties::Other { .. }));
    }

    #[test]
    fn test_missing_discriminator_is_an_error() {
        let result: Result<DatasetProperties, _> = serde_json::from_value(json!({"description": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_writes_discriminator() {
        let props = DatasetProperties::PostgreSqlTable(TableDataset {
            linked_service_name: Some(LinkedServiceReference::new("ls")),
            ..TableDataset::default()
        });
        let value = serde_json::to_value(&props).unwrap();
        assert_eq!(value["type"], json!("PostgreSqlTable"));
        assert_eq!(value["linkedServiceName"]["type"], json!("LinkedServiceReference"));
        assert!(value.get("description").is_none());
    }
}
