//! Data Factory resource IDs

use crate::azure::resource_id::{ResourceGroupId, SegmentParser};
use crate::error::ProviderError;

const PROVIDER_NAMESPACE: &str = "Microsoft.DataFactory";

/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.DataFactory/factories/{factory}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataFactoryId {
    pub subscription_id: String,
    pub resource_group: String,
    pub factory_name: String,
}

impl DataFactoryId {
    pub fn new(subscription_id: &str, resource_group: &str, factory_name: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            factory_name: factory_name.to_string(),
        }
    }

    pub fn id(&self) -> String {
        format!(
            "{}/providers/{}/factories/{}",
            ResourceGroupId::new(&self.subscription_id, &self.resource_group).id(),
            PROVIDER_NAMESPACE,
            self.factory_name
        )
    }

    fn pop_from(parser: &mut SegmentParser) -> Result<Self, ProviderError> {
        let rg = ResourceGroupId::pop_from(parser)?;
        parser.pop_provider(PROVIDER_NAMESPACE)?;
        let factory_name = parser.pop("factories")?;
        Ok(Self {
            subscription_id: rg.subscription_id,
            resource_group: rg.resource_group,
            factory_name,
        })
    }

    pub fn parse(input: &str) -> Result<Self, ProviderError> {
        let mut parser = SegmentParser::parse(input)?;
        let id = Self::pop_from(&mut parser)?;
        parser.finish()?;
        Ok(id)
    }
}

impl std::fmt::Display for DataFactoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Data Factory: (Factory Name {:?} / Resource Group {:?})",
            self.factory_name, self.resource_group
        )
    }
}

/// `.../factories/{factory}/datasets/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSetId {
    pub subscription_id: String,
    pub resource_group: String,
    pub factory_name: String,
    pub name: String,
}

impl DataSetId {
    pub fn new(subscription_id: &str, resource_group: &str, factory_name: &str, name: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            factory_name: factory_name.to_string(),
            name: name.to_string(),
        }
    }

    /// The factory this dataset lives in
    pub fn factory(&self) -> DataFactoryId {
        DataFactoryId::new(&self.subscription_id, &self.resource_group, &self.factory_name)
    }

    pub fn id(&self) -> String {
        format!("{}/datasets/{}", self.factory().id(), self.name)
    }

    pub fn parse(input: &str) -> Result<Self, ProviderError> {
        let mut parser = SegmentParser::parse(input)?;
        let factory = DataFactoryId::pop_from(&mut parser)?;
        let name = parser.pop("datasets")?;
        parser.finish()?;
        Ok(Self {
            subscription_id: factory.subscription_id,
            resource_group: factory.resource_group,
            factory_name: factory.factory_name,
            name,
        })
    }
}

impl std::fmt::Display for DataSetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Data Set: (Name {:?} / Factory Name {:?} / Resource Group {:?})",
            self.name, self.factory_name, self.resource_group
        )
    }
}
