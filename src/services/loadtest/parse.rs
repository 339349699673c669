//! Load Test resource IDs

use crate::azure::resource_id::{ResourceGroupId, SegmentParser};
use crate::error::ProviderError;

const PROVIDER_NAMESPACE: &str = "Microsoft.LoadTestService";

/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.LoadTestService/loadTests/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTestId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl LoadTestId {
    pub fn new(subscription_id: &str, resource_group: &str, name: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            name: name.to_string(),
        }
    }

    pub fn id(&self) -> String {
        format!(
            "{}/providers/{}/loadTests/{}",
            ResourceGroupId::new(&self.subscription_id, &self.resource_group).id(),
            PROVIDER_NAMESPACE,
            self.name
        )
    }

    pub fn parse(input: &str) -> Result<Self, ProviderError> {
        let mut parser = SegmentParser::parse(input)?;
        let rg = ResourceGroupId::pop_from(&mut parser)?;
        parser.pop_provider(PROVIDER_NAMESPACE)?;
        let name = parser.pop("loadTests")?;
        parser.finish()?;
        Ok(Self {
            subscription_id: rg.subscription_id,
            resource_group: rg.resource_group,
            name,
        })
    }
}

impl std::fmt::Display for LoadTestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Load Test: (Name {:?} / Resource Group {:?})",
            self.name, self.resource_group
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_test_id_round_trip() {
        let id = LoadTestId::new("sub", "rg1", "lt1");
        assert_eq!(
            id.id(),
            "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.LoadTestService/loadTests/lt1"
        );
        assert_eq!(LoadTestId::parse(&id.id()).unwrap(), id);
    }

    #[test]
    fn test_load_test_id_rejects_other_providers() {
        assert!(LoadTestId::parse(
            "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.DataFactory/loadTests/lt1"
        )
        .is_err());
    }
}
