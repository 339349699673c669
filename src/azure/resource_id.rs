//! Resource ID segment parsing
//!
//! ARM resource IDs are `/key/value` pairs:
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}...`.
//! The typed IDs in each service pop the segments they expect and then
//! call [`SegmentParser::finish`] so that trailing segments are rejected.

use crate::error::ProviderError;

/// Key/value pairs of a resource ID, consumed front to back
#[derive(Debug)]
pub struct SegmentParser {
    input: String,
    segments: Vec<(String, String)>,
}

impl SegmentParser {
    pub fn parse(input: &str) -> Result<Self, ProviderError> {
        let Some(rest) = input.strip_prefix('/') else {
            return Err(ProviderError::InvalidId(format!(
                "{:?} does not start with a slash",
                input
            )));
        };

        let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(ProviderError::InvalidId(format!(
                "{:?} contains an empty segment",
                input
            )));
        }
        if parts.len() % 2 != 0 {
            return Err(ProviderError::InvalidId(format!(
                "{:?} has an odd number of segments",
                input
            )));
        }

        let segments = parts
            .chunks(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect();

        Ok(Self {
            input: input.to_string(),
            segments,
        })
    }

    /// Take the next segment, which must be `key` (case-insensitive)
    pub fn pop(&mut self, key: &str) -> Result<String, ProviderError> {
        if self.segments.is_empty() {
            return Err(ProviderError::InvalidId(format!(
                "{:?} is missing the {:?} segment",
                self.input, key
            )));
        }

        let (found, value) = self.segments.remove(0);
        if !found.eq_ignore_ascii_case(key) {
            return Err(ProviderError::InvalidId(format!(
                "{:?}: expected segment {:?} but found {:?}",
                self.input, key, found
            )));
        }

        Ok(value)
    }

    /// Take the `providers/{namespace}` pair and check the namespace
    pub fn pop_provider(&mut self, namespace: &str) -> Result<(), ProviderError> {
        let found = self.pop("providers")?;
        if !found.eq_ignore_ascii_case(namespace) {
            return Err(ProviderError::InvalidId(format!(
                "{:?}: expected provider {:?} but found {:?}",
                self.input, namespace, found
            )));
        }
        Ok(())
    }

    /// Fail if any segments were left unconsumed
    pub fn finish(self) -> Result<(), ProviderError> {
        if let Some((key, _)) = self.segments.first() {
            return Err(ProviderError::InvalidId(format!(
                "{:?} has unexpected trailing segment {:?}",
                self.input, key
            )));
        }
        Ok(())
    }
}

/// `/subscriptions/{sub}/resourceGroups/{rg}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceGroupId {
    pub subscription_id: String,
    pub resource_group: String,
}

impl ResourceGroupId {
    pub fn new(subscription_id: &str, resource_group: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
        }
    }

    pub fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group
        )
    }

    /// Pop the subscription and resource group from the front of `parser`
    pub fn pop_from(parser: &mut SegmentParser) -> Result<Self, ProviderError> {
        let subscription_id = parser.pop("subscriptions")?;
        let resource_group = parser.pop("resourceGroups")?;
        Ok(Self {
            subscription_id,
            resource_group,
        })
    }

    pub fn parse(input: &str) -> Result<Self, ProviderError> {
        let mut parser = SegmentParser::parse(input)?;
        let id = Self::pop_from(&mut parser)?;
        parser.finish()?;
        Ok(id)
    }
}

impl std::fmt::Display for ResourceGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Resource Group {:?}", self.resource_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_group_round_trip() {
        let id = ResourceGroupId::new("sub-1", "rg-1");
        assert_eq!(ResourceGroupId::parse(&id.id()).unwrap(), id);
    }

    #[test]
    fn test_resource_groups_segment_is_case_insensitive() {
        let id = ResourceGroupId::parse("/subscriptions/sub/resourcegroups/rg").unwrap();
        assert_eq!(id.resource_group, "rg");
    }

    #[test]
    fn test_trailing_slash_is_tolerated() {
        assert!(ResourceGroupId::parse("/subscriptions/sub/resourceGroups/rg/").is_ok());
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(ResourceGroupId::parse("subscriptions/sub/resourceGroups/rg").is_err());
        assert!(ResourceGroupId::parse("/subscriptions//resourceGroups/rg").is_err());
        assert!(ResourceGroupId::parse("/subscriptions/sub/resourceGroups").is_err());
        assert!(ResourceGroupId::parse("/subscriptions/sub").is_err());
        assert!(ResourceGroupId::parse("/subscriptions/sub/resourceGroups/rg/extra/x").is_err());
        assert!(ResourceGroupId::parse("/tenants/sub/resourceGroups/rg").is_err());
    }

    #[test]
    fn test_provider_namespace_checked() {
        let mut parser =
            SegmentParser::parse("/providers/Microsoft.Other/factories/f").unwrap();
        assert!(parser.pop_provider("Microsoft.DataFactory").is_err());
    }
}
