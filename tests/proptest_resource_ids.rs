//! Property-based tests using proptest
//!
//! Every typed resource ID must survive formatting and parsing unchanged,
//! and parsing must ignore the casing of the fixed key segments.

use arm_provider::azure::resource_id::ResourceGroupId;
use arm_provider::services::datafactory::parse::{DataFactoryId, DataSetId};
use arm_provider::services::loadtest::parse::LoadTestId;
use proptest::prelude::*;

/// Generate a subscription GUID
fn arb_subscription() -> impl Strategy<Value = String> {
    "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}"
}

/// Generate a resource group name
fn arb_resource_group() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_().-]{0,40}[A-Za-z0-9_()-]"
}

/// Generate a child resource name
fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9_-]{0,62}"
}

proptest! {
    #[test]
    fn test_resource_group_id_round_trip(sub in arb_subscription(), rg in arb_resource_group()) {
        let id = ResourceGroupId::new(&sub, &rg);
        prop_assert_eq!(ResourceGroupId::parse(&id.id()).unwrap(), id);
    }

    #[test]
    fn test_data_factory_id_round_trip(
        sub in arb_subscription(),
        rg in arb_resource_group(),
        factory in arb_name(),
    ) {
        let id = DataFactoryId::new(&sub, &rg, &factory);
        let parsed = DataFactoryId::parse(&id.id()).unwrap();
        prop_assert_eq!(parsed.id(), id.id());
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn test_data_set_id_round_trip(
        sub in arb_subscription(),
        rg in arb_resource_group(),
        factory in arb_name(),
        name in arb_name(),
    ) {
        let id = DataSetId::new(&sub, &rg, &factory, &name);
        let parsed = DataSetId::parse(&id.id()).unwrap();
        prop_assert_eq!(parsed.factory(), DataFactoryId::new(&sub, &rg, &factory));
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn test_load_test_id_round_trip(
        sub in arb_subscription(),
        rg in arb_resource_group(),
        name in arb_name(),
    ) {
        let id = LoadTestId::new(&sub, &rg, &name);
        prop_assert_eq!(LoadTestId::parse(&id.id()).unwrap(), id);
    }

    /// Key segments like `resourceGroups` are matched case-insensitively
    #[test]
    fn test_key_segments_case_insensitive(
        sub in arb_subscription(),
        rg in arb_resource_group(),
        name in arb_name(),
    ) {
        let id = LoadTestId::new(&sub, &rg, &name);
        let lowered = format!(
            "/subscriptions/{}/resourcegroups/{}/providers/Microsoft.LoadTestService/loadtests/{}",
            sub, rg, name
        );
        prop_assert_eq!(LoadTestId::parse(&lowered).unwrap(), id);
    }

    /// Truncated IDs never parse as a dataset
    #[test]
    fn test_truncated_data_set_id_rejected(
        sub in arb_subscription(),
        rg in arb_resource_group(),
        factory in arb_name(),
    ) {
        let factory_id = DataFactoryId::new(&sub, &rg, &factory).id();
        prop_assert!(DataSetId::parse(&factory_id).is_err());
        let datasets_without_name = format!("{}/datasets", factory_id);
        prop_assert!(DataSetId::parse(&datasets_without_name).is_err());
    }
}
