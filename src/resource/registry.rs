//! Resource Registry - collect resources from service registrations
//!
//! This module walks every service registration once and provides lookup
//! functions for the rest of the application.

use super::{DataSource, Resource, ServiceRegistration};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Resources and data sources keyed by type name
pub struct ResourceRegistry {
    pub services: Vec<Box<dyn ServiceRegistration>>,
    pub resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    pub data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl ResourceRegistry {
    /// Build a registry from a set of services.
    /// Panics on duplicate type names, which is a programming error.
    pub fn from_services(services: Vec<Box<dyn ServiceRegistration>>) -> Self {
        let mut resources: BTreeMap<&'static str, Arc<dyn Resource>> = BTreeMap::new();
        let mut data_sources: BTreeMap<&'static str, Arc<dyn DataSource>> = BTreeMap::new();

        for service in &services {
            tracing::debug!(
                "Registering service {:?} ({})",
                service.name(),
                service.package_path()
            );

            for resource in service.resources() {
                let name = resource.type_name();
                if resources.insert(name, Arc::from(resource)).is_some() {
                    panic!("Resource {:?} registered twice", name);
                }
            }

            for data_source in service.data_sources() {
                let name = data_source.type_name();
                if data_sources.insert(name, Arc::from(data_source)).is_some() {
                    panic!("Data source {:?} registered twice", name);
                }
            }
        }

        Self {
            services,
            resources,
            data_sources,
        }
    }
}

/// Global registry built from the built-in services
static REGISTRY: OnceLock<ResourceRegistry> = OnceLock::new();

/// Get the resource registry (built on first access)
pub fn get_registry() -> &'static ResourceRegistry {
    REGISTRY.get_or_init(|| ResourceRegistry::from_services(crate::services::registrations()))
}

/// Get a resource by type name
pub fn get_resource(type_name: &str) -> Option<Arc<dyn Resource>> {
    get_registry().resources.get(type_name).cloned()
}

/// Get all resource type names, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    get_registry().resources.keys().copied().collect()
}
