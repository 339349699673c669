//! Resource abstraction layer
//!
//! Every managed resource implements [`Resource`]: a static descriptor
//! (schema, timeouts, import ID check) plus the four lifecycle handlers
//! the host runtime drives. Services group their resources behind a
//! [`ServiceRegistration`], and the [`registry`] collects all of them.
//!
//! # Architecture
//!
//! - [`registry`] - builds the type-name lookup from service registrations
//! - [`timeouts`] - per-operation deadlines
//!
//! # Example
//!
//! ```ignore
//! use arm_provider::resource::get_resource;
//!
//! let dataset = get_resource("azurerm_data_factory_dataset_postgresql").unwrap();
//! println!("{}", dataset.schema().to_json());
//! ```

mod registry;
pub mod timeouts;

use crate::error::ProviderError;
use crate::provider::ProviderContext;
use crate::schema::Schema;
use crate::state::ResourceData;
use anyhow::Result;
use async_trait::async_trait;

pub use registry::*;
pub use timeouts::{Operation, ResourceTimeouts};

/// A managed resource type
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name used in configuration, e.g. `azurerm_load_test`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn timeouts(&self) -> ResourceTimeouts {
        ResourceTimeouts::default()
    }

    /// Check that `id` is a well-formed ID for this resource before import
    fn validate_import_id(&self, id: &str) -> Result<(), ProviderError>;

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;

    /// Refresh `data` from the API; clears it when the resource is gone
    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;

    /// Delete the resource; an already-deleted resource is not an error
    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;
}

/// A read-only lookup exposed by a service
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;
}

/// A service package and everything it registers with the provider
pub trait ServiceRegistration: Send + Sync {
    fn name(&self) -> &'static str;

    /// Module that implements the service
    fn package_path(&self) -> &'static str;

    /// Documentation categories the service's pages are listed under
    fn website_categories(&self) -> Vec<&'static str>;

    fn data_sources(&self) -> Vec<Box<dyn DataSource>>;

    fn resources(&self) -> Vec<Box<dyn Resource>>;
}
