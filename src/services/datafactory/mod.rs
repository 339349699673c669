//! Data Factory service
//!
//! Datasets live under a factory:
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.DataFactory/factories/{factory}/datasets/{name}`.

pub mod dataset_postgresql;
pub mod helpers;
pub mod models;
pub mod parse;
pub mod validate;

use crate::resource::{DataSource, Resource, ServiceRegistration};

pub use dataset_postgresql::DatasetPostgreSqlResource;

pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "Data Factory"
    }

    fn package_path(&self) -> &'static str {
        module_path!()
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Data Factory"]
    }

    fn data_sources(&self) -> Vec<Box<dyn DataSource>> {
        Vec::new()
    }

    fn resources(&self) -> Vec<Box<dyn Resource>> {
        vec![Box::new(DatasetPostgreSqlResource)]
    }
}
