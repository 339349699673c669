//! Load Test service

pub mod load_test;
pub mod models;
pub mod parse;

use crate::resource::{DataSource, Resource, ServiceRegistration};

pub use load_test::LoadTestResource;

pub struct Registration;

impl ServiceRegistration for Registration {
    fn name(&self) -> &'static str {
        "Load Test"
    }

    fn package_path(&self) -> &'static str {
        module_path!()
    }

    fn website_categories(&self) -> Vec<&'static str> {
        vec!["Load Test"]
    }

    fn data_sources(&self) -> Vec<Box<dyn DataSource>> {
        Vec::new()
    }

    fn resources(&self) -> Vec<Box<dyn Resource>> {
        vec![Box::new(LoadTestResource)]
    }
}
