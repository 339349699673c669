//! Built-in services
//!
//! Each service module exposes a `Registration` listing its resources
//! and data sources.

pub mod datafactory;
pub mod loadtest;

use crate::resource::ServiceRegistration;

/// Every service the provider ships with
pub fn registrations() -> Vec<Box<dyn ServiceRegistration>> {
    vec![
        Box::new(datafactory::Registration),
        Box::new(loadtest::Registration),
    ]
}
