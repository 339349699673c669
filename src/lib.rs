//! Azure Resource Manager provider
//!
//! Resource lifecycle handlers (create, read, update, delete, import) for
//! Azure services, driven by a host runtime through [`provider::Provider`].

pub mod azure;
pub mod config;
pub mod error;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod services;
pub mod state;

/// Version injected at compile time via ARM_PROVIDER_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("ARM_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};
