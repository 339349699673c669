//! Azure Resource Manager interaction module
//!
//! This module provides the core functionality for talking to the ARM
//! management API: authentication, the HTTP transport, long-running
//! operation polling and resource ID parsing.
//!
//! # Module Structure
//!
//! - [`auth`] - bearer tokens (static or client credentials)
//! - [`client`] - main ARM client for making API requests
//! - [`http`] - HTTP utilities and the typed [`ApiError`]
//! - [`poller`] - waits on `201`/`202` long-running operations
//! - [`resource_id`] - segment parser shared by the typed resource IDs
//!
//! # Example
//!
//! ```ignore
//! use arm_provider::azure::{ArmClient, CredentialSource};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ArmClient::new(
//!         "https://management.azure.com",
//!         "00000000-0000-0000-0000-000000000000",
//!         CredentialSource::AccessToken("token".into()),
//!     )?;
//!     let rg = client.get("/subscriptions/.../resourceGroups/rg", "2021-04-01").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod poller;
pub mod resource_id;

pub use auth::{ArmCredentials, CredentialSource};
pub use client::{ArmClient, DEFAULT_ENDPOINT};
pub use http::{ApiError, ArmResponse};

/// Whether an error (anywhere in its context chain) is an API 404
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|e| e.downcast_ref::<ApiError>())
        .any(ApiError::is_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found_through_context() {
        let err: anyhow::Error = ApiError {
            status: 404,
            code: "ResourceNotFound".into(),
            message: "gone".into(),
        }
        .into();
        assert!(is_not_found(&err.context("retrieving thing")));
    }

    #[test]
    fn test_other_errors_are_not_not_found() {
        let err = anyhow::anyhow!("connection refused");
        assert!(!is_not_found(&err));

        let err: anyhow::Error = ApiError {
            status: 500,
            code: "InternalServerError".into(),
            message: "boom".into(),
        }
        .into();
        assert!(!is_not_found(&err));
    }
}
