//! ARM Client
//!
//! Main client for interacting with the Azure Resource Manager API,
//! combining authentication and HTTP functionality.

use super::auth::{ArmCredentials, CredentialSource};
use super::http::{ArmHttpClient, ArmResponse};
use super::poller;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

/// Public Azure cloud management endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Poll interval used when the service does not send `Retry-After`
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Main ARM client
#[derive(Clone)]
pub struct ArmClient {
    pub credentials: ArmCredentials,
    pub http: ArmHttpClient,
    /// Management endpoint without trailing slash
    pub endpoint: String,
    pub subscription_id: String,
    pub poll_interval: Duration,
}

impl ArmClient {
    /// Create a new ARM client
    pub fn new(endpoint: &str, subscription_id: &str, source: CredentialSource) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        url::Url::parse(&endpoint)
            .with_context(|| format!("Invalid management endpoint {:?}", endpoint))?;

        let credentials = ArmCredentials::new(source, &endpoint);
        let http = ArmHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            endpoint,
            subscription_id: subscription_id.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Override the fallback interval between long-running-operation polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Build the request URL for a resource ID.
    /// Each ID segment is percent-encoded on its own, so names containing
    /// `#`, `?` or `%` stay inside their segment.
    pub fn resource_url(&self, resource_id: &str, api_version: &str) -> Result<String> {
        let mut url = url::Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid management endpoint {:?}", self.endpoint))?;

        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Management endpoint {:?} cannot be a base URL", self.endpoint))?
            .pop_if_empty()
            .extend(resource_id.split('/').filter(|s| !s.is_empty()));
        url.query_pairs_mut().append_pair("api-version", api_version);

        Ok(url.into())
    }

    /// GET a resource
    pub async fn get(&self, resource_id: &str, api_version: &str) -> Result<ArmResponse> {
        let token = self.get_token().await?;
        self.http
            .get(&self.resource_url(resource_id, api_version)?, &token)
            .await
    }

    /// PUT a resource without waiting for provisioning to finish
    pub async fn put(
        &self,
        resource_id: &str,
        api_version: &str,
        body: &Value,
    ) -> Result<ArmResponse> {
        let token = self.get_token().await?;
        self.http
            .put(&self.resource_url(resource_id, api_version)?, &token, body)
            .await
    }

    /// DELETE a resource without waiting for the deletion to finish
    pub async fn delete(&self, resource_id: &str, api_version: &str) -> Result<ArmResponse> {
        let token = self.get_token().await?;
        self.http
            .delete(&self.resource_url(resource_id, api_version)?, &token)
            .await
    }

    /// GET an absolute URL handed out by the service (operation status, Location)
    pub async fn get_url(&self, url: &str) -> Result<ArmResponse> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    /// PUT a resource and wait for the long-running operation to finish
    pub async fn put_and_wait(
        &self,
        resource_id: &str,
        api_version: &str,
        body: &Value,
    ) -> Result<()> {
        let response = self.put(resource_id, api_version, body).await?;
        poller::wait_for_completion(self, &response, resource_id, api_version).await
    }

    /// DELETE a resource and wait for the long-running operation to finish
    pub async fn delete_and_wait(&self, resource_id: &str, api_version: &str) -> Result<()> {
        let response = self.delete(resource_id, api_version).await?;
        poller::wait_for_completion(self, &response, resource_id, api_version).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ArmClient {
        ArmClient::new(
            "https://management.azure.com/",
            "00000000-0000-0000-0000-000000000000",
            CredentialSource::AccessToken("t".into()),
        )
        .unwrap()
    }

    #[test]
    fn test_resource_url() {
        let url = client()
            .resource_url("/subscriptions/x/resourceGroups/rg", "2018-06-01")
            .unwrap();
        assert_eq!(
            url,
            "https://management.azure.com/subscriptions/x/resourceGroups/rg?api-version=2018-06-01"
        );
    }

    #[test]
    fn test_resource_url_escapes_segments() {
        let url = client()
            .resource_url(
                "/subscriptions/x/resourceGroups/rg/providers/Microsoft.DataFactory/factories/df/datasets/ds#1?",
                "2018-06-01",
            )
            .unwrap();
        assert_eq!(
            url,
            "https://management.azure.com/subscriptions/x/resourceGroups/rg/providers/Microsoft.DataFactory/factories/df/datasets/ds%231%3F?api-version=2018-06-01"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = ArmClient::new("not a url", "sub", CredentialSource::AccessToken("t".into()));
        assert!(result.is_err());
    }
}
