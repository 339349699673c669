//! Long-running operation polling
//!
//! ARM answers slow PUT/DELETE calls with `201`/`202` and either an
//! `Azure-AsyncOperation` status URL, a `Location` URL, or a
//! `provisioningState` on the resource itself. This module waits on
//! whichever one the service handed out. The caller's deadline bounds
//! the wait.

use super::client::ArmClient;
use super::http::ArmResponse;
use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";
const LOCATION_HEADER: &str = "location";
const RETRY_AFTER_HEADER: &str = "retry-after";

/// Status of a long-running operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Succeeded,
    Failed(String),
    Running,
    Unknown(String),
}

impl OperationStatus {
    /// Classify an ARM status string (`status` or `provisioningState`)
    pub fn from_status(status: &str, error: Option<&Value>) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "failed" | "canceled" | "cancelled" => {
                let message = error
                    .and_then(|e| e.get("message"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("operation ended in state {:?}", status));
                Self::Failed(message)
            },
            "inprogress" | "running" | "accepted" | "creating" | "updating" | "deleting"
            | "provisioning" => Self::Running,
            other => Self::Unknown(other.to_string()),
        }
    }

    fn from_async_body(body: &Value) -> Self {
        match body.get("status").and_then(|v| v.as_str()) {
            Some(status) => Self::from_status(status, body.get("error")),
            None => Self::Unknown(String::new()),
        }
    }
}

fn provisioning_state(body: &Value) -> Option<&str> {
    body.get("properties")?.get("provisioningState")?.as_str()
}

fn retry_after(response: &ArmResponse, fallback: Duration) -> Duration {
    response
        .header(RETRY_AFTER_HEADER)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

/// Wait until the operation started by `initial` has finished
pub async fn wait_for_completion(
    client: &ArmClient,
    initial: &ArmResponse,
    resource_id: &str,
    api_version: &str,
) -> Result<()> {
    if let Some(url) = initial.header(ASYNC_OPERATION_HEADER) {
        return poll_async_operation(client, url, retry_after(initial, client.poll_interval)).await;
    }

    if initial.status == StatusCode::ACCEPTED {
        if let Some(url) = initial.header(LOCATION_HEADER) {
            return poll_location(client, url, retry_after(initial, client.poll_interval)).await;
        }
    }

    match provisioning_state(&initial.body).map(|s| OperationStatus::from_status(s, None)) {
        Some(OperationStatus::Running) => {
            poll_provisioning_state(client, resource_id, api_version).await
        },
        Some(OperationStatus::Failed(message)) => {
            Err(anyhow::anyhow!("provisioning failed: {}", message))
        },
        _ => Ok(()),
    }
}

async fn poll_async_operation(client: &ArmClient, url: &str, mut delay: Duration) -> Result<()> {
    loop {
        tokio::time::sleep(delay).await;

        let response = client.get_url(url).await?;
        match OperationStatus::from_async_body(&response.body) {
            OperationStatus::Succeeded => return Ok(()),
            OperationStatus::Failed(message) => {
                return Err(anyhow::anyhow!("long-running operation failed: {}", message));
            },
            OperationStatus::Running => {},
            OperationStatus::Unknown(s) => {
                tracing::warn!("Unknown operation status: {:?}", s);
            },
        }

        delay = retry_after(&response, client.poll_interval);
    }
}

async fn poll_location(client: &ArmClient, url: &str, mut delay: Duration) -> Result<()> {
    loop {
        tokio::time::sleep(delay).await;

        let response = client.get_url(url).await?;
        if response.status != StatusCode::ACCEPTED {
            return Ok(());
        }

        delay = retry_after(&response, client.poll_interval);
    }
}

async fn poll_provisioning_state(
    client: &ArmClient,
    resource_id: &str,
    api_version: &str,
) -> Result<()> {
    loop {
        tokio::time::sleep(client.poll_interval).await;

        let response = client.get(resource_id, api_version).await?;
        let Some(state) = provisioning_state(&response.body) else {
            return Ok(());
        };

        match OperationStatus::from_status(state, None) {
            OperationStatus::Succeeded => return Ok(()),
            OperationStatus::Failed(message) => {
                return Err(anyhow::anyhow!("provisioning failed: {}", message));
            },
            OperationStatus::Running => {},
            OperationStatus::Unknown(s) => {
                tracing::warn!("Unknown provisioning state: {:?}", s);
            },
        }
    }
}
